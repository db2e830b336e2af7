use derive_more::Display;

/// A tokenized command line: the first whitespace-delimited word names the
/// command, the remaining words are its arguments. No quoting or escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let name = words.next()?.to_string();
        Some(Self {
            name,
            args: words.map(str::to_string).collect(),
        })
    }

    /// All arguments joined back with single spaces, used as one path.
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }

    pub fn builtin(&self) -> Option<Builtin> {
        Builtin::lookup(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Builtin {
    #[display("ls")]
    Ls,
    #[display("cat")]
    Cat,
    #[display("cd")]
    Cd,
    #[display("pwd")]
    Pwd,
    #[display("cp")]
    Cp,
    #[display("loadvfs")]
    LoadVfs,
    #[display("savevfs")]
    SaveVfs,
    #[display("get_item")]
    GetItem,
    #[display("list_vfs")]
    ListVfs,
    #[display("set_script")]
    SetScript,
    #[display("run_script")]
    RunScript,
    #[display("execution_script")]
    ExecutionScript,
    #[display("exit")]
    Exit,
}

/// Dispatch table shared by the interactive loop and the script runner.
pub const BUILTINS: &[Builtin] = &[
    Builtin::Ls,
    Builtin::Cat,
    Builtin::Cd,
    Builtin::Pwd,
    Builtin::Cp,
    Builtin::LoadVfs,
    Builtin::SaveVfs,
    Builtin::GetItem,
    Builtin::ListVfs,
    Builtin::SetScript,
    Builtin::RunScript,
    Builtin::ExecutionScript,
    Builtin::Exit,
];

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .copied()
            .find(|builtin| builtin.to_string() == name)
    }
}
