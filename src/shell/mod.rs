//! Command surface over the [`Vfs`](crate::filesystem::Vfs).
//!
//! Lines are tokenized into a command name and arguments, looked up in one
//! dispatch table and run against the session's [`Shell`] state, whether they
//! come from the terminal or from a script.

mod command;
mod dispatcher;
mod repl;
mod script;

pub use dispatcher::{Shell, ShellError};
pub use repl::{ReplError, run as run_repl};
pub use script::{Script, ScriptError};
