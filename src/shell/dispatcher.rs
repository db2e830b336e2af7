use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::filesystem::{Vfs, VfsError};
use crate::import::{Exporter, Importer, LoadOutcome};

use super::command::{Builtin, CommandLine};
use super::script::{Script, ScriptError};

/// Whether the caller should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Session state shared by every dispatched command.
#[derive(Debug, Default)]
pub struct Shell {
    vfs: Vfs,
    loaded_script: Option<Script>,
    color: bool,
    pub(super) script_depth: usize,
}

impl Shell {
    pub fn new(vfs: Vfs) -> Self {
        Self {
            vfs,
            ..Default::default()
        }
    }

    /// Renders error lines in red.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut Vfs {
        &mut self.vfs
    }

    /// Tokenizes and runs one command line, writing its output to `out`.
    ///
    /// Command failures are written to `out` as well; only a failure to write
    /// output is returned as an error. Unknown commands are ignored.
    pub async fn execute_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
    ) -> Result<Flow, ShellError> {
        let Some(command) = CommandLine::parse(line) else {
            return Ok(Flow::Continue);
        };
        let Some(builtin) = command.builtin() else {
            debug!("Ignoring unknown command '{}'", command.name);
            return Ok(Flow::Continue);
        };
        debug!("Dispatching '{}' with {:?}", builtin, command.args);

        self.dispatch(builtin, &command, out).await?;
        Ok(match builtin {
            Builtin::Exit => Flow::Exit,
            _ => Flow::Continue,
        })
    }

    async fn dispatch(
        &mut self,
        builtin: Builtin,
        command: &CommandLine,
        out: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let path = command.joined_args();
        match builtin {
            Builtin::Ls => match self.vfs.list(&path) {
                Ok(names) => self.print_lines(out, &names),
                Err(e) => self.report(out, &e),
            },
            Builtin::Cat => match self.vfs.read(&path) {
                Ok(records) => self.print_lines(out, &records),
                Err(VfsError::NotAFile { path }) => {
                    debug!("cat of non-file '{}' prints nothing", path);
                    Ok(())
                }
                Err(e) => self.report(out, &e),
            },
            Builtin::Cd => match self.vfs.change_directory(&path) {
                Ok(()) => Ok(()),
                Err(e) => self.report(out, &e),
            },
            Builtin::Pwd => {
                let current = self.vfs.current_path().to_string();
                self.print(out, &current)
            }
            Builtin::Cp => self.copy(command, out),
            Builtin::LoadVfs => self.load_vfs(&path, out).await,
            Builtin::SaveVfs => self.save_vfs(&path, out).await,
            Builtin::GetItem => match self.vfs.get_item(&path) {
                Ok(node) => {
                    let rendered = format!("{node:?}");
                    self.print(out, &rendered)
                }
                Err(_) => self.print(out, "None"),
            },
            Builtin::ListVfs => {
                let rendered = match self.vfs.list(&path) {
                    Ok(names) => format!("{names:?}"),
                    Err(e) => e.to_string(),
                };
                self.print(out, &rendered)
            }
            Builtin::SetScript => self.set_script(&path, out).await,
            Builtin::RunScript => match self.loaded_script.clone() {
                Some(script) => Box::pin(self.run_script(&script, out)).await,
                None => self.report(out, &ScriptError::NoScriptLoaded),
            },
            Builtin::ExecutionScript => match Script::from_vfs(&self.vfs, &path) {
                Ok(script) => {
                    self.print(out, &format!("execution: {path}"))?;
                    Box::pin(self.run_script(&script, out)).await
                }
                Err(e) => self.report(out, &e),
            },
            Builtin::Exit => Ok(()),
        }
    }

    fn copy(&mut self, command: &CommandLine, out: &mut dyn Write) -> Result<(), ShellError> {
        let [source, destination, ..] = command.args.as_slice() else {
            return self.print(out, "Usage: cp <source> <destination>");
        };
        match self.vfs.copy(source, destination) {
            Ok(()) => self.print(out, &format!("Copied {source} to {destination}")),
            Err(e) => self.report(out, &e),
        }
    }

    async fn load_vfs(&mut self, path: &str, out: &mut dyn Write) -> Result<(), ShellError> {
        if path.is_empty() {
            self.vfs.reset();
            return self.print(out, "Created empty VFS");
        }

        match Importer::load(&mut self.vfs, Path::new(path)).await {
            Ok(LoadOutcome::Loaded { path, .. }) => {
                self.print(out, &format!("Loaded VFS from {}", path.display()))
            }
            Ok(LoadOutcome::SourceUnavailable { path }) => self.print(
                out,
                &format!("File {} not found, created empty VFS", path.display()),
            ),
            Err(e) => self.report(out, &format!("Error loading VFS: {e}")),
        }
    }

    async fn save_vfs(&mut self, path: &str, out: &mut dyn Write) -> Result<(), ShellError> {
        let target = (!path.is_empty()).then(|| PathBuf::from(path));
        match Exporter::save(&self.vfs, target.as_deref()).await {
            Ok(written) => self.print(out, &format!("Saved VFS to {}", written.display())),
            Err(e) => self.report(out, &e),
        }
    }

    async fn set_script(&mut self, path: &str, out: &mut dyn Write) -> Result<(), ShellError> {
        if path.is_empty() {
            return self.print(out, "Usage: set_script <path>");
        }
        match Script::load_host(Path::new(path)).await {
            Ok(script) => {
                self.loaded_script = Some(script);
                self.print(out, &format!("current script: {path}"))
            }
            Err(e) => self.report(out, &e),
        }
    }

    pub(super) fn print(&self, out: &mut dyn Write, text: &str) -> Result<(), ShellError> {
        writeln!(out, "{text}").context(OutputSnafu)
    }

    fn print_lines(&self, out: &mut dyn Write, lines: &[String]) -> Result<(), ShellError> {
        lines.iter().try_for_each(|line| self.print(out, line))
    }

    /// Writes a failed command's message and lets the session go on.
    pub(super) fn report(&self, out: &mut dyn Write, error: &dyn Display) -> Result<(), ShellError> {
        let message = error.to_string();
        if self.color {
            self.print(out, &message.red().to_string())
        } else {
            self.print(out, &message)
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("Failed to write command output"))]
    OutputError { source: std::io::Error },
}
