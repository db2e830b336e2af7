use std::io::Write;
use std::path::Path;

use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::filesystem::{RECORD_DELIMITER, Vfs, VfsError};

use super::dispatcher::{Flow, Shell, ShellError};

/// Nesting limit for scripts started from scripts.
pub const MAX_SCRIPT_DEPTH: usize = 16;

const COMMENT_MARKER: char = '#';

/// An ordered sequence of command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    origin: String,
    lines: Vec<String>,
}

impl Script {
    pub fn inline(origin: impl Into<String>, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            origin: origin.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Host text: one command per line, blank lines and `#` comments dropped.
    pub fn from_host_text(origin: impl Into<String>, text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER));
        Self::inline(origin, lines)
    }

    /// VFS file content: split strictly on `;`, nothing filtered.
    pub fn from_vfs_content(origin: impl Into<String>, content: &str) -> Self {
        Self::inline(origin, content.split(RECORD_DELIMITER))
    }

    pub async fn load_host(path: &Path) -> Result<Self, ScriptError> {
        debug!("Reading host script {}", path.display());
        let bytes = fs::read(path).await.context(ScriptReadSnafu {
            file_path: path.display().to_string(),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::from_host_text(path.display().to_string(), &text))
    }

    pub fn from_vfs(vfs: &Vfs, path: &str) -> Result<Self, ScriptError> {
        let content = vfs
            .get_item(path)
            .context(LookupSnafu)?
            .content()
            .ok_or(VfsError::NotAFile {
                path: path.to_string(),
            })
            .context(LookupSnafu)?;
        Ok(Self::from_vfs_content(path, content))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Shell {
    /// Runs `script` line by line, echoing each line before executing it.
    ///
    /// Stops at the first `exit`. Effects of earlier lines are kept.
    pub async fn run_script(
        &mut self,
        script: &Script,
        out: &mut dyn Write,
    ) -> Result<(), ShellError> {
        if let Err(e) = self.enter_script() {
            return self.report(out, &e);
        }
        info!("Running script {}", script.origin());

        let result = self.run_script_lines(script, out).await;
        self.leave_script();
        result
    }

    async fn run_script_lines(
        &mut self,
        script: &Script,
        out: &mut dyn Write,
    ) -> Result<(), ShellError> {
        for line in script.lines() {
            self.print(out, line)?;
            let flow = self.execute_line(line, out).await?;
            if flow == Flow::Exit {
                debug!("Script {} stopped at exit", script.origin());
                break;
            }
            self.print(out, "")?;
        }
        Ok(())
    }

    fn enter_script(&mut self) -> Result<(), ScriptError> {
        ensure!(
            self.script_depth < MAX_SCRIPT_DEPTH,
            ScriptTooDeepSnafu {
                limit: MAX_SCRIPT_DEPTH
            }
        );
        self.script_depth += 1;
        Ok(())
    }

    fn leave_script(&mut self) {
        self.script_depth -= 1;
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScriptError {
    #[snafu(display("Failed to read script {}: {}", file_path, source))]
    ScriptReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Scripts nested deeper than {} levels", limit))]
    ScriptTooDeep { limit: usize },
    #[snafu(display("No script loaded, use set_script first"))]
    NoScriptLoaded,
    #[snafu(display("{}", source))]
    Lookup { source: VfsError },
}
