use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use super::dispatcher::{Flow, Shell, ShellError};

fn prompt(shell: &Shell) -> String {
    format!("vfs:{}$ ", shell.vfs().current_path())
}

/// Reads commands from the terminal until `exit`, end of input or an
/// interrupt.
pub async fn run(shell: &mut Shell) -> Result<(), ReplError> {
    let mut editor = DefaultEditor::new().context(EditorSnafu)?;
    let mut stdout = io::stdout();

    loop {
        match editor.readline(&prompt(shell)) {
            Ok(line) => {
                if let Err(e) = editor.add_history_entry(line.as_str()) {
                    warn!("Failed to add history entry: {}", e);
                }
                let flow = shell
                    .execute_line(&line, &mut stdout)
                    .await
                    .context(OutputSnafu)?;
                if flow == Flow::Exit {
                    debug!("Leaving the shell on exit");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                debug!("Interrupted, terminating");
                break;
            }
            Err(ReadlineError::Eof) => {
                debug!("End of input");
                break;
            }
            Err(e) => return Err(e).context(EditorSnafu),
        }
    }

    Ok(())
}

#[derive(Debug, Snafu)]
pub enum ReplError {
    #[snafu(display("Failed to read from the terminal"))]
    EditorError { source: ReadlineError },
    #[snafu(display("Failed to print command output"))]
    OutputError { source: ShellError },
}
