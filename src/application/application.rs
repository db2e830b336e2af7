use std::io;

use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{ShellConfig, ShellConfigError};
use crate::filesystem::Vfs;
use crate::import::Importer;
use crate::shell::{ReplError, Script, ScriptError, Shell, ShellError, run_repl};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let file_config = ShellConfig::read(&cli.config)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config file: {:?}", file_config);

        let runtime_config = RuntimeConfig::merge(cli, file_config);
        debug!("Runtime config: {:?}", runtime_config);

        let color = supports_color::on(Stream::Stdout).is_some();
        let mut shell = Shell::new(Vfs::new(runtime_config.strict_cd)).with_color(color);

        if let Some(path) = &runtime_config.vfs {
            match Importer::load(shell.vfs_mut(), path).await {
                Ok(outcome) => info!("Initial VFS: {:?}", outcome),
                Err(e) => warn!("Starting with an empty VFS: {}", e),
            }
        }

        match &runtime_config.script {
            Some(path) => {
                let script = Script::load_host(path).await.context(StartupScriptSnafu)?;
                shell
                    .run_script(&script, &mut io::stdout())
                    .await
                    .context(ScriptOutputSnafu)?;
            }
            None => run_repl(&mut shell).await.context(InteractiveSnafu)?,
        }

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ShellConfigError },
    #[snafu(display("Critical failure encountered while loading the startup script"))]
    StartupScriptError { source: ScriptError },
    #[snafu(display("Critical failure encountered while running the startup script"))]
    ScriptOutputError { source: ShellError },
    #[snafu(display("Critical failure encountered in the interactive shell"))]
    InteractiveError { source: ReplError },
}
