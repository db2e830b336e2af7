use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::ShellConfig;

/// Settings the session runs with, after merging the command line over the
/// config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub vfs: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub strict_cd: bool,
}

impl RuntimeConfig {
    pub fn merge(cli: Cli, file: ShellConfig) -> Self {
        Self {
            vfs: cli.vfs.or(file.vfs),
            script: cli.script.or(file.script),
            strict_cd: !cli.legacy_cd && file.strict_cd.unwrap_or(true),
        }
    }
}
