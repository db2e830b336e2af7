use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::config::CONFIG_FILE_NAME;

/// Interactive shell over an in-memory virtual filesystem.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// CSV file (`path,type,content`) to load as the initial VFS
    #[clap(long)]
    pub vfs: Option<PathBuf>,

    /// Host script to run instead of the interactive prompt
    #[clap(long, short)]
    pub script: Option<PathBuf>,

    /// YAML settings file
    #[clap(long, short, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Let `cd` assign any path without checking that it exists
    #[clap(long)]
    pub legacy_cd: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::parse_from(["vfsh"]);
        assert_eq!(cli.vfs, None);
        assert_eq!(cli.script, None);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
        assert!(!cli.legacy_cd);
        assert!(matches!(cli.log_level, LogLevel::Warn));
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "vfsh",
            "--vfs",
            "vfs.csv",
            "-s",
            "start.txt",
            "--config",
            "other.yaml",
            "--legacy-cd",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.vfs, Some(PathBuf::from("vfs.csv")));
        assert_eq!(cli.script, Some(PathBuf::from("start.txt")));
        assert_eq!(cli.config, PathBuf::from("other.yaml"));
        assert!(cli.legacy_cd);
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }
}
