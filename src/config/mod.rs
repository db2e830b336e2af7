mod shell_config;

pub use shell_config::{CONFIG_FILE_NAME, ShellConfig, ShellConfigError};
