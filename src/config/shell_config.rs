use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "vfsh.yaml";

const VFS_KEY: &str = "vfs";
const SCRIPT_KEY: &str = "script";
const STRICT_CD_KEY: &str = "strict_cd";

/// Settings read from the optional YAML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellConfig {
    pub vfs: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub strict_cd: Option<bool>,
}

impl ShellConfig {
    /// Reads the config file at `path`. A missing file yields the defaults.
    pub async fn read(path: &Path) -> Result<Self, ShellConfigError> {
        debug!("Opening config file: {}", path.display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.display().to_string(),
                });
            }
        };

        let contents = String::from_utf8(bytes).map_err(|_| ShellConfigError::NotUtf8 {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn string_setting(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<PathBuf>, ShellConfigError> {
        match Self::setting(top_level, key) {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
            Some(Yaml::Value(Scalar::String(value))) => Ok(Some(PathBuf::from(value.to_string()))),
            Some(_) => Err(ShellConfigError::InvalidValue {
                key,
                expected: "a string",
            }),
        }
    }

    fn bool_setting(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<bool>, ShellConfigError> {
        match Self::setting(top_level, key) {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
            Some(Yaml::Value(Scalar::Boolean(value))) => Ok(Some(*value)),
            Some(_) => Err(ShellConfigError::InvalidValue {
                key,
                expected: "a boolean",
            }),
        }
    }

    fn setting<'a, 'input>(
        top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        key: &'static str,
    ) -> Option<&'a Yaml<'input>> {
        top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
    }
}

impl TryFrom<&str> for ShellConfig {
    type Error = ShellConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents =
            Yaml::load_from_str(contents).map_err(|e| ShellConfigError::ParseError { source: e })?;

        let top_level = match documents.first() {
            None | Some(Yaml::Value(Scalar::Null)) => return Ok(Self::default()),
            Some(document) => document
                .as_mapping()
                .ok_or(ShellConfigError::TopLevelNotMap)?,
        };

        for key in top_level.keys() {
            if let Yaml::Value(Scalar::String(name)) = key {
                let name: &str = name;
                if ![VFS_KEY, SCRIPT_KEY, STRICT_CD_KEY].contains(&name) {
                    debug!("Ignoring unknown config key '{}'", name);
                }
            }
        }

        Ok(ShellConfig {
            vfs: Self::string_setting(top_level, VFS_KEY)?,
            script: Self::string_setting(top_level, SCRIPT_KEY)?,
            strict_cd: Self::bool_setting(top_level, STRICT_CD_KEY)?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ShellConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    NotUtf8 { file_path: String },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },
}
