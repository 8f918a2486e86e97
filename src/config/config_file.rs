use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::HostPathExt;
use crate::storage::{Backend, StorageOptions};

pub const CONFIG_FILE_NAME: &str = "browserfs.yaml";

pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Settings read from `browserfs.yaml`:
///
/// ```yaml
/// storage:
///   key: browser-file-storage
///   backend: durable-indexed
///   data_dir: .browserfs
/// ```
///
/// Every field is optional and falls back to [`StorageOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub storage: StorageOptions,
}

impl Config {
    /// Reads the config at `path`. When no path is given the default file is
    /// tried and its absence is not an error.
    pub async fn read(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_path(path).await,
            None => {
                let path = default_config_path();
                match Self::from_path(&path).await {
                    Err(ConfigError::ReadError { source, .. })
                        if source.kind() == ErrorKind::NotFound =>
                    {
                        info!("No config file found, using defaults");
                        Ok(Self::default())
                    }
                    result => result,
                }
            }
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading config file: {}", path.host_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.host_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.host_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_storage_from_yaml(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<StorageOptions, ConfigError> {
        let mut options = StorageOptions::default();

        let Some(storage) = top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed("storage"))))
        else {
            return Ok(options);
        };
        let storage = storage.as_mapping().ok_or(ConfigError::StorageNotMap)?;

        if let Some(key) = Self::string_field(storage, "key")? {
            ensure!(!key.is_empty(), EmptyKeySnafu);
            options.key = key.to_string();
        }
        if let Some(name) = Self::string_field(storage, "backend")? {
            options.backend = Backend::from_str(name, false)
                .map_err(|_| ConfigError::UnknownBackend {
                    name: name.to_string(),
                })?;
        }
        if let Some(data_dir) = Self::string_field(storage, "data_dir")? {
            options.data_dir = PathBuf::from(data_dir);
        }

        Ok(options)
    }

    fn string_field<'a>(
        section: &'a LinkedHashMap<Yaml, Yaml>,
        field: &'static str,
    ) -> Result<Option<&'a str>, ConfigError> {
        match section.get(&Yaml::Value(Scalar::String(Cow::Borrowed(field)))) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or(ConfigError::InvalidValue { field }),
        }
    }
}

impl TryFrom<&str> for Config {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError { source: e })?;
        let contents = contents_vec
            .first()
            .ok_or(ConfigError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(ConfigError::TopLevelNotMap)?;

        Ok(Config {
            storage: Self::parse_storage_from_yaml(top_level)?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file is not valid UTF-8: {}", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Storage section should be a map"))]
    StorageNotMap,
    #[snafu(display("Storage field '{}' should be a string", field))]
    InvalidValue { field: &'static str },
    #[snafu(display("Unknown storage backend '{}'", name))]
    UnknownBackend { name: String },
    #[snafu(display("Storage key must not be empty"))]
    EmptyKey,
}
