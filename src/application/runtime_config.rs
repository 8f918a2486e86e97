use std::path::PathBuf;

use crate::cli::Cli;
use crate::storage::{Backend, StorageOptions};

/// What the command line asked for, before the config file is merged in.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub config: Option<PathBuf>,
    pub key: Option<String>,
    pub backend: Option<Backend>,
    pub data_dir: Option<PathBuf>,
    pub commands: Vec<String>,
}

impl RuntimeConfig {
    /// Command-line values win over the ones from the config file.
    pub fn storage_options(&self, from_file: StorageOptions) -> StorageOptions {
        StorageOptions {
            key: self.key.clone().unwrap_or(from_file.key),
            backend: self.backend.unwrap_or(from_file.backend),
            data_dir: self.data_dir.clone().unwrap_or(from_file.data_dir),
        }
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            key: cli.key,
            backend: cli.backend,
            data_dir: cli.data_dir,
            commands: cli.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_file_values() {
        let runtime = RuntimeConfig {
            backend: Some(Backend::SimpleKeyed),
            ..RuntimeConfig::default()
        };
        let from_file = StorageOptions {
            key: "from-file".to_string(),
            ..StorageOptions::default()
        };

        let options = runtime.storage_options(from_file);

        assert_eq!(options.key, "from-file");
        assert_eq!(options.backend, Backend::SimpleKeyed);
    }
}
