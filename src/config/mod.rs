//! Optional YAML configuration file.

mod config_file;

pub use config_file::{CONFIG_FILE_NAME, Config, ConfigError, default_config_path};
