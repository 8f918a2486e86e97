use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::storage::Backend;

/// Shell over a persistent in-memory file tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML config file; ./browserfs.yaml is used when present
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Storage key the tree is saved under
    #[clap(long)]
    pub key: Option<String>,

    #[clap(long, value_enum)]
    pub backend: Option<Backend>,

    /// Directory of the durable-indexed store
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    /// Command to run, may be repeated. Commands are read from stdin otherwise
    #[clap(long = "command", short = 'c')]
    pub commands: Vec<String>,
}
