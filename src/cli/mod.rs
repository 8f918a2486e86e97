mod cli;
mod command;

pub use cli::Cli;
pub use command::{CommandParseError, ShellCommand};
