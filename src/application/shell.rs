use colored::Colorize;
use snafu::prelude::*;
use tracing::debug;

use crate::cli::{CommandParseError, ShellCommand};
use crate::filesystem::{FileSystem, FsError, MoveOptions};
use crate::storage::{KeyValueStore, Store};
use crate::tree::{Entry, Node, NodeKind};

/// Runs shell commands against one namespace.
pub struct Shell<S = Store> {
    file_system: FileSystem<S>,
    color: bool,
}

impl<S: KeyValueStore> Shell<S> {
    pub fn new(file_system: FileSystem<S>, color: bool) -> Self {
        Self { file_system, color }
    }

    pub fn file_system(&self) -> &FileSystem<S> {
        &self.file_system
    }

    /// Runs one line of input and returns what should be printed, if anything.
    pub async fn execute(&self, line: &str) -> Result<Option<String>, ShellError> {
        let command = ShellCommand::try_from(line).context(ParseSnafu)?;
        debug!("Executing {:?}", command);
        self.run(command).await.context(FileSystemSnafu)
    }

    async fn run(&self, command: ShellCommand) -> Result<Option<String>, FsError> {
        let fs = &self.file_system;

        match command {
            ShellCommand::Pwd => Ok(Some(format!("/{}", fs.current_path()))),
            ShellCommand::Ls { path } => {
                let entries = fs.list(path.as_deref().unwrap_or("."))?;
                Ok(Some(self.format_entries(&entries)))
            }
            ShellCommand::Cd { path } => {
                fs.set_current_directory(path.as_deref().unwrap_or("/"))?;
                Ok(None)
            }
            ShellCommand::Mkdir { paths } => {
                for path in paths {
                    let (parent, name) = split_new_path(&path);
                    fs.add_children(parent, vec![Node::directory(name)]).await?;
                }
                Ok(None)
            }
            ShellCommand::Touch { paths } => {
                for path in paths {
                    let (parent, name) = split_new_path(&path);
                    fs.add_children(parent, vec![Node::file(name)]).await?;
                }
                Ok(None)
            }
            ShellCommand::Write { path, text } => {
                fs.write(&path, text).await?;
                Ok(None)
            }
            ShellCommand::Cat { path } => Ok(Some(fs.read(&path)?.unwrap_or_default())),
            ShellCommand::Rm { path } => {
                fs.remove_item(&path).await?;
                Ok(None)
            }
            ShellCommand::Mv { path, destination } => {
                fs.move_item(&path, &destination, MoveOptions::default())
                    .await?;
                Ok(None)
            }
            ShellCommand::Cp { path, destination } => {
                fs.move_item(&path, &destination, MoveOptions::copy())
                    .await?;
                Ok(None)
            }
            ShellCommand::Rename { path, name } => {
                fs.rename_item(&path, &name).await?;
                Ok(None)
            }
            ShellCommand::Echo { text } => Ok(Some(text)),
        }
    }

    fn format_entries(&self, entries: &[Entry]) -> String {
        entries
            .iter()
            .map(|entry| match entry.kind {
                NodeKind::Directory if self.color => entry.name.as_str().blue().bold().to_string(),
                NodeKind::Directory => format!("{}/", entry.name),
                NodeKind::File => entry.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Splits the target of `mkdir`/`touch` into the directory to add to and the
/// name to create there.
fn split_new_path(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((parent, name)) => (parent, name),
        None => (".", trimmed),
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("{}", source))]
    ParseError { source: CommandParseError },
    #[snafu(display("{}", source))]
    FileSystemError { source: FsError },
}
