use derive_more::Display;
use snafu::Snafu;

use crate::path::display_path;
use crate::snapshot::SnapshotError;
use crate::storage::StoreError;
use crate::tree::TreeError;

/// Destructive operations covered by the working-directory guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    #[display("remove")]
    Remove,
    #[display("rename")]
    Rename,
    #[display("move")]
    Move,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum FsError {
    #[snafu(display("No such file or directory: {}", path))]
    NotFound { path: String },
    #[snafu(display("Path passes through a file: {}", path))]
    PathThroughFile { path: String },
    #[snafu(display("Not a directory: {}", path))]
    NotADirectory { path: String },
    #[snafu(display("Is a directory: {}", path))]
    IsADirectory { path: String },
    #[snafu(display("'{}' already exists in {}", name, parent))]
    AlreadyExists { name: String, parent: String },
    #[snafu(display("Invalid name: '{}'", name))]
    InvalidName { name: String },
    #[snafu(display("Cannot remove the root directory"))]
    CannotRemoveRoot,
    #[snafu(display("Cannot rename the root directory"))]
    CannotRenameRoot,
    #[snafu(display("Cannot move the root directory"))]
    CannotMoveRoot,
    #[snafu(display(
        "Cannot {} {}: it contains the current working directory",
        operation,
        path
    ))]
    CannotRemoveAncestorOfCwd { operation: Operation, path: String },
    #[snafu(display("Cannot move {} into its own subtree at {}", path, destination))]
    CannotMoveIntoDescendant { path: String, destination: String },
    #[snafu(display("Failed to persist the namespace"))]
    StorageFailure { source: StoreError },
    #[snafu(display("Failed to process the namespace snapshot"))]
    SnapshotFailure { source: SnapshotError },
}

impl From<TreeError> for FsError {
    fn from(error: TreeError) -> Self {
        match error {
            TreeError::NotFound { path } => FsError::NotFound { path },
            TreeError::PathThroughFile { path } => FsError::PathThroughFile { path },
            TreeError::InvalidName { name } => FsError::InvalidName { name },
            TreeError::DuplicateName { name, parent } => FsError::AlreadyExists { name, parent },
            TreeError::RootHasNoParent => FsError::NotFound {
                path: display_path(&[]),
            },
        }
    }
}
