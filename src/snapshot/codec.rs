use snafu::prelude::*;
use tracing::debug;

use crate::tree::{Node, ROOT_NAME, TreeError};

pub fn encode(root: &Node) -> Result<String, SnapshotError> {
    serde_json::to_string(root).context(EncodeSnafu)
}

/// Parses a snapshot and checks it describes a well-formed namespace: a directory
/// named after the root, with valid and unique names all the way down.
pub fn decode(serialized: &str) -> Result<Node, SnapshotError> {
    let root: Node = serde_json::from_str(serialized).context(DecodeSnafu)?;

    match &root {
        Node::Directory { name, .. } if name == ROOT_NAME => {}
        Node::Directory { name, .. } => {
            return UnexpectedRootNameSnafu { name: name.clone() }.fail();
        }
        Node::File { .. } => return RootNotDirectorySnafu.fail(),
    }

    root.validate_children(&[]).context(InvalidTreeSnafu)?;
    debug!("Decoded snapshot of {} bytes", serialized.len());

    Ok(root)
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to serialize the tree"))]
    EncodeError { source: serde_json::Error },
    #[snafu(display("Failed to parse the snapshot"))]
    DecodeError { source: serde_json::Error },
    #[snafu(display("Snapshot root is a file"))]
    RootNotDirectory,
    #[snafu(display("Snapshot root is named '{}' instead of '{}'", name, ROOT_NAME))]
    UnexpectedRootName { name: String },
    #[snafu(display("Snapshot describes an invalid tree"))]
    InvalidTree { source: TreeError },
}
