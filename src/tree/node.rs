use std::collections::HashSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::path::display_path;

use super::TreeError;

/// Name of the directory every namespace is rooted at.
pub const ROOT_NAME: &str = "root";

/// A node of the namespace tree.
///
/// The serde representation is the persisted snapshot format:
/// `{"type":"directory","name":..,"children":[..]}` or
/// `{"type":"file","name":..,"content":..}`. A file that was never written has
/// no `content` field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Directory { name: String, children: Vec<Node> },
    File {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// A shallow view of a node as shown by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn root() -> Self {
        Self::directory(ROOT_NAME)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::directory_with(name, Vec::new())
    }

    pub fn directory_with(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            content: None,
        }
    }

    pub fn file_with(name: impl Into<String>, content: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            content: Some(content.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory { .. } => NodeKind::Directory,
            Node::File { .. } => NodeKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    /// Children in display order, `None` for files.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Directory { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    /// File content, `None` for directories and for files never written.
    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File { content, .. } => content.as_deref(),
            Node::Directory { .. } => None,
        }
    }

    pub fn entry(&self) -> Entry {
        Entry {
            name: self.name().to_string(),
            kind: self.kind(),
        }
    }

    pub fn child_named(&self, name: &str) -> Option<&Node> {
        self.children()?.iter().find(|child| child.name() == name)
    }

    pub fn rename(&mut self, new_name: impl Into<String>) {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => *name = new_name.into(),
        }
    }

    /// Checks names and sibling uniqueness across the whole subtree.
    /// `location` is the absolute path of the directory holding this node.
    pub fn validate(&self, location: &[String]) -> Result<(), TreeError> {
        validate_name(self.name())?;

        let mut own_path = location.to_vec();
        own_path.push(self.name().to_string());
        self.validate_children(&own_path)
    }

    /// Same as [`Node::validate`] minus the check on this node's own name, for a
    /// directory living at `own_path`. Used on the root, whose name is fixed.
    pub fn validate_children(&self, own_path: &[String]) -> Result<(), TreeError> {
        let Some(children) = self.children() else {
            return Ok(());
        };

        let mut seen = HashSet::new();
        for child in children {
            if !seen.insert(child.name()) {
                return Err(TreeError::DuplicateName {
                    name: child.name().to_string(),
                    parent: display_path(own_path),
                });
            }
            child.validate(own_path)?;
        }

        Ok(())
    }
}

/// A name is usable when it is non-empty, is not `.` or `..`, and holds no `/`.
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
