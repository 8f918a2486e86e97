use std::collections::HashSet;

use snafu::prelude::*;
use tracing::debug;

use crate::path::{display_path, is_prefix_of, join_segments, normalize};
use crate::tree::{Entry, Node, validate_name};

use super::error::{
    AlreadyExistsSnafu, CannotMoveIntoDescendantSnafu, CannotMoveRootSnafu,
    CannotRemoveAncestorOfCwdSnafu, CannotRemoveRootSnafu, CannotRenameRootSnafu, FsError,
    IsADirectorySnafu, NotADirectorySnafu,
};
use super::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveType {
    /// Detach the source once it is attached under the destination
    #[default]
    Move,
    /// Leave the source in place
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOptions {
    pub move_type: MoveType,
}

impl MoveOptions {
    pub fn copy() -> Self {
        Self {
            move_type: MoveType::Copy,
        }
    }
}

/// The tree plus the working directory.
///
/// Every operation resolves its path against the working directory, runs all of
/// its guards and only then touches the tree, so a failed call leaves the
/// namespace exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    root: Node,
    cwd: Vec<String>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::from_root(Node::root())
    }
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts at the root of an already validated tree.
    pub fn from_root(root: Node) -> Self {
        Self {
            root,
            cwd: Vec::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    pub fn current_path(&self) -> String {
        join_segments(&self.cwd)
    }

    pub fn resolve(&self, path: &str) -> Vec<String> {
        normalize(path, &self.cwd)
    }

    pub fn get_item(&self, path: &str) -> Result<&Node, FsError> {
        Ok(self.root.locate(&self.resolve(path))?)
    }

    pub fn list(&self, path: &str) -> Result<Vec<Entry>, FsError> {
        let target = self.resolve(path);
        Ok(self
            .directory_children(&target)?
            .iter()
            .map(Node::entry)
            .collect())
    }

    pub fn read(&self, path: &str) -> Result<Option<&str>, FsError> {
        let target = self.resolve(path);
        match self.root.locate(&target)? {
            Node::File { content, .. } => Ok(content.as_deref()),
            Node::Directory { .. } => IsADirectorySnafu {
                path: display_path(&target),
            }
            .fail(),
        }
    }

    pub fn set_current_directory(&mut self, path: &str) -> Result<(), FsError> {
        let target = self.resolve(path);
        match self.root.locate(&target)? {
            Node::Directory { .. } => {
                debug!("Changing working directory to {}", display_path(&target));
                self.cwd = target;
                Ok(())
            }
            Node::File { .. } => NotADirectorySnafu {
                path: display_path(&target),
            }
            .fail(),
        }
    }

    /// Appends `nodes` to the directory at `path`, in order. Nothing is added
    /// unless every node can be.
    pub fn add_children(&mut self, path: &str, nodes: Vec<Node>) -> Result<(), FsError> {
        let target = self.resolve(path);
        let existing = self.directory_children(&target)?;

        let mut incoming = HashSet::new();
        for node in &nodes {
            node.validate(&target)?;

            let taken = existing.iter().any(|child| child.name() == node.name());
            ensure!(
                !taken && incoming.insert(node.name()),
                AlreadyExistsSnafu {
                    name: node.name(),
                    parent: display_path(&target),
                }
            );
        }

        debug!(
            "Adding {} node(s) under {}",
            nodes.len(),
            display_path(&target)
        );
        self.directory_children_mut(&target)?.extend(nodes);
        Ok(())
    }

    pub fn write(&mut self, path: &str, data: impl Into<String>) -> Result<(), FsError> {
        let target = self.resolve(path);
        match self.root.locate_mut(&target)? {
            Node::File { content, .. } => {
                *content = Some(data.into());
                Ok(())
            }
            Node::Directory { .. } => IsADirectorySnafu {
                path: display_path(&target),
            }
            .fail(),
        }
    }

    /// Detaches the node at `path` and hands it back.
    pub fn remove_item(&mut self, path: &str) -> Result<Node, FsError> {
        let target = self.resolve(path);
        ensure!(!target.is_empty(), CannotRemoveRootSnafu);
        self.guard_working_directory(&target, Operation::Remove)?;

        let (children, index) = self.root.locate_with_parent_mut(&target)?;
        debug!("Removing {}", display_path(&target));
        Ok(children.remove(index))
    }

    pub fn rename_item(&mut self, path: &str, new_name: &str) -> Result<(), FsError> {
        let target = self.resolve(path);
        ensure!(!target.is_empty(), CannotRenameRootSnafu);
        self.guard_working_directory(&target, Operation::Rename)?;
        validate_name(new_name)?;

        let (children, index) = self.root.locate_with_parent_mut(&target)?;
        let taken = children
            .iter()
            .enumerate()
            .any(|(position, child)| position != index && child.name() == new_name);
        ensure!(
            !taken,
            AlreadyExistsSnafu {
                name: new_name,
                parent: display_path(&target[..target.len() - 1]),
            }
        );

        debug!("Renaming {} to '{}'", display_path(&target), new_name);
        children[index].rename(new_name);
        Ok(())
    }

    /// Attaches a deep copy of the node at `path` under the directory at
    /// `new_parent`, keeping its name. A [`MoveType::Move`] also detaches the
    /// original.
    pub fn move_item(
        &mut self,
        path: &str,
        new_parent: &str,
        options: MoveOptions,
    ) -> Result<(), FsError> {
        let source = self.resolve(path);
        ensure!(!source.is_empty(), CannotMoveRootSnafu);
        self.guard_working_directory(&source, Operation::Move)?;

        let destination = self.resolve(new_parent);
        let node = self.root.locate(&source)?.clone();
        let taken = self
            .directory_children(&destination)?
            .iter()
            .any(|child| child.name() == node.name());
        ensure!(
            !taken,
            AlreadyExistsSnafu {
                name: node.name(),
                parent: display_path(&destination),
            }
        );
        if options.move_type == MoveType::Move {
            ensure!(
                !is_prefix_of(&source, &destination),
                CannotMoveIntoDescendantSnafu {
                    path: display_path(&source),
                    destination: display_path(&destination),
                }
            );
        }

        debug!(
            "{:?} {} into {}",
            options.move_type,
            display_path(&source),
            display_path(&destination)
        );
        self.directory_children_mut(&destination)?.push(node);
        if options.move_type == MoveType::Move {
            let (children, index) = self.root.locate_with_parent_mut(&source)?;
            children.remove(index);
        }
        Ok(())
    }

    fn guard_working_directory(&self, target: &[String], operation: Operation) -> Result<(), FsError> {
        ensure!(
            !is_prefix_of(target, &self.cwd),
            CannotRemoveAncestorOfCwdSnafu {
                operation,
                path: display_path(target),
            }
        );
        Ok(())
    }

    fn directory_children(&self, target: &[String]) -> Result<&[Node], FsError> {
        match self.root.locate(target)? {
            Node::Directory { children, .. } => Ok(children),
            Node::File { .. } => NotADirectorySnafu {
                path: display_path(target),
            }
            .fail(),
        }
    }

    fn directory_children_mut(&mut self, target: &[String]) -> Result<&mut Vec<Node>, FsError> {
        match self.root.locate_mut(target)? {
            Node::Directory { children, .. } => Ok(children),
            Node::File { .. } => NotADirectorySnafu {
                path: display_path(target),
            }
            .fail(),
        }
    }
}
