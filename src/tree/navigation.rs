use crate::path::display_path;

use super::{Node, TreeError};

impl Node {
    /// Walks `segments` down from this node.
    pub fn locate(&self, segments: &[String]) -> Result<&Node, TreeError> {
        let mut current = self;

        for (depth, segment) in segments.iter().enumerate() {
            current = match current {
                Node::Directory { children, .. } => children
                    .iter()
                    .find(|child| child.name() == segment)
                    .ok_or_else(|| TreeError::NotFound {
                        path: display_path(&segments[..=depth]),
                    })?,
                Node::File { .. } => {
                    return Err(TreeError::PathThroughFile {
                        path: display_path(&segments[..depth]),
                    });
                }
            };
        }

        Ok(current)
    }

    pub fn locate_mut(&mut self, segments: &[String]) -> Result<&mut Node, TreeError> {
        let mut current = self;

        for (depth, segment) in segments.iter().enumerate() {
            current = match current {
                Node::Directory { children, .. } => children
                    .iter_mut()
                    .find(|child| child.name() == segment)
                    .ok_or_else(|| TreeError::NotFound {
                        path: display_path(&segments[..=depth]),
                    })?,
                Node::File { .. } => {
                    return Err(TreeError::PathThroughFile {
                        path: display_path(&segments[..depth]),
                    });
                }
            };
        }

        Ok(current)
    }

    /// Finds the directory holding the node at `segments` and the node's position
    /// among its children.
    pub fn locate_with_parent(&self, segments: &[String]) -> Result<(&Node, usize), TreeError> {
        let (leaf, parent_path) = segments.split_last().ok_or(TreeError::RootHasNoParent)?;
        let parent = self.locate(parent_path)?;

        let children = parent.children().ok_or_else(|| TreeError::PathThroughFile {
            path: display_path(parent_path),
        })?;
        let index = children
            .iter()
            .position(|child| child.name() == leaf)
            .ok_or_else(|| TreeError::NotFound {
                path: display_path(segments),
            })?;

        Ok((parent, index))
    }

    /// Mutable counterpart of [`Node::locate_with_parent`], handing out the parent's
    /// children so the caller can detach or edit the leaf in place.
    pub fn locate_with_parent_mut(
        &mut self,
        segments: &[String],
    ) -> Result<(&mut Vec<Node>, usize), TreeError> {
        let (leaf, parent_path) = segments.split_last().ok_or(TreeError::RootHasNoParent)?;

        match self.locate_mut(parent_path)? {
            Node::Directory { children, .. } => {
                let index = children
                    .iter()
                    .position(|child| child.name() == leaf)
                    .ok_or_else(|| TreeError::NotFound {
                        path: display_path(segments),
                    })?;
                Ok((children, index))
            }
            Node::File { .. } => Err(TreeError::PathThroughFile {
                path: display_path(parent_path),
            }),
        }
    }
}
