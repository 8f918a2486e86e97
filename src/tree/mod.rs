//! In-memory namespace tree.
//!
//! A directory owns its children outright; nodes carry no parent pointer, so any
//! parent lookup re-walks the tree from the root.

mod error;
mod navigation;
mod node;

pub use error::TreeError;
pub use node::{Entry, Node, NodeKind, ROOT_NAME, validate_name};
