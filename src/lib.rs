//! A sandboxed, persistent hierarchical namespace.
//!
//! The tree lives in memory as owned [`tree::Node`] values and is saved as one
//! JSON snapshot under a single key after every mutation. [`filesystem::FileSystem`]
//! is the entry point; [`application::Shell`] drives it from text commands.

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod config;
pub mod ext;
pub mod filesystem;
pub mod path;
pub mod snapshot;
pub mod storage;
pub mod tree;

pub use filesystem::{FileSystem, FsError, MoveOptions, MoveType, Namespace};
pub use tree::{Entry, Node, NodeKind};
