//! The namespace facade.
//!
//! [`Namespace`] holds the tree and the working directory and implements every
//! operation synchronously, guards first and mutation last. [`FileSystem`] wraps it
//! with the store handle, serializes mutations and persists a full snapshot after
//! each one.

mod error;
mod facade;
mod namespace;

pub use error::{FsError, Operation};
pub use facade::FileSystem;
pub use namespace::{MoveOptions, MoveType, Namespace};
