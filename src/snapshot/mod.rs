//! Whole-tree serialization.
//!
//! A snapshot is the JSON rendering of the root directory and everything below it.
//! It is always written and read in one piece.

mod codec;

pub use codec::{SnapshotError, decode, encode};
