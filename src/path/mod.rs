//! Pure path arithmetic over segment lists.
//!
//! Nothing in here touches the tree or the store: paths are resolved against a
//! working directory and turned into absolute segment sequences.

mod resolver;

pub use resolver::{display_path, is_prefix_of, join_segments, normalize};
