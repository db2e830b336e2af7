//! In-memory filesystem tree.
//!
//! This module provides the node tree, absolute path resolution over it and
//! the [`Vfs`] context that the shell commands navigate and mutate.

mod node;
mod resolver;
mod vfs;

pub use node::{Node, NodeKind};
pub use resolver::segments;
pub use vfs::{RECORD_DELIMITER, Vfs, VfsError};
