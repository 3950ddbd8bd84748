//! Error types for host tree operations
//!
//! Flat hierarchy, same as the rest of the workspace.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Tree has no root node")]
    NoRoot,

    #[error("Node {0} is already attached to a parent")]
    AlreadyAttached(u32),

    #[error("Invalid node kind: {0}")]
    InvalidNodeKind(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        TreeError::ParseError(err.to_string())
    }
}
