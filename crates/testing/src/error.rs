//! Error types for queries and async waits
//!
//! "Not found" and "multiple found" are separate variants: `query_by*`
//! swallows the first and never the second.

use host::TreeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Unable to find an element with {description}")]
    ElementNotFound { description: String },

    #[error("Found multiple elements with {description} (expected exactly 1, found {count})")]
    MultipleElementsFound { description: String, count: usize },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::ElementNotFound { .. })
    }

    pub fn is_multiple_found(&self) -> bool {
        matches!(self, QueryError::MultipleElementsFound { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("Timed out in {operation}.")]
    Timeout { operation: &'static str },

    #[error(
        "The element(s) given to waitForElementToBeRemoved are already removed. \
         waitForElementToBeRemoved requires that the element(s) exist(s) before waiting for removal."
    )]
    PrematureRemoval,

    /// The callback failed with something other than "not found"
    #[error("waitForElementToBeRemoved callback failed: {message}")]
    Callback { message: String },
}
