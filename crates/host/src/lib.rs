//! Host element tree
//!
//! Arena storage for the tree a native renderer commits in tests.
//!
//! ## Core Design
//!
//! ```text
//! renderer JSON → TreeParser → HostTree (owned) → queries / events
//!                                  ↓
//!                            NodeId (u32), parent = index
//! ```
//!
//! The tree owner mutates it between commits; consumers hold ids, never
//! references, so a removed node just stops resolving.

pub mod arena;
pub mod error;
pub mod parser;
pub mod props;
pub mod types;
pub mod utils;

pub use arena::HostTree;
pub use error::{Result, TreeError};
pub use parser::{ParserConfig, TreeParser};
pub use props::*;
pub use types::*;
