//! Query and interaction engine for rendered host trees
//!
//! Finds elements the way a user (or a screen reader) would, fires events
//! at them, and waits for asynchronous UI updates.
//!
//! ## Core Design
//!
//! ```text
//! HostTree ──share()──► Arc<RwLock<HostTree>>
//!                               │
//!                            Screen ── ConfigContext
//!                     ┌─────────┼──────────┐
//!                  queries    events     wait_for
//!                     │         │          │
//!               accessibility  handler   Timers (tokio / virtual)
//!                  matches     resolve
//! ```
//!
//! Queries and events are synchronous and take the tree lock only for the
//! duration of one call. Only `find_by*` and `wait_for*` suspend.
//!
//! ```no_run
//! use host::HostTree;
//! use serde_json::json;
//! use testing::{QueryOptions, RoleQuery, Screen};
//!
//! let tree = HostTree::from_json(&json!({
//!     "type": "Pressable",
//!     "props": { "role": "button" },
//!     "children": [{ "type": "Text", "children": ["Save"] }]
//! }))?;
//! let screen = Screen::new(tree);
//!
//! let save = screen.get_by_role(RoleQuery::new("button").name("Save"), &QueryOptions::default())?;
//! screen.press(save, None);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessibility;
pub mod config;
pub mod error;
pub mod event;
pub mod matches;
pub mod queries;
pub mod screen;
pub mod wait;

pub use accessibility::{AccessibilityStateMatcher, AccessibilityValueMatcher};
pub use config::{Config, ConfigContext, ConfigUpdate, DebugOptions};
pub use error::{QueryError, Result, WaitError};
pub use event::EventDescriptor;
pub use matches::{default_normalizer, NormalizerConfig, NormalizerFn, TextMatch};
pub use queries::{Query, QueryOptions, RoleQuery};
pub use screen::{share, NativeState, Point, Screen, SharedTree};
pub use wait::{Timers, TokioTimers, VirtualTimers, WaitForOptions};
