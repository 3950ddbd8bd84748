//! Entry point tying a host tree to queries, events and waits

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use host::utils::get_text_content;
use host::{HostTree, NodeId, NodeKind, TreeError};

use crate::config::ConfigContext;
use crate::error::WaitError;
use crate::wait::{self, Absence, Presence, Timers, TokioTimers, WaitForOptions};

/// Host tree shared between the test body, handlers and poll tasks
pub type SharedTree = Arc<RwLock<HostTree>>;

pub fn share(tree: HostTree) -> SharedTree {
    Arc::new(RwLock::new(tree))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// State a real platform would keep natively, recorded by fired events
#[derive(Debug, Clone, Default)]
pub struct NativeState {
    pub values: AHashMap<NodeId, String>,
    pub content_offsets: AHashMap<NodeId, Point>,
}

/// Queries, events and waits bound to one tree and one scope.
///
/// Cloning is cheap; clones share the tree, config and native state.
#[derive(Clone)]
pub struct Screen {
    tree: SharedTree,
    scope: Option<NodeId>,
    config: ConfigContext,
    timers: Arc<dyn Timers>,
    native_state: Arc<RwLock<NativeState>>,
}

impl Screen {
    pub fn new(tree: HostTree) -> Self {
        Self::from_shared(share(tree))
    }

    pub fn from_shared(tree: SharedTree) -> Self {
        Self {
            tree,
            scope: None,
            config: ConfigContext::default(),
            timers: Arc::new(TokioTimers),
            native_state: Arc::default(),
        }
    }

    pub fn with_config(mut self, config: ConfigContext) -> Self {
        self.config = config;
        self
    }

    pub fn with_timers(mut self, timers: Arc<dyn Timers>) -> Self {
        self.timers = timers;
        self
    }

    /// Same tree and settings, queries rooted at `node_id`
    pub fn within(&self, node_id: NodeId) -> Screen {
        Screen {
            scope: Some(node_id),
            ..self.clone()
        }
    }

    pub fn tree(&self) -> SharedTree {
        self.tree.clone()
    }

    pub fn config(&self) -> &ConfigContext {
        &self.config
    }

    pub fn timers(&self) -> &dyn Timers {
        self.timers.as_ref()
    }

    pub fn scope(&self) -> Option<NodeId> {
        self.scope
    }

    pub fn read(&self) -> RwLockReadGuard<'_, HostTree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, HostTree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn native_state(&self) -> RwLockReadGuard<'_, NativeState> {
        self.native_state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn native_state_mut(&self) -> RwLockWriteGuard<'_, NativeState> {
        self.native_state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Root of the current scope
    pub(crate) fn scope_root(&self, tree: &HostTree) -> Result<NodeId, TreeError> {
        match self.scope {
            Some(node_id) => {
                tree.get(node_id)?;
                Ok(node_id)
            }
            None => tree.root_id().ok_or(TreeError::NoRoot),
        }
    }

    /// Whether the node is still part of the rendered tree
    pub fn is_mounted(&self, node_id: NodeId) -> bool {
        self.read().is_attached(node_id)
    }

    pub fn text_content(&self, node_id: NodeId) -> Result<String, TreeError> {
        get_text_content(&self.read(), node_id)
    }

    /// Current value of a text input: typed text first, then `value`,
    /// then `defaultValue`
    pub fn display_value(&self, node_id: NodeId) -> Option<String> {
        let tree = self.read();
        let node = tree.get(node_id).ok()?;
        if node.kind != NodeKind::TextInput {
            return None;
        }
        if let Some(value) = self.native_state().values.get(&node_id) {
            return Some(value.clone());
        }
        node.props
            .text_value()
            .or(node.props.default_value.as_deref())
            .map(str::to_string)
    }

    /// Last scroll position recorded for a scroll view
    pub fn content_offset(&self, node_id: NodeId) -> Option<Point> {
        self.native_state().content_offsets.get(&node_id).copied()
    }

    /// [`wait::wait_for`] on this screen's timers, timeout from config when
    /// not given
    pub async fn wait_for<T, E, F>(&self, callback: F, options: &WaitForOptions) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let options = self.resolve_wait_options(options);
        wait::wait_for(self.timers(), callback, &options).await
    }

    pub async fn wait_for_element_to_be_removed<T, E, F>(
        &self,
        callback: F,
        options: &WaitForOptions,
    ) -> Result<T, WaitError>
    where
        T: Presence,
        E: Absence + fmt::Display,
        F: FnMut() -> Result<T, E>,
    {
        let options = self.resolve_wait_options(options);
        wait::wait_for_element_to_be_removed(self.timers(), callback, &options).await
    }

    fn resolve_wait_options(&self, options: &WaitForOptions) -> WaitForOptions {
        WaitForOptions {
            timeout: Some(
                options
                    .timeout
                    .unwrap_or_else(|| self.config.get().async_util_timeout()),
            ),
            interval: options.interval,
        }
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("scope", &self.scope)
            .field("config", &self.config.get())
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}
