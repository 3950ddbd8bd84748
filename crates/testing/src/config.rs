//! Engine configuration
//!
//! One explicit context object instead of a process-wide singleton. A
//! [`Screen`](crate::Screen) holds a [`ConfigContext`]; clones of the
//! context share the same settings, so `configure` is visible to every
//! query bound to it until `reset_to_defaults`.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Default timeout for `wait_for` and `find_by*`
pub const DEFAULT_ASYNC_UTIL_TIMEOUT_MS: u64 = 1000;

/// Options forwarded to debug output. Stored only; printing lives elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Timeout for async helpers, milliseconds
    pub async_util_timeout: u64,
    /// Whether queries see accessibility-hidden elements by default
    pub default_include_hidden_elements: bool,
    pub default_debug_options: Option<DebugOptions>,
    pub concurrent_root: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            async_util_timeout: DEFAULT_ASYNC_UTIL_TIMEOUT_MS,
            default_include_hidden_elements: false,
            default_debug_options: None,
            concurrent_root: true,
        }
    }
}

impl Config {
    pub fn async_util_timeout(&self) -> Duration {
        Duration::from_millis(self.async_util_timeout)
    }
}

/// Partial update accepted by [`ConfigContext::configure`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub async_util_timeout: Option<u64>,
    pub default_include_hidden_elements: Option<bool>,
    /// Alias of `default_include_hidden_elements`, loses when both are set
    pub default_hidden: Option<bool>,
    pub default_debug_options: Option<DebugOptions>,
    pub concurrent_root: Option<bool>,
}

/// Shared, explicitly scoped configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigContext {
    inner: Arc<RwLock<Config>>,
}

impl ConfigContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Snapshot of the current settings
    pub fn get(&self) -> Config {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn configure(&self, update: ConfigUpdate) {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(timeout) = update.async_util_timeout {
            config.async_util_timeout = timeout;
        }
        if let Some(include_hidden) = update
            .default_include_hidden_elements
            .or(update.default_hidden)
        {
            config.default_include_hidden_elements = include_hidden;
        }
        if let Some(debug_options) = update.default_debug_options {
            config.default_debug_options = Some(debug_options);
        }
        if let Some(concurrent_root) = update.concurrent_root {
            config.concurrent_root = concurrent_root;
        }

        tracing::debug!(?config, "configuration updated");
    }

    pub fn reset_to_defaults(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Config::default();
        tracing::debug!("configuration reset to defaults");
    }
}
