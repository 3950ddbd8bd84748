use std::fmt;

use crate::matches::NormalizerFn;

/// Options shared by every query family
#[derive(Clone)]
pub struct QueryOptions {
    /// Whole-value match (`true`) or normalized case-insensitive substring
    pub exact: bool,
    /// Replaces the default trim + collapse-whitespace normalizer
    pub normalizer: Option<NormalizerFn>,
    /// Falls back to the configured default when unset
    pub include_hidden_elements: Option<bool>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            exact: true,
            normalizer: None,
            include_hidden_elements: None,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn normalizer(mut self, normalizer: NormalizerFn) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn include_hidden_elements(mut self, include: bool) -> Self {
        self.include_hidden_elements = Some(include);
        self
    }

    /// Alias of [`QueryOptions::include_hidden_elements`]
    pub fn hidden(self, include: bool) -> Self {
        self.include_hidden_elements(include)
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("exact", &self.exact)
            .field("normalizer", &self.normalizer.as_ref().map(|_| "<fn>"))
            .field("include_hidden_elements", &self.include_hidden_elements)
            .finish()
    }
}
