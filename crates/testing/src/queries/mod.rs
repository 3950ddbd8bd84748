//! Query engine
//!
//! Every family shares one contract, expressed once on [`Screen`] over the
//! [`Query`] enum and then spelled out per family by `query_family!`:
//!
//! | variant        | 0 matches          | 1 match     | >1 matches              |
//! |----------------|--------------------|-------------|-------------------------|
//! | `get_by`       | `ElementNotFound`  | `Ok(id)`    | `MultipleElementsFound` |
//! | `get_all_by`   | `ElementNotFound`  | `Ok([id])`  | `Ok([ids])`             |
//! | `query_by`     | `Ok(None)`         | `Ok(Some)`  | `MultipleElementsFound` |
//! | `query_all_by` | `Ok([])`           | `Ok([id])`  | `Ok([ids])`             |
//!
//! `find_by` / `find_all_by` poll the `get` variants through `wait_for`.

pub mod find_all;
pub mod options;
pub mod query;

pub use find_all::{find_all, FindAllOptions};
pub use options::QueryOptions;
pub use query::{Query, RoleQuery};

use host::utils::{cap_text_length, get_text_content};
use host::{HostNode, HostTree, NodeId, NodeKind, TreeError};
use tracing::trace;

use crate::accessibility::{
    compute_accessible_name, get_role, is_accessibility_element, match_accessibility_state,
    match_accessibility_value, normalize_role, AccessibilityStateMatcher,
    AccessibilityValueMatcher,
};
use crate::error::{QueryError, Result};
use crate::matches::{match_string_prop, matches, TextMatch};
use crate::screen::{NativeState, Screen};
use crate::wait::WaitForOptions;

/// Everything a predicate needs besides the node
struct QueryContext<'a> {
    tree: &'a HostTree,
    native_state: &'a NativeState,
    options: &'a QueryOptions,
    include_hidden: bool,
}

impl QueryContext<'_> {
    fn text_matches(&self, matcher: &TextMatch, text: &str) -> bool {
        matches(
            matcher,
            text,
            self.options.normalizer.as_ref(),
            self.options.exact,
        )
    }

    fn prop_matches(&self, matcher: &TextMatch, value: Option<&str>) -> bool {
        value.is_some_and(|value| self.text_matches(matcher, value))
    }

    fn find(
        &self,
        root: NodeId,
        match_deepest_only: bool,
        predicate: impl Fn(&HostNode) -> bool,
    ) -> std::result::Result<Vec<NodeId>, TreeError> {
        find_all(
            self.tree,
            root,
            predicate,
            FindAllOptions {
                include_hidden_elements: self.include_hidden,
                match_deepest_only,
            },
        )
    }

    fn query_all(
        &self,
        root: NodeId,
        query: &Query,
    ) -> std::result::Result<Vec<NodeId>, TreeError> {
        match query {
            Query::TestId(m) => self.find(root, false, |node| {
                self.prop_matches(m, node.props.test_id.as_deref())
            }),
            Query::Text(m) => self.find(root, true, |node| {
                node.kind == NodeKind::Text
                    && !(self.is_substring_match(m) && self.only_joins_nested_texts(node))
                    && get_text_content(self.tree, node.node_id)
                        .is_ok_and(|text| self.text_matches(m, &text))
            }),
            Query::Role(role) => self.find(root, false, |node| self.matches_role(node, role)),
            Query::LabelText(m) => self.find(root, false, |node| self.matches_label(node, m)),
            Query::HintText(m) => self.find(root, false, |node| {
                self.prop_matches(m, node.props.accessibility_hint.as_deref())
            }),
            Query::PlaceholderText(m) => self.find(root, false, |node| {
                node.kind == NodeKind::TextInput
                    && self.prop_matches(m, node.props.placeholder.as_deref())
            }),
            Query::DisplayValue(m) => self.find(root, false, |node| {
                node.kind == NodeKind::TextInput
                    && self.prop_matches(m, self.display_value(node))
            }),
            Query::State(state) => self.find(root, false, |node| {
                match_accessibility_state(node, state)
            }),
            Query::Value(value) => self.find(root, false, |node| {
                match_accessibility_value(node, value)
            }),
        }
    }

    fn is_substring_match(&self, matcher: &TextMatch) -> bool {
        !self.options.exact && matches!(matcher, TextMatch::Str(_))
    }

    /// A `Text` whose content comes entirely from two or more nested `Text`
    /// children. A substring match on it would only exist across their
    /// boundary; a match inside one child lands on that child instead.
    fn only_joins_nested_texts(&self, node: &HostNode) -> bool {
        let mut nested_texts = 0;
        for child in node
            .children_ids
            .iter()
            .filter_map(|&id| self.tree.get(id).ok())
        {
            match child.kind {
                NodeKind::RawText if !child.node_value.trim().is_empty() => return false,
                NodeKind::Text => nested_texts += 1,
                _ => {}
            }
        }
        nested_texts >= 2
    }

    fn display_value<'n>(&'n self, node: &'n HostNode) -> Option<&'n str> {
        self.native_state
            .values
            .get(&node.node_id)
            .map(String::as_str)
            .or_else(|| node.props.text_value())
            .or(node.props.default_value.as_deref())
    }

    fn matches_label(&self, node: &HostNode, matcher: &TextMatch) -> bool {
        if self.prop_matches(matcher, node.props.explicit_label()) {
            return true;
        }

        node.props
            .labelled_by()
            .and_then(|label_id| self.tree.find_by_native_id(node.node_id, label_id))
            .and_then(|label| get_text_content(self.tree, label).ok())
            .is_some_and(|text| self.text_matches(matcher, &text))
    }

    fn matches_role(&self, node: &HostNode, query: &RoleQuery) -> bool {
        if !is_accessibility_element(node) {
            return false;
        }

        let role_matches = match &query.role {
            TextMatch::Str(role) => get_role(node) == normalize_role(role),
            regex => match_string_prop(Some(get_role(node)), regex),
        };
        if !role_matches {
            return false;
        }

        if !query.state.is_empty() && !match_accessibility_state(node, &query.state) {
            return false;
        }
        if !query.value.is_empty() && !match_accessibility_value(node, &query.value) {
            return false;
        }

        match &query.name {
            Some(name) => self.matches_accessible_name(node, name),
            None => true,
        }
    }

    /// Computed accessible name, or any nested text / label match
    fn matches_accessible_name(&self, node: &HostNode, name: &TextMatch) -> bool {
        if compute_accessible_name(self.tree, node.node_id)
            .is_some_and(|accessible_name| self.text_matches(name, &accessible_name))
        {
            return true;
        }

        [Query::Text(name.clone()), Query::LabelText(name.clone())]
            .iter()
            .any(|nested| {
                self.query_all(node.node_id, nested)
                    .is_ok_and(|found| !found.is_empty())
            })
    }
}

/// Longest matcher description quoted in an error
const MAX_DESCRIPTION_LEN: usize = 200;

fn describe(query: &Query) -> String {
    cap_text_length(&query.to_string(), MAX_DESCRIPTION_LEN)
}

fn not_found(query: &Query) -> QueryError {
    QueryError::ElementNotFound {
        description: describe(query),
    }
}

impl Screen {
    /// All matches in document order; an empty `Vec` when nothing matches
    pub fn query_all_by(&self, query: &Query, options: &QueryOptions) -> Result<Vec<NodeId>> {
        let tree = self.read();
        let native_state = self.native_state();
        let root = self.scope_root(&tree)?;
        let include_hidden = options
            .include_hidden_elements
            .unwrap_or_else(|| self.config().get().default_include_hidden_elements);

        let context = QueryContext {
            tree: &tree,
            native_state: &native_state,
            options,
            include_hidden,
        };
        let found = context.query_all(root, query)?;

        trace!(
            family = query.family(),
            root,
            include_hidden,
            matches = found.len(),
            "query evaluated"
        );
        Ok(found)
    }

    pub fn get_all_by(&self, query: &Query, options: &QueryOptions) -> Result<Vec<NodeId>> {
        let found = self.query_all_by(query, options)?;
        if found.is_empty() {
            return Err(not_found(query));
        }
        Ok(found)
    }

    pub fn get_by(&self, query: &Query, options: &QueryOptions) -> Result<NodeId> {
        let found = self.query_all_by(query, options)?;
        match found.as_slice() {
            [] => Err(not_found(query)),
            [node_id] => Ok(*node_id),
            _ => Err(QueryError::MultipleElementsFound {
                description: describe(query),
                count: found.len(),
            }),
        }
    }

    /// Like [`Screen::get_by`] with "not found" turned into `None`
    pub fn query_by(&self, query: &Query, options: &QueryOptions) -> Result<Option<NodeId>> {
        match self.get_by(query, options) {
            Ok(node_id) => Ok(Some(node_id)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn find_by(
        &self,
        query: &Query,
        options: &QueryOptions,
        wait_options: &WaitForOptions,
    ) -> Result<NodeId> {
        self.wait_for(|| self.get_by(query, options), wait_options)
            .await
    }

    pub async fn find_all_by(
        &self,
        query: &Query,
        options: &QueryOptions,
        wait_options: &WaitForOptions,
    ) -> Result<Vec<NodeId>> {
        self.wait_for(|| self.get_all_by(query, options), wait_options)
            .await
    }
}

macro_rules! query_family {
    (
        $variant:ident($matcher:ty):
        $get:ident, $get_all:ident, $query:ident, $query_all:ident, $find:ident, $find_all:ident
    ) => {
        impl Screen {
            #[doc = concat!("[`Screen::get_by`] for [`Query::", stringify!($variant), "`]")]
            pub fn $get(&self, matcher: impl Into<$matcher>, options: &QueryOptions) -> Result<NodeId> {
                self.get_by(&Query::$variant(matcher.into()), options)
            }

            #[doc = concat!("[`Screen::get_all_by`] for [`Query::", stringify!($variant), "`]")]
            pub fn $get_all(
                &self,
                matcher: impl Into<$matcher>,
                options: &QueryOptions,
            ) -> Result<Vec<NodeId>> {
                self.get_all_by(&Query::$variant(matcher.into()), options)
            }

            #[doc = concat!("[`Screen::query_by`] for [`Query::", stringify!($variant), "`]")]
            pub fn $query(
                &self,
                matcher: impl Into<$matcher>,
                options: &QueryOptions,
            ) -> Result<Option<NodeId>> {
                self.query_by(&Query::$variant(matcher.into()), options)
            }

            #[doc = concat!("[`Screen::query_all_by`] for [`Query::", stringify!($variant), "`]")]
            pub fn $query_all(
                &self,
                matcher: impl Into<$matcher>,
                options: &QueryOptions,
            ) -> Result<Vec<NodeId>> {
                self.query_all_by(&Query::$variant(matcher.into()), options)
            }

            #[doc = concat!("[`Screen::find_by`] for [`Query::", stringify!($variant), "`]")]
            pub async fn $find(
                &self,
                matcher: impl Into<$matcher>,
                options: &QueryOptions,
                wait_options: &WaitForOptions,
            ) -> Result<NodeId> {
                self.find_by(&Query::$variant(matcher.into()), options, wait_options)
                    .await
            }

            #[doc = concat!("[`Screen::find_all_by`] for [`Query::", stringify!($variant), "`]")]
            pub async fn $find_all(
                &self,
                matcher: impl Into<$matcher>,
                options: &QueryOptions,
                wait_options: &WaitForOptions,
            ) -> Result<Vec<NodeId>> {
                self.find_all_by(&Query::$variant(matcher.into()), options, wait_options)
                    .await
            }
        }
    };
}

query_family!(TestId(TextMatch):
    get_by_test_id, get_all_by_test_id, query_by_test_id, query_all_by_test_id,
    find_by_test_id, find_all_by_test_id);
query_family!(Text(TextMatch):
    get_by_text, get_all_by_text, query_by_text, query_all_by_text,
    find_by_text, find_all_by_text);
query_family!(Role(RoleQuery):
    get_by_role, get_all_by_role, query_by_role, query_all_by_role,
    find_by_role, find_all_by_role);
query_family!(LabelText(TextMatch):
    get_by_label_text, get_all_by_label_text, query_by_label_text, query_all_by_label_text,
    find_by_label_text, find_all_by_label_text);
query_family!(HintText(TextMatch):
    get_by_hint_text, get_all_by_hint_text, query_by_hint_text, query_all_by_hint_text,
    find_by_hint_text, find_all_by_hint_text);
query_family!(PlaceholderText(TextMatch):
    get_by_placeholder_text, get_all_by_placeholder_text, query_by_placeholder_text,
    query_all_by_placeholder_text, find_by_placeholder_text, find_all_by_placeholder_text);
query_family!(DisplayValue(TextMatch):
    get_by_display_value, get_all_by_display_value, query_by_display_value,
    query_all_by_display_value, find_by_display_value, find_all_by_display_value);
query_family!(State(AccessibilityStateMatcher):
    get_by_state, get_all_by_state, query_by_state, query_all_by_state,
    find_by_state, find_all_by_state);
query_family!(Value(AccessibilityValueMatcher):
    get_by_value, get_all_by_value, query_by_value, query_all_by_value,
    find_by_value, find_all_by_value);
