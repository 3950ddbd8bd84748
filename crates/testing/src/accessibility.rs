//! Accessibility evaluation
//!
//! What an assistive user can perceive: whether a node is hidden, whether
//! it is an accessibility element, its role, name, state and value.
//!
//! Visibility for rendering and visibility for accessibility are different
//! axes. `opacity: 0` hides nothing here.

use ahash::AHashMap;
use host::utils::{get_host_siblings, get_text_content};
use host::{
    AccessibilityValue, CheckedState, HostNode, HostTree, ImportantForAccessibility, NodeId,
    NodeKind,
};
use std::fmt;

use crate::matches::{matches, TextMatch};

/// Per-query memo of "does this level hide its subtree"
pub type HiddenCache = AHashMap<NodeId, bool>;

/// Roles whose `checked` state is meaningful
const ROLES_SUPPORTING_CHECKED: &[&str] = &["checkbox", "radio", "switch"];

/// Whether the node is invisible to assistive technology.
///
/// Walks from the node to the root and stops at the first level that hides
/// its subtree. Missing nodes count as hidden.
pub fn is_hidden_from_accessibility(
    tree: &HostTree,
    node_id: NodeId,
    mut cache: Option<&mut HiddenCache>,
) -> bool {
    if !tree.contains(node_id) {
        return true;
    }

    for node in tree.self_and_ancestors(node_id) {
        let cached = cache.as_ref().and_then(|c| c.get(&node.node_id).copied());
        let hidden = match cached {
            Some(hidden) => hidden,
            None => {
                let hidden = is_subtree_inaccessible(tree, node);
                if let Some(cache) = cache.as_mut() {
                    cache.insert(node.node_id, hidden);
                }
                hidden
            }
        };

        if hidden {
            return true;
        }
    }

    false
}

fn is_subtree_inaccessible(tree: &HostTree, node: &HostNode) -> bool {
    if node.is_raw_text() {
        return false;
    }

    let props = &node.props;
    if props.aria_hidden == Some(true) {
        return true;
    }
    // iOS
    if props.accessibility_elements_hidden == Some(true) {
        return true;
    }
    // Android
    if props.important_for_accessibility == Some(ImportantForAccessibility::NoHideDescendants) {
        return true;
    }
    if props.is_display_none() {
        return true;
    }

    // A modal sibling makes everything next to it inaccessible
    get_host_siblings(tree, node.node_id)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| tree.get(id).ok())
        .any(|sibling| sibling.props.is_modal())
}

/// Whether screen readers treat the node as a focusable element
pub fn is_accessibility_element(node: &HostNode) -> bool {
    if node.kind == NodeKind::Image && node.props.alt.is_some() {
        return true;
    }

    if let Some(accessible) = node.props.accessible {
        return accessible;
    }

    matches!(
        node.kind,
        NodeKind::Text | NodeKind::TextInput | NodeKind::Switch | NodeKind::Pressable
    )
}

/// Explicit role, else `text` for Text nodes, else `none`
pub fn get_role(node: &HostNode) -> &str {
    if let Some(role) = node.props.explicit_role() {
        return normalize_role(role);
    }

    if node.kind == NodeKind::Text {
        return "text";
    }

    "none"
}

/// `image` and `img` are the same role
pub fn normalize_role(role: &str) -> &str {
    if role == "image" {
        "img"
    } else {
        role
    }
}

/// Label from `aria-labelledby`, explicit label, or image `alt`
pub fn compute_aria_label(tree: &HostTree, node_id: NodeId) -> Option<String> {
    let node = tree.get(node_id).ok()?;

    if let Some(label_id) = node.props.labelled_by() {
        if let Some(label_node) = tree.find_by_native_id(node_id, label_id) {
            if let Ok(text) = get_text_content(tree, label_node) {
                return Some(text);
            }
        }
    }

    if let Some(label) = node.props.explicit_label() {
        return Some(label.to_string());
    }

    if node.kind == NodeKind::Image {
        if let Some(alt) = node.props.alt.as_deref().filter(|alt| !alt.is_empty()) {
            return Some(alt.to_string());
        }
    }

    None
}

/// Accessible name: first hit wins, no blending
pub fn compute_accessible_name(tree: &HostTree, node_id: NodeId) -> Option<String> {
    compute_aria_label(tree, node_id).or_else(|| {
        get_text_content(tree, node_id)
            .ok()
            .filter(|text| !text.is_empty())
    })
}

pub fn is_editable_text_input(node: &HostNode) -> bool {
    node.kind == NodeKind::TextInput && node.props.editable != Some(false)
}

/// Resolved accessibility state with platform defaults applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedAccessibilityState {
    pub disabled: bool,
    pub selected: bool,
    pub checked: Option<CheckedState>,
    pub busy: bool,
    pub expanded: Option<bool>,
}

pub fn compute_accessibility_state(node: &HostNode) -> ComputedAccessibilityState {
    let props = &node.props;
    let state = props.accessibility_state.clone().unwrap_or_default();

    let disabled = if node.kind == NodeKind::TextInput && !is_editable_text_input(node) {
        true
    } else {
        props.aria_disabled.or(state.disabled).unwrap_or(false)
    };

    let checked = if node.kind == NodeKind::Switch {
        props.toggle_value().map(CheckedState::from)
    } else if ROLES_SUPPORTING_CHECKED
        .iter()
        .any(|role| *role == get_role(node))
    {
        props.aria_checked.or(state.checked)
    } else {
        None
    };

    ComputedAccessibilityState {
        disabled,
        selected: props.aria_selected.or(state.selected).unwrap_or(false),
        checked,
        busy: props.aria_busy.or(state.busy).unwrap_or(false),
        expanded: props.aria_expanded.or(state.expanded),
    }
}

pub fn compute_accessibility_value(node: &HostNode) -> AccessibilityValue {
    let props = &node.props;
    let value = props.accessibility_value.clone().unwrap_or_default();

    AccessibilityValue {
        min: props.aria_valuemin.or(value.min),
        max: props.aria_valuemax.or(value.max),
        now: props.aria_valuenow.or(value.now),
        text: props.aria_valuetext.clone().or(value.text),
    }
}

/// Partial accessibility state pattern; `None` keys are not compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessibilityStateMatcher {
    pub disabled: Option<bool>,
    pub selected: Option<bool>,
    pub checked: Option<CheckedState>,
    pub busy: Option<bool>,
    pub expanded: Option<bool>,
}

impl AccessibilityStateMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn checked(mut self, checked: impl Into<CheckedState>) -> Self {
        self.checked = Some(checked.into());
        self
    }

    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = Some(busy);
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for AccessibilityStateMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(disabled) = self.disabled {
            parts.push(format!("disabled state: {disabled}"));
        }
        if let Some(selected) = self.selected {
            parts.push(format!("selected state: {selected}"));
        }
        if let Some(checked) = self.checked {
            parts.push(format!("checked state: {checked}"));
        }
        if let Some(busy) = self.busy {
            parts.push(format!("busy state: {busy}"));
        }
        if let Some(expanded) = self.expanded {
            parts.push(format!("expanded state: {expanded}"));
        }
        f.write_str(&parts.join(", "))
    }
}

/// Compare only the keys present in the pattern.
///
/// An empty pattern matches nothing, so a forgotten field never turns into
/// a wildcard.
pub fn match_accessibility_state(node: &HostNode, matcher: &AccessibilityStateMatcher) -> bool {
    if matcher.is_empty() {
        return false;
    }

    let state = compute_accessibility_state(node);
    matcher.disabled.map_or(true, |v| v == state.disabled)
        && matcher.selected.map_or(true, |v| v == state.selected)
        && matcher.checked.map_or(true, |v| Some(v) == state.checked)
        && matcher.busy.map_or(true, |v| v == state.busy)
        && matcher.expanded.map_or(true, |v| Some(v) == state.expanded)
}

/// Partial accessibility value pattern
#[derive(Debug, Clone, Default)]
pub struct AccessibilityValueMatcher {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub now: Option<f64>,
    pub text: Option<TextMatch>,
}

impl AccessibilityValueMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn now(mut self, now: f64) -> Self {
        self.now = Some(now);
        self
    }

    pub fn text(mut self, text: impl Into<TextMatch>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.now.is_none() && self.text.is_none()
    }
}

impl fmt::Display for AccessibilityValueMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(min) = self.min {
            parts.push(format!("min value: {min}"));
        }
        if let Some(max) = self.max {
            parts.push(format!("max value: {max}"));
        }
        if let Some(now) = self.now {
            parts.push(format!("now value: {now}"));
        }
        if let Some(text) = &self.text {
            parts.push(format!("text value: {text}"));
        }
        f.write_str(&parts.join(", "))
    }
}

pub fn match_accessibility_value(node: &HostNode, matcher: &AccessibilityValueMatcher) -> bool {
    if matcher.is_empty() {
        return false;
    }

    let value = compute_accessibility_value(node);
    matcher.min.map_or(true, |v| Some(v) == value.min)
        && matcher.max.map_or(true, |v| Some(v) == value.max)
        && matcher.now.map_or(true, |v| Some(v) == value.now)
        && matcher.text.as_ref().map_or(true, |text| {
            value
                .text
                .as_deref()
                .is_some_and(|actual| matches(text, actual, None, true))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(json: serde_json::Value) -> HostTree {
        HostTree::from_json(&json).unwrap()
    }

    fn by_test_id(tree: &HostTree, id: &str) -> NodeId {
        tree.find_by_test_id(id).unwrap()
    }

    #[test]
    fn test_hidden_flags() {
        let tree = tree(json!({
            "type": "View",
            "children": [
                { "type": "View", "props": { "testID": "ios", "accessibilityElementsHidden": true },
                  "children": [{ "type": "Text", "props": { "testID": "ios-child" } }] },
                { "type": "View", "props": { "testID": "android", "importantForAccessibility": "no-hide-descendants" },
                  "children": [{ "type": "Text", "props": { "testID": "android-child" } }] },
                { "type": "View", "props": { "testID": "aria", "aria-hidden": true } },
                { "type": "View", "props": { "testID": "display", "style": [{ "display": "none" }] },
                  "children": [{ "type": "Text", "props": { "testID": "display-child" } }] },
                { "type": "View", "props": { "testID": "transparent", "style": { "opacity": 0 } } },
                { "type": "View", "props": { "testID": "visible" } }
            ]
        }));

        for id in ["ios", "ios-child", "android", "android-child", "aria", "display", "display-child"] {
            assert!(
                is_hidden_from_accessibility(&tree, by_test_id(&tree, id), None),
                "{id} should be hidden"
            );
        }
        for id in ["transparent", "visible"] {
            assert!(
                !is_hidden_from_accessibility(&tree, by_test_id(&tree, id), None),
                "{id} should be visible"
            );
        }
    }

    #[test]
    fn test_modal_sibling_hides_neighbours_not_itself() {
        let tree = tree(json!({
            "type": "View",
            "children": [
                { "type": "View", "props": { "testID": "behind" },
                  "children": [{ "type": "Text", "props": { "testID": "behind-text" } }] },
                { "type": "View", "props": { "testID": "modal", "accessibilityViewIsModal": true },
                  "children": [{ "type": "Text", "props": { "testID": "modal-text" } }] }
            ]
        }));

        assert!(is_hidden_from_accessibility(&tree, by_test_id(&tree, "behind"), None));
        assert!(is_hidden_from_accessibility(&tree, by_test_id(&tree, "behind-text"), None));
        assert!(!is_hidden_from_accessibility(&tree, by_test_id(&tree, "modal"), None));
        assert!(!is_hidden_from_accessibility(&tree, by_test_id(&tree, "modal-text"), None));
    }

    #[test]
    fn test_cache_is_filled_per_level() {
        let tree = tree(json!({
            "type": "View",
            "props": { "testID": "root" },
            "children": [{ "type": "Text", "props": { "testID": "leaf" } }]
        }));
        let mut cache = HiddenCache::default();

        assert!(!is_hidden_from_accessibility(&tree, by_test_id(&tree, "leaf"), Some(&mut cache)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&by_test_id(&tree, "root")), Some(&false));
    }

    #[test]
    fn test_accessibility_element_defaults() {
        let tree = tree(json!({
            "type": "View",
            "children": [
                { "type": "Text", "props": { "testID": "text" } },
                { "type": "View", "props": { "testID": "view" } },
                { "type": "View", "props": { "testID": "flagged", "accessible": true } },
                { "type": "Text", "props": { "testID": "opted-out", "accessible": false } },
                { "type": "Image", "props": { "testID": "image", "alt": "Logo" } },
                { "type": "Pressable", "props": { "testID": "pressable" } }
            ]
        }));
        let element = |id| is_accessibility_element(tree.get(by_test_id(&tree, id)).unwrap());

        assert!(element("text"));
        assert!(!element("view"));
        assert!(element("flagged"));
        assert!(!element("opted-out"));
        assert!(element("image"));
        assert!(element("pressable"));
    }

    #[test]
    fn test_accessible_name_precedence() {
        let tree = tree(json!({
            "type": "View",
            "children": [
                { "type": "Text", "props": { "nativeID": "label" }, "children": ["From label"] },
                { "type": "View", "props": { "testID": "by-ref", "accessibilityLabelledBy": "label", "accessibilityLabel": "explicit" } },
                { "type": "View", "props": { "testID": "explicit", "accessibilityLabel": "legacy", "aria-label": "modern" },
                  "children": [{ "type": "Text", "children": ["content"] }] },
                { "type": "Text", "props": { "testID": "content" }, "children": ["Hello ", { "type": "Text", "children": ["World"] }] },
                { "type": "View", "props": { "testID": "empty" } }
            ]
        }));
        let name = |id| compute_accessible_name(&tree, by_test_id(&tree, id));

        assert_eq!(name("by-ref").as_deref(), Some("From label"));
        assert_eq!(name("explicit").as_deref(), Some("modern"));
        assert_eq!(name("content").as_deref(), Some("Hello World"));
        assert_eq!(name("empty"), None);
    }

    #[test]
    fn test_role_normalization() {
        let tree = tree(json!({
            "type": "View",
            "children": [
                { "type": "Image", "props": { "testID": "img", "accessibilityRole": "image" } },
                { "type": "Text", "props": { "testID": "text" } },
                { "type": "View", "props": { "testID": "both", "role": "button", "accessibilityRole": "link" } }
            ]
        }));
        let role = |id| get_role(tree.get(by_test_id(&tree, id)).unwrap()).to_string();

        assert_eq!(role("img"), "img");
        assert_eq!(role("text"), "text");
        assert_eq!(role("both"), "button");
        assert_eq!(get_role(tree.root().unwrap()), "none");
    }

    #[test]
    fn test_state_computation() {
        let tree = tree(json!({
            "type": "View",
            "children": [
                { "type": "TextInput", "props": { "testID": "readonly", "editable": false } },
                { "type": "Switch", "props": { "testID": "switch", "value": true } },
                { "type": "View", "props": { "testID": "checkbox", "role": "checkbox", "accessibilityState": { "checked": "mixed" } } },
                { "type": "View", "props": { "testID": "plain", "accessibilityState": { "checked": true, "expanded": false } } },
                { "type": "View", "props": { "testID": "aria", "aria-disabled": true, "accessibilityState": { "disabled": false } } }
            ]
        }));
        let state = |id| compute_accessibility_state(tree.get(by_test_id(&tree, id)).unwrap());

        assert!(state("readonly").disabled);
        assert_eq!(state("switch").checked, Some(CheckedState::Checked));
        assert_eq!(state("checkbox").checked, Some(CheckedState::Mixed));
        assert_eq!(state("plain").checked, None);
        assert_eq!(state("plain").expanded, Some(false));
        assert!(state("aria").disabled);
    }

    #[test]
    fn test_state_matcher_open_world_and_empty() {
        let tree = tree(json!({
            "type": "View",
            "props": { "accessibilityState": { "selected": true } }
        }));
        let node = tree.root().unwrap();

        assert!(match_accessibility_state(node, &AccessibilityStateMatcher::new().selected(true)));
        assert!(match_accessibility_state(
            node,
            &AccessibilityStateMatcher::new().selected(true).disabled(false)
        ));
        assert!(!match_accessibility_state(node, &AccessibilityStateMatcher::new().busy(true)));
        assert!(!match_accessibility_state(node, &AccessibilityStateMatcher::new()));
    }

    #[test]
    fn test_value_matcher() {
        let tree = tree(json!({
            "type": "View",
            "props": {
                "accessibilityValue": { "min": 0, "max": 10, "now": 5 },
                "aria-valuetext": "half way"
            }
        }));
        let node = tree.root().unwrap();

        assert!(match_accessibility_value(node, &AccessibilityValueMatcher::new().now(5.0)));
        assert!(match_accessibility_value(
            node,
            &AccessibilityValueMatcher::new().min(0.0).text("half way")
        ));
        assert!(!match_accessibility_value(node, &AccessibilityValueMatcher::new().max(9.0)));
        assert!(!match_accessibility_value(node, &AccessibilityValueMatcher::new()));
    }
}
