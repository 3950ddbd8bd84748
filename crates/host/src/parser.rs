//! JSON → HostTree
//!
//! Reads the renderer's JSON snapshot format:
//!
//! ```json
//! {
//!   "type": "View",
//!   "props": { "testID": "root" },
//!   "children": [
//!     { "type": "Text", "props": {}, "children": ["Hello"] }
//!   ]
//! }
//! ```
//!
//! String (and number) children become `RawText` nodes. A top-level array
//! is wrapped in a synthetic `View` root.

use serde_json::Value;

use crate::arena::HostTree;
use crate::error::{Result, TreeError};
use crate::props::Props;
use crate::types::{HostNode, NodeId, NodeKind};

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Reject unknown host type names instead of reading them as `View`
    pub strict_kinds: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict_kinds: false,
        }
    }
}

/// Builds a [`HostTree`] from renderer JSON
pub struct TreeParser {
    config: ParserConfig,
    tree: HostTree,
}

impl TreeParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            tree: HostTree::new(),
        }
    }

    /// Parse a full snapshot and return the finished tree
    pub fn parse(mut self, json: &Value) -> Result<HostTree> {
        self.tree.clear();

        let root_id = match json {
            Value::Array(items) => {
                let root_id = self.tree.add_node(HostNode::new(NodeKind::View));
                for item in items {
                    self.parse_child(item, root_id)?;
                }
                root_id
            }
            _ => self.parse_node(json)?,
        };
        self.tree.set_root(root_id)?;

        tracing::debug!(nodes = self.tree.len(), "parsed host tree");
        Ok(self.tree)
    }

    fn parse_child(&mut self, json: &Value, parent_id: NodeId) -> Result<()> {
        let child_id = match json {
            Value::String(text) => self.tree.add_node(HostNode::raw_text(text.as_str())),
            Value::Number(number) => self.tree.add_node(HostNode::raw_text(number.to_string())),
            Value::Null | Value::Bool(_) => return Ok(()),
            _ => self.parse_node(json)?,
        };
        self.tree.attach(parent_id, child_id)
    }

    fn parse_node(&mut self, json: &Value) -> Result<NodeId> {
        let type_name = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| TreeError::ParseError("Missing 'type'".to_string()))?;

        let kind = match NodeKind::from_type_name(type_name) {
            Some(kind) => kind,
            None if self.config.strict_kinds => {
                return Err(TreeError::InvalidNodeKind(type_name.to_string()))
            }
            None => {
                tracing::warn!(type_name, "unknown host type, reading as View");
                NodeKind::View
            }
        };

        let props = match json.get("props") {
            Some(props) if !props.is_null() => Props::deserialize_lossy(props)?,
            _ => Props::default(),
        };

        let node_id = self.tree.add_node(HostNode::new(kind).with_props(props));

        if let Some(children) = json.get("children").and_then(Value::as_array) {
            for child in children {
                self.parse_child(child, node_id)?;
            }
        }

        Ok(node_id)
    }
}

impl Default for TreeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Props {
    /// Deserialize props, dropping handler placeholders the snapshot format
    /// emits for functions (`"onPress": [Function]` style strings or
    /// objects). A key whose value does not fit its typed field is dropped
    /// with a warning instead of failing the whole tree.
    fn deserialize_lossy(json: &Value) -> Result<Props> {
        let Value::Object(map) = json else {
            return Err(TreeError::ParseError("'props' must be an object".to_string()));
        };

        let filtered: serde_json::Map<String, Value> = map
            .iter()
            .filter(|(key, _)| !is_handler_name(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Ok(props) = serde_json::from_value(Value::Object(filtered.clone())) {
            return Ok(props);
        }

        let readable: serde_json::Map<String, Value> = filtered
            .into_iter()
            .filter(|(key, value)| {
                let single = serde_json::Map::from_iter([(key.clone(), value.clone())]);
                match serde_json::from_value::<Props>(Value::Object(single)) {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::warn!(key = %key, error = %err, "dropping unreadable prop");
                        false
                    }
                }
            })
            .collect();
        Ok(serde_json::from_value(Value::Object(readable))?)
    }
}

fn is_handler_name(key: &str) -> bool {
    let key = key.strip_prefix("testOnly_").unwrap_or(key);
    key.len() > 2 && key.starts_with("on") && key[2..].starts_with(|c: char| c.is_ascii_uppercase())
}

impl HostTree {
    /// Convenience wrapper around [`TreeParser`] with default config
    pub fn from_json(json: &Value) -> Result<HostTree> {
        TreeParser::new().parse(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_tree() {
        let tree = HostTree::from_json(&json!({
            "type": "View",
            "props": { "testID": "root" },
            "children": [
                { "type": "Text", "props": {}, "children": ["Hello ", 42] },
                null,
                { "type": "TextInput", "props": { "placeholder": "Name", "onChangeText": "[Function]" } }
            ]
        }))
        .unwrap();

        let root = tree.root().unwrap();
        assert_eq!(root.kind, NodeKind::View);
        assert_eq!(root.props.test_id.as_deref(), Some("root"));
        assert_eq!(root.children_ids.len(), 2);
        assert_eq!(tree.len(), 5);

        let input = tree.get(root.children_ids[1]).unwrap();
        assert_eq!(input.props.placeholder.as_deref(), Some("Name"));
    }

    #[test]
    fn test_parse_array_wraps_in_root() {
        let tree = HostTree::from_json(&json!([
            { "type": "Text", "children": ["a"] },
            { "type": "Text", "children": ["b"] }
        ]))
        .unwrap();

        assert_eq!(tree.root().unwrap().children_ids.len(), 2);
    }

    #[test]
    fn test_unknown_kind_strict_vs_lenient() {
        let json = json!({ "type": "RNCSlider" });

        let lenient = HostTree::from_json(&json).unwrap();
        assert_eq!(lenient.root().unwrap().kind, NodeKind::View);

        let strict = TreeParser::with_config(ParserConfig { strict_kinds: true }).parse(&json);
        assert_eq!(
            strict.unwrap_err(),
            TreeError::InvalidNodeKind("RNCSlider".to_string())
        );
    }

    #[test]
    fn test_unreadable_props_are_dropped_per_key() {
        let tree = HostTree::from_json(&json!({
            "type": "View",
            "props": {
                "testID": "panel",
                "pointerEvents": "unset",
                "accessibilityLabelledBy": ["a", "b"],
                "aria-hidden": true
            }
        }))
        .unwrap();

        let props = &tree.root().unwrap().props;
        assert_eq!(props.test_id.as_deref(), Some("panel"));
        assert_eq!(props.aria_hidden, Some(true));
        assert_eq!(props.pointer_events, None);
        assert_eq!(props.accessibility_labelled_by, None);
    }

    #[test]
    fn test_props_must_be_an_object() {
        let err = HostTree::from_json(&json!({ "type": "View", "props": [1] })).unwrap_err();
        assert!(matches!(err, TreeError::ParseError(_)));
    }

    #[test]
    fn test_missing_type_is_error() {
        let err = HostTree::from_json(&json!({ "props": {} })).unwrap_err();
        assert!(matches!(err, TreeError::ParseError(_)));
    }

    #[test]
    fn test_handler_names() {
        assert!(is_handler_name("onPress"));
        assert!(is_handler_name("testOnly_onPress"));
        assert!(!is_handler_name("one"));
        assert!(!is_handler_name("on"));
    }
}
