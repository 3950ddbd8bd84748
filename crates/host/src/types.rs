//! Core host tree types
//!
//! 1. Use u32 for indices, never pointers
//! 2. Parent links are indices: lookup only, no ownership
//! 3. SmallVec for child lists, most nodes have a handful of children

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::props::Props;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Event handler stored on a host node.
///
/// Receives the event arguments and returns whatever the handler returns
/// (`Value::Null` for "nothing").
pub type EventHandler = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Wrap a closure as an [`EventHandler`]
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Primitive host element kinds produced by the renderer.
///
/// `RawText` is a string child; its content lives in
/// [`HostNode::node_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    View,
    Text,
    TextInput,
    Image,
    Switch,
    ScrollView,
    Modal,
    Pressable,
    RawText,
}

impl NodeKind {
    /// Map a renderer host type name onto a kind
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "View" => Some(NodeKind::View),
            "Text" => Some(NodeKind::Text),
            "TextInput" => Some(NodeKind::TextInput),
            "Image" => Some(NodeKind::Image),
            "Switch" | "RCTSwitch" => Some(NodeKind::Switch),
            "ScrollView" | "RCTScrollView" => Some(NodeKind::ScrollView),
            "Modal" => Some(NodeKind::Modal),
            "Pressable" => Some(NodeKind::Pressable),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::View => "View",
            NodeKind::Text => "Text",
            NodeKind::TextInput => "TextInput",
            NodeKind::Image => "Image",
            NodeKind::Switch => "Switch",
            NodeKind::ScrollView => "ScrollView",
            NodeKind::Modal => "Modal",
            NodeKind::Pressable => "Pressable",
            NodeKind::RawText => "#text",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One node of the rendered host tree
#[derive(Clone)]
pub struct HostNode {
    pub node_id: NodeId,
    pub kind: NodeKind,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    pub props: Props,
    /// Handlers keyed by prop name (`onPress`, `testOnly_onPress`, ...)
    pub handlers: AHashMap<String, EventHandler>,

    /// String content, only for `RawText`
    pub node_value: String,
}

impl HostNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            node_id: 0,
            kind,
            parent_id: None,
            children_ids: SmallVec::new(),
            props: Props::default(),
            handlers: AHashMap::new(),
            node_value: String::new(),
        }
    }

    /// String child node
    pub fn raw_text(value: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::RawText);
        node.node_value = value.into();
        node
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_handler(mut self, name: impl Into<String>, handler: EventHandler) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn is_raw_text(&self) -> bool {
        self.kind == NodeKind::RawText
    }

    /// Everything except raw strings is a host element
    pub fn is_element(&self) -> bool {
        !self.is_raw_text()
    }

    pub fn handler(&self, name: &str) -> Option<&EventHandler> {
        self.handlers.get(name)
    }
}

impl fmt::Debug for HostNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handler_names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        handler_names.sort_unstable();

        f.debug_struct("HostNode")
            .field("node_id", &self.node_id)
            .field("kind", &self.kind)
            .field("parent_id", &self.parent_id)
            .field("children_ids", &self.children_ids)
            .field("props", &self.props)
            .field("handlers", &handler_names)
            .field("node_value", &self.node_value)
            .finish()
    }
}
