//! Event handler resolution
//!
//! Walks from the target up to the root and returns the first handler for
//! the event whose level lets the event through. A level can refuse because
//! of `pointerEvents`, a non-editable text input, or a touch responder that
//! declines (or is disabled).

use host::{EventHandler, HostNode, HostTree, NodeId, NodeKind, PointerEvents};
use serde_json::Value;
use std::fmt;
use tracing::trace;

use crate::accessibility::{compute_accessibility_state, is_editable_text_input};

/// `TextInput` events delivered even when the input is not editable
const TEXT_INPUT_EVENTS_IGNORING_EDITABLE: &[&str] = &[
    "contentSizeChange",
    "onContentSizeChange",
    "layout",
    "onLayout",
    "scroll",
    "onScroll",
];

/// Events subject to `pointerEvents`. Both bare and `on*` names are accepted
/// by `fire_event`, so both are listed.
const EVENTS_AFFECTED_BY_POINTER_EVENTS: &[&str] = &[
    "press",
    "onPress",
    "pressIn",
    "onPressIn",
    "pressOut",
    "onPressOut",
    "longPress",
    "onLongPress",
];

const START_SHOULD_SET_RESPONDER: &str = "onStartShouldSetResponder";
const MOVE_SHOULD_SET_RESPONDER: &str = "onMoveShouldSetResponder";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventHandlerOptions {
    /// Also accept a handler registered under the bare event name
    pub loose: bool,
}

/// `press` -> `onPress`
pub fn get_event_handler_name(event_name: &str) -> String {
    let mut chars = event_name.chars();
    match chars.next() {
        Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
        None => "on".to_string(),
    }
}

/// Handler lookup on a single node.
///
/// Order: `on<Event>`, bare name (loose), `testOnly_on<Event>`,
/// `testOnly_<name>` (loose).
pub fn get_event_handler_from_props(
    node: &HostNode,
    event_name: &str,
    options: EventHandlerOptions,
) -> Option<EventHandler> {
    let handler_name = get_event_handler_name(event_name);

    node.handler(&handler_name)
        .or_else(|| options.loose.then(|| node.handler(event_name)).flatten())
        .or_else(|| node.handler(&format!("testOnly_{handler_name}")))
        .or_else(|| {
            options
                .loose
                .then(|| node.handler(&format!("testOnly_{event_name}")))
                .flatten()
        })
        .cloned()
}

pub fn is_touch_responder(node: &HostNode) -> bool {
    matches!(node.kind, NodeKind::Pressable | NodeKind::TextInput)
        || node.handler(START_SHOULD_SET_RESPONDER).is_some()
}

/// Whether touches can target the node given `pointerEvents` on its path.
///
/// `none` blocks at any level, `box-none` only on the node itself,
/// `box-only` only for its descendants.
pub fn is_pointer_event_enabled(tree: &HostTree, node_id: NodeId) -> bool {
    tree.self_and_ancestors(node_id)
        .enumerate()
        .all(|(depth, node)| match node.props.pointer_events() {
            PointerEvents::None => false,
            PointerEvents::BoxNone => depth > 0,
            PointerEvents::BoxOnly => depth == 0,
            PointerEvents::Auto => true,
        })
}

/// Verdict for one level of the walk.
///
/// Prop-only checks are settled while the tree is borrowed. Responder
/// callbacks are carried out and only called by [`Gate::is_open`].
#[derive(Clone)]
pub enum Gate {
    Open,
    Closed,
    Responder {
        start: Option<EventHandler>,
        moves: Option<EventHandler>,
    },
}

impl Gate {
    /// Run any responder callbacks and report whether the level is enabled
    pub fn is_open(&self) -> bool {
        match self {
            Gate::Open => true,
            Gate::Closed => false,
            Gate::Responder { start, moves } => {
                start.as_ref().is_some_and(|h| is_truthy(&h(&[])))
                    || moves.as_ref().is_some_and(|h| is_truthy(&h(&[])))
            }
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Open => f.write_str("Open"),
            Gate::Closed => f.write_str("Closed"),
            Gate::Responder { start, moves } => f
                .debug_struct("Responder")
                .field("start", &start.is_some())
                .field("moves", &moves.is_some())
                .finish(),
        }
    }
}

/// Gate for a handler on `node`, given the nearest touch responder at or
/// below it
pub fn level_gate(
    tree: &HostTree,
    node: &HostNode,
    event_name: &str,
    responder: Option<&HostNode>,
) -> Gate {
    if let Some(responder) = responder.filter(|r| r.kind == NodeKind::TextInput) {
        let enabled = is_editable_text_input(responder)
            || TEXT_INPUT_EVENTS_IGNORING_EDITABLE.contains(&event_name);
        return if enabled { Gate::Open } else { Gate::Closed };
    }

    if EVENTS_AFFECTED_BY_POINTER_EVENTS.contains(&event_name)
        && !is_pointer_event_enabled(tree, node.node_id)
    {
        return Gate::Closed;
    }

    let Some(responder) = responder else {
        return Gate::Open;
    };

    let start = responder.handler(START_SHOULD_SET_RESPONDER).cloned();
    let moves = responder.handler(MOVE_SHOULD_SET_RESPONDER).cloned();
    if start.is_some() || moves.is_some() {
        return Gate::Responder { start, moves };
    }

    if responder.props.disabled == Some(true) || compute_accessibility_state(responder).disabled {
        Gate::Closed
    } else {
        Gate::Open
    }
}

/// A handler found on the walk, waiting on its level's gate
#[derive(Clone)]
pub struct Candidate {
    pub node_id: NodeId,
    pub handler: EventHandler,
    pub gate: Gate,
}

/// Every handler for the event on the node or its ancestors, innermost
/// first. Levels already known to be closed are left out.
pub fn collect_candidates(tree: &HostTree, node_id: NodeId, event_name: &str) -> Vec<Candidate> {
    let options = EventHandlerOptions { loose: true };
    let mut responder: Option<&HostNode> = None;
    let mut candidates = Vec::new();

    for node in tree.self_and_ancestors(node_id) {
        if is_touch_responder(node) {
            responder = Some(node);
        }

        let Some(handler) = get_event_handler_from_props(node, event_name, options) else {
            continue;
        };
        match level_gate(tree, node, event_name, responder) {
            Gate::Closed => trace!(node_id = node.node_id, event_name, "handler suppressed"),
            gate => candidates.push(Candidate {
                node_id: node.node_id,
                handler,
                gate,
            }),
        }
    }

    candidates
}

/// First candidate whose gate opens. Responder callbacks run here, in walk
/// order, and stop at the first enabled level.
pub fn select(candidates: Vec<Candidate>) -> Option<EventHandler> {
    candidates.into_iter().find_map(|candidate| {
        if candidate.gate.is_open() {
            Some(candidate.handler)
        } else {
            trace!(node_id = candidate.node_id, "responder declined");
            None
        }
    })
}

/// First enabled handler for the event on the node or its ancestors.
///
/// Calls responder callbacks while `tree` is borrowed. Callers holding a
/// lock should use [`collect_candidates`] and [`select`] instead.
pub fn resolve(tree: &HostTree, node_id: NodeId, event_name: &str) -> Option<EventHandler> {
    select(collect_candidates(tree, node_id, event_name))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
