//! Synchronous event dispatch

use host::{HostTree, NodeId, NodeKind};
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::accessibility::is_editable_text_input;
use crate::event::handler::{collect_candidates, select};
use crate::screen::{Point, Screen};

const SCROLL_EVENT_NAMES: &[&str] = &[
    "scroll",
    "scrollBeginDrag",
    "scrollEndDrag",
    "momentumScrollBegin",
    "momentumScrollEnd",
];

/// An event to fire: name plus the arguments handed to the handler
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub name: String,
    pub args: Vec<Value>,
}

impl EventDescriptor {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

pub fn default_press_event() -> Value {
    json!({
        "nativeEvent": {
            "changedTouches": [],
            "identifier": 0,
            "locationX": 0,
            "locationY": 0,
            "pageX": 0,
            "pageY": 0,
            "target": 0,
            "timestamp": 0,
            "touches": []
        }
    })
}

pub fn default_scroll_event() -> Value {
    json!({
        "nativeEvent": {
            "contentInset": { "top": 0, "bottom": 0, "left": 0, "right": 0 },
            "contentOffset": { "x": 0, "y": 0 },
            "contentSize": { "width": 0, "height": 0 },
            "layoutMeasurement": { "width": 0, "height": 0 },
            "zoomScale": 0
        }
    })
}

/// Lay `overrides` over a default event.
///
/// Top-level keys replace; `nativeEvent` keys are merged one level deep.
pub fn merge_event(mut base: Value, overrides: Option<Value>) -> Value {
    let Some(Value::Object(overrides)) = overrides else {
        return base;
    };

    if let Value::Object(base_map) = &mut base {
        for (key, value) in overrides {
            match value {
                Value::Object(patch)
                    if key == "nativeEvent" && base_map.get(&key).is_some_and(Value::is_object) =>
                {
                    if let Some(Value::Object(native)) = base_map.get_mut(&key) {
                        native.extend(patch);
                    }
                }
                value => {
                    base_map.insert(key, value);
                }
            }
        }
    }

    base
}

fn try_get_content_offset(event: Option<&Value>) -> Option<Point> {
    let offset = event?.pointer("/nativeEvent/contentOffset")?;
    let x = offset.get("x").and_then(Value::as_f64);
    let y = offset.get("y").and_then(Value::as_f64);
    if x.is_none() && y.is_none() {
        return None;
    }
    Some(Point {
        x: x.unwrap_or(0.0),
        y: y.unwrap_or(0.0),
    })
}

impl Screen {
    /// Fire `event_name` at a node.
    ///
    /// Returns the handler's return value, `None` when nothing handled the
    /// event or the node is no longer mounted. Responder callbacks and the
    /// handler run after the tree lock is released, so they may mutate the
    /// tree.
    pub fn fire_event(&self, node_id: NodeId, event_name: &str, args: &[Value]) -> Option<Value> {
        let candidates = {
            let tree = self.read();
            if !tree.is_attached(node_id) {
                debug!(node_id, event_name, "target not mounted, event dropped");
                return None;
            }

            self.record_native_state(&tree, node_id, event_name, args.first());
            collect_candidates(&tree, node_id, event_name)
        };

        let Some(handler) = select(candidates) else {
            trace!(node_id, event_name, "no enabled handler");
            return None;
        };

        debug!(node_id, event_name, "dispatching event");
        Some(handler(args))
    }

    pub fn dispatch(&self, node_id: NodeId, event: &EventDescriptor) -> Option<Value> {
        self.fire_event(node_id, &event.name, &event.args)
    }

    /// `press` with the default touch event, `overrides` merged in
    pub fn press(&self, node_id: NodeId, overrides: Option<Value>) -> Option<Value> {
        let event = merge_event(default_press_event(), overrides);
        self.dispatch(node_id, &EventDescriptor::new("press", vec![event]))
    }

    pub fn change_text(&self, node_id: NodeId, text: &str) -> Option<Value> {
        let args = vec![Value::String(text.to_string())];
        self.dispatch(node_id, &EventDescriptor::new("changeText", args))
    }

    /// `scroll` with the default scroll event, `overrides` merged in
    pub fn scroll(&self, node_id: NodeId, overrides: Option<Value>) -> Option<Value> {
        let event = merge_event(default_scroll_event(), overrides);
        self.dispatch(node_id, &EventDescriptor::new("scroll", vec![event]))
    }

    fn record_native_state(
        &self,
        tree: &HostTree,
        node_id: NodeId,
        event_name: &str,
        value: Option<&Value>,
    ) {
        let Ok(node) = tree.get(node_id) else {
            return;
        };

        if event_name == "changeText" && is_editable_text_input(node) {
            if let Some(Value::String(text)) = value {
                self.native_state_mut().values.insert(node_id, text.clone());
            }
        }

        if node.kind == NodeKind::ScrollView && SCROLL_EVENT_NAMES.contains(&event_name) {
            if let Some(offset) = try_get_content_offset(value) {
                trace!(node_id, x = offset.x, y = offset.y, "content offset recorded");
                self.native_state_mut().content_offsets.insert(node_id, offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host::handler;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn screen(json: Value) -> Screen {
        Screen::new(HostTree::from_json(&json).unwrap())
    }

    fn id(screen: &Screen, test_id: &str) -> NodeId {
        screen.read().find_by_test_id(test_id).unwrap()
    }

    fn counter(screen: &Screen, node_id: NodeId, name: &str) -> Arc<AtomicU32> {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        screen
            .write()
            .set_handler(
                node_id,
                name,
                handler(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Value::Null
                }),
            )
            .unwrap();
        count
    }

    #[test]
    fn test_disabled_inner_bubbles_to_outer_once() {
        let screen = screen(json!({
            "type": "Pressable",
            "props": { "testID": "outer" },
            "children": [{
                "type": "Pressable",
                "props": { "testID": "inner", "disabled": true },
                "children": [{ "type": "Text", "props": { "testID": "label" }, "children": ["Tap"] }]
            }]
        }));
        let outer = counter(&screen, id(&screen, "outer"), "onPress");
        let inner = counter(&screen, id(&screen, "inner"), "onPress");

        screen.press(id(&screen, "label"), None);

        assert_eq!(outer.load(Ordering::SeqCst), 1);
        assert_eq!(inner.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pointer_events_none_blocks_press_not_layout() {
        let screen = screen(json!({
            "type": "View",
            "props": { "testID": "view", "pointerEvents": "none" }
        }));
        let view = id(&screen, "view");
        let pressed = counter(&screen, view, "onPress");
        let laid_out = counter(&screen, view, "onLayout");

        assert_eq!(screen.press(view, None), None);
        screen.fire_event(view, "layout", &[json!({ "nativeEvent": {} })]);

        assert_eq!(pressed.load(Ordering::SeqCst), 0);
        assert_eq!(laid_out.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pointer_events_none_ancestor_blocks_leaf_press() {
        let screen = screen(json!({
            "type": "View",
            "children": [{
                "type": "View",
                "props": { "pointerEvents": "none" },
                "children": [{ "type": "Pressable", "props": { "testID": "leaf" } }]
            }]
        }));
        let leaf = id(&screen, "leaf");
        let pressed = counter(&screen, leaf, "onPress");
        let laid_out = counter(&screen, leaf, "onLayout");

        assert_eq!(screen.press(leaf, None), None);
        screen.fire_event(leaf, "layout", &[json!({ "nativeEvent": {} })]);

        assert_eq!(pressed.load(Ordering::SeqCst), 0);
        assert_eq!(laid_out.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_above_pointer_events_none_still_fires() {
        let screen = screen(json!({
            "type": "Pressable",
            "props": { "testID": "outer" },
            "children": [{
                "type": "View",
                "props": { "pointerEvents": "none" },
                "children": [{ "type": "Text", "props": { "testID": "leaf" }, "children": ["Go"] }]
            }]
        }));
        let outer = id(&screen, "outer");
        screen
            .write()
            .set_handler(outer, "onPress", handler(|_| json!("outer fired")))
            .unwrap();

        assert_eq!(screen.press(id(&screen, "leaf"), None), Some(json!("outer fired")));
    }

    #[test]
    fn test_responder_callback_may_mutate_tree() {
        let screen = screen(json!({
            "type": "View",
            "children": [
                { "type": "View", "props": { "testID": "target" } },
                { "type": "Text", "props": { "testID": "banner" }, "children": ["Ready"] }
            ]
        }));
        let target = id(&screen, "target");
        let banner = id(&screen, "banner");
        let tree = screen.tree();
        {
            let mut guard = screen.write();
            guard
                .set_handler(
                    target,
                    "onStartShouldSetResponder",
                    handler(move |_| {
                        let removed = tree.write().unwrap().remove(banner).is_ok();
                        Value::Bool(removed)
                    }),
                )
                .unwrap();
            guard
                .set_handler(target, "onPress", handler(|_| json!("pressed")))
                .unwrap();
        }

        assert_eq!(screen.press(target, None), Some(json!("pressed")));
        assert!(!screen.is_mounted(banner));
    }

    #[test]
    fn test_press_merges_overrides_and_returns_value() {
        let screen = screen(json!({ "type": "Pressable", "props": { "testID": "button" } }));
        let button = id(&screen, "button");
        screen
            .write()
            .set_handler(button, "onPress", handler(|args| args[0].clone()))
            .unwrap();

        let event = screen
            .press(button, Some(json!({ "nativeEvent": { "pageX": 12 }, "extra": true })))
            .unwrap();

        assert_eq!(event["nativeEvent"]["pageX"], json!(12));
        assert_eq!(event["nativeEvent"]["locationY"], json!(0));
        assert_eq!(event["nativeEvent"]["touches"], json!([]));
        assert_eq!(event["extra"], json!(true));
    }

    #[test]
    fn test_change_text_records_native_value() {
        let screen = screen(json!({
            "type": "View",
            "children": [
                { "type": "TextInput", "props": { "testID": "name", "value": "" } },
                { "type": "TextInput", "props": { "testID": "locked", "editable": false, "value": "fixed" } }
            ]
        }));
        let name = id(&screen, "name");
        let locked = id(&screen, "locked");
        let typed = Arc::new(Mutex::new(Vec::new()));
        let sink = typed.clone();
        screen
            .write()
            .set_handler(
                name,
                "onChangeText",
                handler(move |args| {
                    sink.lock().unwrap().push(args[0].clone());
                    Value::Null
                }),
            )
            .unwrap();

        screen.change_text(name, "Ada");
        screen.change_text(locked, "ignored");

        assert_eq!(*typed.lock().unwrap(), vec![json!("Ada")]);
        assert_eq!(screen.display_value(name).as_deref(), Some("Ada"));
        assert_eq!(screen.display_value(locked).as_deref(), Some("fixed"));
    }

    #[test]
    fn test_scroll_records_content_offset() {
        let screen = screen(json!({ "type": "ScrollView", "props": { "testID": "list" } }));
        let list = id(&screen, "list");

        screen.scroll(list, Some(json!({ "nativeEvent": { "contentOffset": { "y": 240 } } })));

        assert_eq!(screen.content_offset(list), Some(Point { x: 0.0, y: 240.0 }));
    }

    #[test]
    fn test_unmounted_target_is_a_no_op() {
        let screen = screen(json!({
            "type": "View",
            "children": [{ "type": "Pressable", "props": { "testID": "gone" } }]
        }));
        let gone = id(&screen, "gone");
        let pressed = counter(&screen, gone, "onPress");

        screen.write().remove(gone).unwrap();

        assert_eq!(screen.press(gone, None), None);
        assert_eq!(pressed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_may_mutate_tree() {
        let screen = screen(json!({
            "type": "View",
            "children": [{ "type": "Pressable", "props": { "testID": "dismiss" } }]
        }));
        let dismiss = id(&screen, "dismiss");
        let tree = screen.tree();
        screen
            .write()
            .set_handler(
                dismiss,
                "onPress",
                handler(move |_| {
                    let removed = tree.write().unwrap().remove(dismiss).is_ok();
                    Value::Bool(removed)
                }),
            )
            .unwrap();

        assert_eq!(screen.press(dismiss, None), Some(Value::Bool(true)));
        assert!(!screen.is_mounted(dismiss));
    }

    #[test]
    fn test_dispatch_descriptor_passes_args() {
        let screen = screen(json!({ "type": "ScrollView", "props": { "testID": "list" } }));
        let list = id(&screen, "list");
        screen
            .write()
            .set_handler(list, "onMomentumScrollEnd", handler(|args| json!(args.len())))
            .unwrap();

        let event = EventDescriptor::new(
            "momentumScrollEnd",
            vec![json!({ "nativeEvent": { "contentOffset": { "x": 30 } } }), json!("extra")],
        );

        assert_eq!(screen.dispatch(list, &event), Some(json!(2)));
        assert_eq!(screen.content_offset(list), Some(Point { x: 30.0, y: 0.0 }));
    }

    #[test]
    fn test_merge_event_shapes() {
        let merged = merge_event(default_scroll_event(), Some(json!({ "nativeEvent": 5 })));
        assert_eq!(merged["nativeEvent"], json!(5));

        let untouched = merge_event(default_press_event(), None);
        assert_eq!(untouched, default_press_event());
    }
}
