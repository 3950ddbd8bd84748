pub mod dispatch;
pub mod handler;

pub use dispatch::{default_press_event, default_scroll_event, merge_event, EventDescriptor};
pub use handler::{
    collect_candidates, get_event_handler_from_props, get_event_handler_name,
    is_pointer_event_enabled, is_touch_responder, level_gate, resolve, select, Candidate,
    EventHandlerOptions, Gate,
};
