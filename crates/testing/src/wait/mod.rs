pub mod poll;
pub mod timers;

pub use poll::{
    wait_for, wait_for_element_to_be_removed, wait_for_or_else, Absence, Presence, WaitForOptions,
    DEFAULT_INTERVAL_MS,
};
pub use timers::{Timers, TokioTimers, VirtualTimers};
