//! Time source for the async poller
//!
//! Polling never reads the wall clock directly; it asks a [`Timers`]
//! implementation. [`TokioTimers`] follows tokio's clock (and so honors
//! `tokio::time::pause`), [`VirtualTimers`] only moves when told to.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[async_trait]
pub trait Timers: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Timers backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimers;

#[async_trait]
impl Timers for TokioTimers {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Manually advanced clock.
///
/// Sleepers wake once [`VirtualTimers::advance`] has moved the clock past
/// their deadline.
pub struct VirtualTimers {
    origin: Instant,
    elapsed: watch::Sender<Duration>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        let (elapsed, _) = watch::channel(Duration::ZERO);
        Self {
            origin: Instant::now(),
            elapsed,
        }
    }

    /// Time advanced so far
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.send_modify(|elapsed| *elapsed += by);
        tracing::trace!(elapsed_ms = self.elapsed().as_millis() as u64, "virtual clock advanced");
    }
}

impl Default for VirtualTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VirtualTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualTimers")
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

#[async_trait]
impl Timers for VirtualTimers {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        let deadline = self.elapsed() + duration;
        let mut rx = self.elapsed.subscribe();
        while *rx.borrow_and_update() < deadline {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}
