//! Retry-until-success polling

use std::convert::Infallible;
use std::fmt;
use std::time::Duration;
use tracing::{debug, debug_span, trace, Instrument};
use uuid::Uuid;

use crate::config::DEFAULT_ASYNC_UTIL_TIMEOUT_MS;
use crate::error::{QueryError, WaitError};
use crate::wait::timers::Timers;
use host::{NodeId, TreeError};

pub const DEFAULT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitForOptions {
    /// `None` means the configured async util timeout
    pub timeout: Option<Duration>,
    pub interval: Duration,
}

impl Default for WaitForOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        }
    }
}

impl WaitForOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn resolved_timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_millis(DEFAULT_ASYNC_UTIL_TIMEOUT_MS))
    }
}

/// Call `callback` until it succeeds or the timeout elapses.
///
/// The first call happens after one scheduler yield. On timeout the last
/// error is returned as is.
pub async fn wait_for<T, E, F>(
    timers: &dyn Timers,
    callback: F,
    options: &WaitForOptions,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    wait_for_or_else(timers, callback, options, |err| err).await
}

/// [`wait_for`] with a hook that rewrites the final error on timeout
pub async fn wait_for_or_else<T, E, F, O>(
    timers: &dyn Timers,
    mut callback: F,
    options: &WaitForOptions,
    on_timeout: O,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    O: FnOnce(E) -> E,
{
    let timeout = options.resolved_timeout();
    let interval = options.interval;
    let span = debug_span!(
        "wait_for",
        task_id = %Uuid::now_v7(),
        timeout_ms = timeout.as_millis() as u64,
        interval_ms = interval.as_millis() as u64,
    );

    async move {
        tokio::task::yield_now().await;

        let start = timers.now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let last_error = match callback() {
                Ok(value) => {
                    debug!(attempts, "wait_for resolved");
                    return Ok(value);
                }
                Err(err) => err,
            };

            let elapsed = timers.now().saturating_duration_since(start);
            if elapsed >= timeout {
                debug!(attempts, elapsed_ms = elapsed.as_millis() as u64, "wait_for timed out");
                return Err(on_timeout(last_error));
            }

            trace!(attempts, "callback failed, retrying");
            timers.sleep(interval.min(timeout - elapsed)).await;
        }
    }
    .instrument(span)
    .await
}

/// Whether a query result still refers to something
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for NodeId {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// Whether a callback error means the element is gone
pub trait Absence {
    fn is_absent(&self) -> bool;
}

impl Absence for QueryError {
    fn is_absent(&self) -> bool {
        self.is_not_found()
    }
}

impl Absence for TreeError {
    fn is_absent(&self) -> bool {
        matches!(self, TreeError::NodeNotFound(_))
    }
}

impl Absence for Infallible {
    fn is_absent(&self) -> bool {
        match *self {}
    }
}

/// Wait until `callback` reports the element absent: a not-found error or
/// an empty result.
///
/// The element must be present on the first (synchronous) call, otherwise
/// this fails straight away with [`WaitError::PrematureRemoval`]. Any other
/// error on that call is [`WaitError::Callback`]; later it only means the
/// element is not gone yet. Resolves with the last present result.
pub async fn wait_for_element_to_be_removed<T, E, F>(
    timers: &dyn Timers,
    mut callback: F,
    options: &WaitForOptions,
) -> Result<T, WaitError>
where
    T: Presence,
    E: Absence + fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut last = match callback() {
        Ok(value) if value.is_present() => value,
        Ok(_) => return Err(WaitError::PrematureRemoval),
        Err(err) if err.is_absent() => return Err(WaitError::PrematureRemoval),
        Err(err) => {
            return Err(WaitError::Callback {
                message: err.to_string(),
            })
        }
    };

    let removed = wait_for(
        timers,
        || match callback() {
            Ok(value) if value.is_present() => {
                last = value;
                Err(())
            }
            Ok(_) => Ok(()),
            Err(err) if err.is_absent() => Ok(()),
            Err(err) => {
                trace!(error = %err, "not removed yet");
                Err(())
            }
        },
        options,
    )
    .await;

    match removed {
        Ok(()) => Ok(last),
        Err(()) => Err(WaitError::Timeout {
            operation: "waitForElementToBeRemoved",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wait::timers::{TokioTimers, VirtualTimers};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn not_found() -> QueryError {
        QueryError::ElementNotFound {
            description: "testID: row".to_string(),
        }
    }

    fn ambiguous() -> QueryError {
        QueryError::MultipleElementsFound {
            description: "testID: row".to_string(),
            count: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_on_third_call() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = wait_for(
            &TokioTimers,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(format!("attempt {n}"))
                } else {
                    Ok(n)
                }
            },
            &WaitForOptions::new().interval(Duration::from_millis(200)),
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert!(start.elapsed() < Duration::from_millis(450));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = wait_for(
            &TokioTimers,
            || Err(format!("attempt {}", calls.fetch_add(1, Ordering::SeqCst) + 1)),
            &WaitForOptions::new().timeout(Duration::from_millis(120)),
        )
        .await;

        // t = 0, 50, 100, 120
        assert_eq!(result, Err("attempt 4".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_timeout_rewrites_error() {
        let result: Result<(), String> = wait_for_or_else(
            &TokioTimers,
            || Err("inner".to_string()),
            &WaitForOptions::new().timeout(Duration::from_millis(100)),
            |err| format!("wrapped: {err}"),
        )
        .await;

        assert_eq!(result, Err("wrapped: inner".to_string()));
    }

    #[test]
    fn test_first_call_is_not_inline() {
        let calls = AtomicU32::new(0);
        let options = WaitForOptions::default();
        let mut fut = tokio_test::task::spawn(wait_for(
            &TokioTimers,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(())
            },
            &options,
        ));

        tokio_test::assert_pending!(fut.poll());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio_test::assert_ready_ok!(fut.poll());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_timing() {
        let removed_at = Duration::from_millis(300);

        let start = Instant::now();
        let too_short = wait_for_element_to_be_removed(
            &TokioTimers,
            || {
                if start.elapsed() >= removed_at {
                    Ok(None)
                } else {
                    Ok::<_, QueryError>(Some(7u32))
                }
            },
            &WaitForOptions::new().timeout(Duration::from_millis(100)),
        )
        .await;
        assert_eq!(
            too_short,
            Err(WaitError::Timeout {
                operation: "waitForElementToBeRemoved"
            })
        );

        let start = Instant::now();
        let resolved = wait_for_element_to_be_removed(
            &TokioTimers,
            || {
                if start.elapsed() >= removed_at {
                    Err(not_found())
                } else {
                    Ok(Some(7u32))
                }
            },
            &WaitForOptions::default(),
        )
        .await;
        assert_eq!(resolved, Ok(Some(7)));
    }

    #[tokio::test]
    async fn test_premature_removal() {
        let absent = wait_for_element_to_be_removed(
            &TokioTimers,
            || Ok::<Vec<u32>, Infallible>(Vec::new()),
            &WaitForOptions::default(),
        )
        .await;
        assert_eq!(absent, Err(WaitError::PrematureRemoval));

        let failing = wait_for_element_to_be_removed(
            &TokioTimers,
            || Err::<u32, _>(not_found()),
            &WaitForOptions::default(),
        )
        .await;
        assert_eq!(failing, Err(WaitError::PrematureRemoval));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ambiguous_result_is_not_removal() {
        let first = wait_for_element_to_be_removed(
            &TokioTimers,
            || Err::<NodeId, _>(ambiguous()),
            &WaitForOptions::default(),
        )
        .await;
        assert!(matches!(
            &first,
            Err(WaitError::Callback { message }) if message.contains("found 2")
        ));

        let calls = AtomicU32::new(0);
        let later = wait_for_element_to_be_removed(
            &TokioTimers,
            || match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(3u32),
                _ => Err(ambiguous()),
            },
            &WaitForOptions::new().timeout(Duration::from_millis(100)),
        )
        .await;
        assert_eq!(
            later,
            Err(WaitError::Timeout {
                operation: "waitForElementToBeRemoved"
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waits_are_independent() {
        let start = Instant::now();
        let ready_after = |ms: u64| {
            move || {
                if start.elapsed() >= Duration::from_millis(ms) {
                    Ok(ms)
                } else {
                    Err(())
                }
            }
        };
        let options = WaitForOptions::default();

        let (fast, slow) = futures_util::join!(
            wait_for(&TokioTimers, ready_after(100), &options),
            wait_for(&TokioTimers, ready_after(600), &options),
        );

        assert_eq!(fast, Ok(100));
        assert_eq!(slow, Ok(600));
    }

    #[tokio::test]
    async fn test_virtual_timers_drive_polling() {
        let timers = Arc::new(VirtualTimers::new());
        let calls = AtomicU32::new(0);
        let options = WaitForOptions::new().timeout(Duration::from_millis(150));

        let poll = wait_for(
            timers.as_ref(),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("never")
            },
            &options,
        );
        let clock = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
                timers.advance(Duration::from_millis(50));
            }
        };

        let (result, ()) = tokio::join!(poll, clock);
        assert_eq!(result, Err("never"));
        // t = 0, 50, 100, 150
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
