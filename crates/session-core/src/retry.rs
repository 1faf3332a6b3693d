/// Retry timer for deferred reopen attempts.
///
/// Provides cancellable one-shot timers so a stale timer can never fire
/// after the session moved on (a close, a fresh open, a new selection).
use crate::session_actor::SessionMessage;
use futures_channel::mpsc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Handle to cancel a pending retry
///
/// When dropped or explicitly cancelled, the timer task will not send
/// the retry message, preventing spurious reopen attempts after the
/// session state has changed.
pub struct RetryHandle {
    cancelled: Arc<AtomicBool>,
}

impl RetryHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the timer, preventing it from firing
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Drop for RetryHandle {
    fn drop(&mut self) {
        // Auto-cancel when handle is dropped
        self.cancel();
    }
}

/// Spawn a timer task that sends `RetryTick` after the specified delay
///
/// Returns a RetryHandle that can be used to cancel the timer. If the
/// handle is dropped before the timer fires, no message is sent.
pub fn spawn_retry(
    actor_tx: mpsc::UnboundedSender<SessionMessage>,
    delay: Duration,
) -> RetryHandle {
    let handle = RetryHandle::new();
    let cancel_flag = handle.cancelled.clone();

    tokio::spawn(async move {
        // Sleep in short slices with cancellation checks, so a cancelled
        // timer exits promptly instead of holding the task until the
        // full delay elapses.
        let check_interval = Duration::from_millis(25);
        let mut remaining = delay;

        while !remaining.is_zero() {
            if cancel_flag.load(Ordering::Acquire) {
                return;
            }

            let slice = remaining.min(check_interval);
            tokio::time::sleep(slice).await;
            remaining = remaining.saturating_sub(slice);
        }

        // Final check before sending the tick
        if !cancel_flag.load(Ordering::Acquire) {
            debug!("retry timer fired after {:?}", delay);
            let _ = actor_tx.unbounded_send(SessionMessage::RetryTick);
        }
    });

    handle
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use futures::stream::StreamExt;

    #[tokio::test]
    async fn test_retry_fires() {
        let (actor_tx, mut actor_rx) = mpsc::unbounded();

        // Keep handle alive so the timer can fire
        let _handle = spawn_retry(actor_tx, Duration::from_millis(50));

        let msg = actor_rx.next().await.unwrap();
        assert!(matches!(msg, SessionMessage::RetryTick));
    }

    #[tokio::test]
    async fn test_retry_cancelled_on_drop() {
        let (actor_tx, mut actor_rx) = mpsc::unbounded();

        // Drop handle immediately to cancel the timer
        {
            let _handle = spawn_retry(actor_tx, Duration::from_millis(50));
        }

        // Wait longer than the delay
        tokio::time::sleep(Duration::from_millis(150)).await;

        // Should not receive any message (timer was cancelled)
        assert!(actor_rx.try_next().is_ok_and(|msg| msg.is_none()));
    }

    #[tokio::test]
    async fn test_retry_not_before_delay() {
        let (actor_tx, mut actor_rx) = mpsc::unbounded();

        let start = std::time::Instant::now();
        let _handle = spawn_retry(actor_tx, Duration::from_millis(100));

        let _ = actor_rx.next().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
