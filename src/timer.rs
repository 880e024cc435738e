//! Deadline scheduling for the reconnection state machines
//!
//! Deadlines run as detached sleep tasks that post a message back onto the
//! owning state machine's queue when they fire. Firing therefore serializes
//! with every other input of that machine; nothing here calls into the
//! machine directly. Cancellation is idempotent, and canceling an
//! already-fired handle is a no-op — stale firings are filtered by the
//! machine's episode counter.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// Schedules deadline messages onto one state machine's queue
pub struct TimerService<T: Send + 'static> {
    queue: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> TimerService<T> {
    /// Create a timer service posting onto `queue`
    pub fn new(queue: mpsc::UnboundedSender<T>) -> Self {
        Self { queue }
    }

    /// Schedule `message` to be posted after `duration`
    ///
    /// Dropping the returned handle cancels the deadline.
    pub fn schedule(&self, duration: Duration, message: T) -> DeadlineHandle {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let queue = self.queue.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    trace!("Deadline fired after {:?}", duration);
                    let _ = queue.send(message);
                }
                _ = cancel_rx => {
                    trace!("Deadline canceled before firing");
                }
            }
        });

        DeadlineHandle {
            cancel: Some(cancel_tx),
        }
    }
}

/// Handle to a scheduled deadline
///
/// Cancels on drop. `cancel` may be called any number of times; calls after
/// the deadline fired do nothing.
pub struct DeadlineHandle {
    cancel: Option<oneshot::Sender<()>>,
}

impl DeadlineHandle {
    /// Cancel the deadline if it has not fired yet
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            // Send fails if the deadline already fired; either way the
            // handle is spent
            let _ = tx.send(());
        }
    }
}

impl Drop for DeadlineHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
