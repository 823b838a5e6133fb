//! A thread-safe queue that executes submitted actions strictly in order.
//!
//! Many producers may enqueue concurrently; at most one worker drains the
//! queue at a time, so actions never overlap and run in submission order.
//! The worker is claimed lazily: the enqueue that finds the queue idle
//! starts one on the Tokio blocking pool, and the worker retires itself the
//! moment the queue runs dry. An activity flag, exposed as a
//! [`watch`](tokio::sync::watch) channel, flips to `true` when a worker is
//! claimed and back to `false` when it retires; both flips happen under the
//! queue lock, so observers see them strictly alternate.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

type Action = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    pending: VecDeque<Action>,
    draining: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    active_tx: watch::Sender<bool>,
}

/// Executes submitted actions one at a time, in submission order.
///
/// Each queue owns its ordering domain: two queues never serialize against
/// each other, and a queue is typically owned by whatever resource it
/// protects, such as one queue per state machine. Dropping the queue does
/// not cancel work already submitted; the in-flight worker keeps the
/// internal state alive until it drains.
///
/// A panicking action is caught and logged, and the worker continues with
/// the next action, so one bad action cannot stall the queue.
///
/// # Example
///
/// ```rust
/// use statecraft::SequentialActionQueue;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let queue = SequentialActionQueue::new();
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..4 {
///     let counter = Arc::clone(&counter);
///     queue.enqueue(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// queue.wait_until_idle().await;
/// assert_eq!(counter.load(Ordering::SeqCst), 4);
/// # }
/// ```
pub struct SequentialActionQueue {
    inner: Arc<Inner>,
    handle: Handle,
}

impl SequentialActionQueue {
    /// Create a queue that drains on the current Tokio runtime's blocking
    /// pool.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use
    /// [`with_handle`](SequentialActionQueue::with_handle) to supply one
    /// explicitly.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Create a queue that drains on the runtime behind `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        let (active_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    draining: false,
                }),
                active_tx,
            }),
            handle,
        }
    }

    /// Submit an action for sequential execution.
    ///
    /// Returns as soon as the action is queued. If no worker is draining,
    /// this call claims one; the activity flag is already `true` by the time
    /// `enqueue` returns.
    pub fn enqueue<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let claimed = {
            let mut state = self.inner.state.lock();
            state.pending.push_back(Box::new(action));
            if state.draining {
                false
            } else {
                state.draining = true;
                // Flipped under the lock so activity notifications alternate
                // strictly with the draining flag.
                self.inner.active_tx.send_replace(true);
                true
            }
        };

        if claimed {
            let inner = Arc::clone(&self.inner);
            self.handle.spawn_blocking(move || drain(inner));
        }
    }

    /// Whether a worker is currently draining the queue.
    pub fn is_active(&self) -> bool {
        *self.inner.active_tx.borrow()
    }

    /// Subscribe to the activity flag.
    ///
    /// The receiver observes `true` while a worker is draining and `false`
    /// while the queue is idle.
    pub fn subscribe_active(&self) -> watch::Receiver<bool> {
        self.inner.active_tx.subscribe()
    }

    /// Wait until the queue has no worker and no pending actions.
    ///
    /// Returns immediately when the queue is already idle. Actions enqueued
    /// after this call returns are not waited for.
    pub async fn wait_until_idle(&self) {
        let mut activity = self.subscribe_active();
        // The sender lives as long as `self`, so the channel cannot close
        // while we wait.
        let _ = activity.wait_for(|active| !*active).await;
    }

    /// Number of actions waiting to run, excluding the one in flight.
    pub fn len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// True when no actions are waiting to run.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SequentialActionQueue {
    /// Equivalent to [`new`](SequentialActionQueue::new); panics outside a
    /// Tokio runtime.
    fn default() -> Self {
        Self::new()
    }
}

fn drain(inner: Arc<Inner>) {
    tracing::debug!("queue worker started");
    let mut completed = 0usize;
    loop {
        // Popping the next action and deciding to retire share one lock
        // acquisition: a concurrent enqueue either lands ahead of this check
        // or finds `draining` already false and claims a fresh worker.
        let action = {
            let mut state = inner.state.lock();
            match state.pending.pop_front() {
                Some(action) => action,
                None => {
                    state.draining = false;
                    inner.active_tx.send_replace(false);
                    break;
                }
            }
        };

        if catch_unwind(AssertUnwindSafe(action)).is_err() {
            tracing::error!("queued action panicked; continuing with the next action");
        } else {
            completed += 1;
        }
    }
    tracing::debug!(completed, "queue worker retired");
}
