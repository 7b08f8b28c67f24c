//! Scoped task set: deferred work owned by one component.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::lock;

#[derive(Default)]
struct TaskSetState {
    closed: bool,
    handles: Vec<AbortHandle>,
}

/// Tasks spawned on behalf of a component.
///
/// [`drain`](Self::drain) aborts every live task and refuses new ones, so a
/// torn-down component cannot be touched by its own timers. Clones share the
/// same set.
///
/// Tasks run on the tokio runtime current at spawn time. Outside a runtime
/// nothing is spawned: the task is dropped with a warning and `spawn`
/// returns `None`.
#[derive(Clone, Default)]
pub struct ScopedTaskSet {
    state: Arc<Mutex<TaskSetState>>,
}

impl ScopedTaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` on the current runtime. Returns `None` once drained or
    /// when called outside a runtime.
    pub fn spawn<F>(&self, future: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = lock(&self.state);
        if state.closed {
            tracing::debug!("task set drained, not spawning");
            return None;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::warn!(error = %err, "no tokio runtime, deferred task dropped");
                return None;
            }
        };
        state.handles.retain(|h| !h.is_finished());
        let abort = runtime.spawn(future).abort_handle();
        state.handles.push(abort.clone());
        Some(TaskHandle { abort })
    }

    /// One-shot deferred task: run `future` after `delay`.
    pub fn spawn_after<F>(&self, delay: Duration, future: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Deadline is fixed at spawn time, not at first poll.
        let deadline = tokio::time::Instant::now() + delay;
        self.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            future.await;
        })
    }

    /// Abort every task and close the set.
    pub fn drain(&self) {
        let handles = {
            let mut state = lock(&self.state);
            state.closed = true;
            std::mem::take(&mut state.handles)
        };
        let aborted = handles.iter().filter(|h| !h.is_finished()).count();
        for handle in handles {
            handle.abort();
        }
        if aborted > 0 {
            tracing::debug!(aborted, "drained scoped tasks");
        }
    }

    pub fn is_drained(&self) -> bool {
        lock(&self.state).closed
    }

    /// Number of tasks that have not finished yet.
    pub fn live(&self) -> usize {
        lock(&self.state)
            .handles
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }
}

/// Cancellation handle for one scoped task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    abort: AbortHandle,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}
