//! Copy-to-clipboard widget with transient "Copied!" feedback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use builder_core::BuilderConfig;

use crate::clipboard::Clipboard;
use crate::lock;
use crate::tasks::{ScopedTaskSet, TaskHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTimings {
    /// Delay before the tooltip is shown; effectively the next paint.
    pub tooltip_delay: Duration,
    /// How long `copied` stays set.
    pub reset_after: Duration,
}

impl Default for CopyTimings {
    fn default() -> Self {
        Self::from(&BuilderConfig::default())
    }
}

impl From<&BuilderConfig> for CopyTimings {
    fn from(config: &BuilderConfig) -> Self {
        Self {
            tooltip_delay: config.copy_tooltip_delay(),
            reset_after: config.copy_reset_after(),
        }
    }
}

#[derive(Debug, Default)]
struct CopyState {
    copied: bool,
    tooltip_visible: bool,
    generation: u64,
    timers: Vec<TaskHandle>,
}

pub struct Copyable {
    command: String,
    clipboard: Arc<dyn Clipboard>,
    timings: CopyTimings,
    state: Arc<Mutex<CopyState>>,
    tasks: ScopedTaskSet,
}

impl Copyable {
    pub fn new(
        command: impl Into<String>,
        clipboard: Arc<dyn Clipboard>,
        timings: CopyTimings,
    ) -> Self {
        Self {
            command: command.into(),
            clipboard,
            timings,
            state: Arc::new(Mutex::new(CopyState::default())),
            tasks: ScopedTaskSet::new(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Copy the command text. Clipboard failures are swallowed; feedback is
    /// shown regardless. A copy while feedback is showing restarts both
    /// timers.
    ///
    /// The timers need a tokio runtime; outside one, `copied` is set and
    /// never reverts.
    pub fn copy(&self) {
        if self.tasks.is_drained() {
            return;
        }
        if let Err(err) = self.clipboard.set_text(&self.command) {
            tracing::debug!(error = %err, "clipboard copy failed");
        }

        let generation = {
            let mut state = lock(&self.state);
            state.copied = true;
            state.generation += 1;
            for timer in state.timers.drain(..) {
                timer.cancel();
            }
            state.generation
        };

        let show = {
            let state = self.state.clone();
            self.tasks.spawn_after(self.timings.tooltip_delay, async move {
                let mut state = lock(&state);
                if state.generation == generation {
                    state.tooltip_visible = true;
                }
            })
        };
        let reset = {
            let state = self.state.clone();
            self.tasks.spawn_after(self.timings.reset_after, async move {
                let mut state = lock(&state);
                if state.generation == generation {
                    state.copied = false;
                    state.tooltip_visible = false;
                }
            })
        };
        lock(&self.state).timers.extend(show.into_iter().chain(reset));
    }

    pub fn is_copied(&self) -> bool {
        lock(&self.state).copied
    }

    pub fn tooltip_visible(&self) -> bool {
        lock(&self.state).tooltip_visible
    }

    /// Icon name.
    pub fn symbol(&self) -> &'static str {
        if self.is_copied() {
            "check"
        } else {
            "copy"
        }
    }

    pub fn title(&self) -> &'static str {
        if self.is_copied() {
            "Copied!"
        } else {
            "Copy to clipboard"
        }
    }

    pub fn teardown(&self) {
        self.tasks.drain();
    }
}

impl Drop for Copyable {
    fn drop(&mut self) {
        self.teardown();
    }
}
