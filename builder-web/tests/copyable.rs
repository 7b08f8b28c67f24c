use std::sync::{Arc, Mutex};
use std::time::Duration;

use builder_web::{Clipboard, ClipboardError, CopyTimings, Copyable};
use tokio::time::sleep;

#[derive(Default)]
struct RecordingClipboard {
    texts: Mutex<Vec<String>>,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.texts.lock().expect("lock").push(text.to_string());
        Ok(())
    }
}

struct BrokenClipboard;

impl Clipboard for BrokenClipboard {
    fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("no display".into()))
    }
}

fn timings() -> CopyTimings {
    CopyTimings {
        tooltip_delay: Duration::from_millis(10),
        reset_after: Duration::from_millis(2500),
    }
}

const COMMAND: &str = "hab origin key generate myorigin";

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn copy_writes_command_and_shows_feedback() {
    let clipboard = Arc::new(RecordingClipboard::default());
    let widget = Copyable::new(COMMAND, clipboard.clone(), timings());
    assert_eq!(widget.symbol(), "copy");
    assert_eq!(widget.title(), "Copy to clipboard");

    widget.copy();
    assert_eq!(*clipboard.texts.lock().expect("lock"), vec![COMMAND]);
    assert!(widget.is_copied());
    assert_eq!(widget.symbol(), "check");
    assert_eq!(widget.title(), "Copied!");
    assert!(!widget.tooltip_visible());

    sleep(Duration::from_millis(11)).await;
    assert!(widget.tooltip_visible());
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn feedback_reverts_after_reset_window() {
    let widget = Copyable::new(COMMAND, Arc::new(RecordingClipboard::default()), timings());
    widget.copy();

    sleep(Duration::from_millis(2499)).await;
    assert!(widget.is_copied());

    sleep(Duration::from_millis(2)).await;
    assert!(!widget.is_copied());
    assert!(!widget.tooltip_visible());
    assert_eq!(widget.symbol(), "copy");
    assert_eq!(widget.title(), "Copy to clipboard");
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn second_copy_restarts_the_window() {
    let widget = Copyable::new(COMMAND, Arc::new(RecordingClipboard::default()), timings());
    widget.copy();
    sleep(Duration::from_millis(2000)).await;
    widget.copy();

    // The first copy's reset would have fired at 2500.
    sleep(Duration::from_millis(1000)).await;
    assert!(widget.is_copied());

    sleep(Duration::from_millis(1501)).await;
    assert!(!widget.is_copied());
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn clipboard_failure_still_shows_feedback() {
    let widget = Copyable::new(COMMAND, Arc::new(BrokenClipboard), timings());
    widget.copy();
    assert!(widget.is_copied());
    sleep(Duration::from_millis(2501)).await;
    assert!(!widget.is_copied());
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn teardown_freezes_feedback() {
    let clipboard = Arc::new(RecordingClipboard::default());
    let widget = Copyable::new(COMMAND, clipboard.clone(), timings());
    widget.copy();
    widget.teardown();

    sleep(Duration::from_millis(3000)).await;
    assert!(widget.is_copied());
    assert!(!widget.tooltip_visible());

    widget.copy();
    assert_eq!(clipboard.texts.lock().expect("lock").len(), 1);
}

#[test]
fn copy_outside_a_runtime_still_copies() {
    let clipboard = Arc::new(RecordingClipboard::default());
    let widget = Copyable::new(COMMAND, clipboard.clone(), timings());
    widget.copy();
    assert_eq!(*clipboard.texts.lock().expect("lock"), vec![COMMAND]);
    assert!(widget.is_copied());
    assert!(!widget.tooltip_visible());
}
