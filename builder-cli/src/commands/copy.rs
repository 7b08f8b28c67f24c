//! `builder copy <text>`

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;

use builder_core::config;
use builder_web::{Clipboard, ClipboardError, CopyTimings, Copyable, SystemClipboard};

use crate::{home, runtime};

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Text to place on the clipboard, typically a command to paste.
    pub text: String,
}

/// The widget swallows clipboard errors; keep the last one so the CLI can
/// still exit non-zero.
#[derive(Default)]
struct Reporting {
    inner: SystemClipboard,
    failure: Mutex<Option<String>>,
}

impl Clipboard for Reporting {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let result = self.inner.set_text(text);
        if let Err(err) = &result {
            if let Ok(mut failure) = self.failure.lock() {
                *failure = Some(err.to_string());
            }
        }
        result
    }
}

impl CopyArgs {
    pub fn run(self) -> Result<()> {
        let config = config::load_at(&home()?).context("failed to load config")?;
        let clipboard = Arc::new(Reporting::default());

        let rt = runtime()?;
        let title = rt.block_on(async {
            let widget = Copyable::new(
                self.text.clone(),
                clipboard.clone(),
                CopyTimings::from(&config),
            );
            widget.copy();
            widget.title()
        });

        if let Some(err) = clipboard.failure.lock().ok().and_then(|mut f| f.take()) {
            return Err(anyhow!("failed to copy to clipboard: {err}"));
        }
        println!("{} {}  {}", "✓".green(), title, self.text.bold());
        Ok(())
    }
}
