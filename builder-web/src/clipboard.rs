//! System clipboard access.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard utility found (tried: {0})")]
    Unavailable(String),

    #[error("failed to run {program}: {source}")]
    Io {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed {
        program: &'static str,
        status: std::process::ExitStatus,
    },
}

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Copies through the platform's clipboard utility, trying each candidate
/// in order until one can be spawned.
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard;

type Candidate = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CANDIDATES: &[Candidate] = &[("pbcopy", &[])];

#[cfg(windows)]
const CANDIDATES: &[Candidate] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", windows)))]
const CANDIDATES: &[Candidate] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        for &(program, args) in CANDIDATES {
            let mut child = match Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => child,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ClipboardError::Io { program, source }),
            };

            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(text.as_bytes())
                    .map_err(|source| ClipboardError::Io { program, source })?;
            }
            let status = child
                .wait()
                .map_err(|source| ClipboardError::Io { program, source })?;
            if !status.success() {
                return Err(ClipboardError::Failed { program, status });
            }
            tracing::debug!(program, bytes = text.len(), "copied to clipboard");
            return Ok(());
        }

        let tried: Vec<&str> = CANDIDATES.iter().map(|(p, _)| *p).collect();
        Err(ClipboardError::Unavailable(tried.join(", ")))
    }
}
