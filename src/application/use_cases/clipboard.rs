use crate::domain::error::{AppError, Result};
use base64::Engine as _;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const COPY_SUCCESS_MESSAGE: &str = "Query copied to clipboard!";

/// Somewhere text can be placed for the user to paste.
pub trait ClipboardBackend: Send + Sync {
    fn name(&self) -> &str;
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Pipes text into the platform clipboard utility.
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Picks the clipboard utility conventionally present on this platform.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("pbcopy", Vec::new())
        } else if cfg!(target_os = "windows") {
            Self::new("clip", Vec::new())
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Self::new("wl-copy", Vec::new())
        } else {
            Self::new("xclip", vec!["-selection".into(), "clipboard".into()])
        }
    }
}

impl ClipboardBackend for CommandClipboard {
    fn name(&self) -> &str {
        &self.program
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Internal(format!("Failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(AppError::Internal(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// Emits an OSC 52 escape sequence, which most terminal emulators turn into
/// a clipboard write.
pub struct Osc52Clipboard {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Osc52Clipboard {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl ClipboardBackend for Osc52Clipboard {
    fn name(&self) -> &str {
        "osc52"
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
        let mut out = self
            .out
            .lock()
            .map_err(|_| AppError::Internal("Clipboard writer lock poisoned".to_string()))?;
        write!(out, "\x1b]52;c;{}\x07", encoded)?;
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Primary,
    Fallback,
    /// Neither backend accepted the text. The user still sees success.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub outcome: CopyOutcome,
    pub message: &'static str,
}

/// Tries `primary`, then `fallback`. Always reports the success message.
pub fn copy_to_clipboard(
    text: &str,
    primary: &dyn ClipboardBackend,
    fallback: &dyn ClipboardBackend,
) -> CopyReport {
    let outcome = match primary.write_text(text) {
        Ok(()) => {
            debug!(backend = primary.name(), "Copied text to clipboard");
            CopyOutcome::Primary
        }
        Err(primary_err) => match fallback.write_text(text) {
            Ok(()) => {
                debug!(
                    backend = fallback.name(),
                    error = %primary_err,
                    "Primary clipboard failed, used fallback"
                );
                CopyOutcome::Fallback
            }
            Err(fallback_err) => {
                warn!(
                    primary = %primary_err,
                    fallback = %fallback_err,
                    "Clipboard copy failed on every backend"
                );
                CopyOutcome::Failed
            }
        },
    };

    CopyReport {
        outcome,
        message: COPY_SUCCESS_MESSAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct FakeClipboard {
        fail: bool,
        written: Mutex<Vec<String>>,
    }

    impl FakeClipboard {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                written: Mutex::new(Vec::new()),
            }
        }

        fn written(&self) -> Vec<String> {
            self.written.lock().unwrap().clone()
        }
    }

    impl ClipboardBackend for FakeClipboard {
        fn name(&self) -> &str {
            "fake"
        }

        fn write_text(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(AppError::Internal("denied".into()));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let primary = FakeClipboard::new(false);
        let fallback = FakeClipboard::new(false);
        let report = copy_to_clipboard("SELECT 1", &primary, &fallback);
        assert_eq!(report.outcome, CopyOutcome::Primary);
        assert_eq!(primary.written(), vec!["SELECT 1"]);
        assert!(fallback.written().is_empty());
    }

    #[test]
    fn test_fallback_used_when_primary_fails() {
        let primary = FakeClipboard::new(true);
        let fallback = FakeClipboard::new(false);
        let report = copy_to_clipboard("SELECT 2", &primary, &fallback);
        assert_eq!(report.outcome, CopyOutcome::Fallback);
        assert_eq!(fallback.written(), vec!["SELECT 2"]);
        assert_eq!(report.message, COPY_SUCCESS_MESSAGE);
    }

    #[test]
    fn test_total_failure_still_reports_success_message() {
        let report = copy_to_clipboard("x", &FakeClipboard::new(true), &FakeClipboard::new(true));
        assert_eq!(report.outcome, CopyOutcome::Failed);
        assert_eq!(report.message, "Query copied to clipboard!");
    }

    #[test]
    fn test_osc52_sequence() {
        let buffer = SharedBuffer::default();
        let clipboard = Osc52Clipboard::new(Box::new(buffer.clone()));
        clipboard.write_text("hi").unwrap();
        let written = buffer.0.lock().unwrap().clone();
        assert_eq!(written, b"\x1b]52;c;aGk=\x07".to_vec());
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let clipboard = CommandClipboard::new("definitely-not-a-clipboard-tool", Vec::new());
        assert!(clipboard.write_text("x").is_err());
    }
}
