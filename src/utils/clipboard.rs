use std::time::{Duration, Instant};
use thiserror::Error;

const CONFIRMATION_TIME: Duration = Duration::from_secs(2);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable")]
    Unavailable,
    #[error("nothing to copy")]
    Empty,
}

pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    CopiedWithFallback,
    Failed,
}

/// Tries `primary`, then `fallback`. `Failed` means the caller must tell
/// the user to copy by hand.
pub fn copy_with_fallback(
    text: &str,
    primary: &mut dyn ClipboardSink,
    fallback: &mut dyn ClipboardSink,
) -> CopyOutcome {
    match primary.write_text(text) {
        Ok(()) => return CopyOutcome::Copied,
        Err(e) => log::warn!("Primary clipboard failed: {}", e),
    }
    match fallback.write_text(text) {
        Ok(()) => CopyOutcome::CopiedWithFallback,
        Err(e) => {
            log::error!("Fallback clipboard failed: {}", e);
            CopyOutcome::Failed
        }
    }
}

/// The OS clipboard. The handle is opened on first use and kept open, since
/// on X11 the copied text lives only as long as its owner.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| {
                log::warn!("Cannot open system clipboard: {}", e);
                ClipboardError::Unavailable
            })?;
            self.inner = Some(clipboard);
        }
        let clipboard = self.inner.as_mut().ok_or(ClipboardError::Unavailable)?;
        if let Err(e) = clipboard.set_text(text) {
            log::warn!("System clipboard rejected text: {}", e);
            // Reopen next time; the connection may have gone stale.
            self.inner = None;
            return Err(ClipboardError::Unavailable);
        }
        Ok(())
    }
}

/// Keeps the text in a selectable field so the user can copy it from there.
#[derive(Debug, Default)]
pub struct ManualCopyBuffer {
    pub pending: Option<String>,
}

impl ClipboardSink for ManualCopyBuffer {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }
        self.pending = Some(text.to_owned());
        Ok(())
    }
}

/// Swaps the copy button label for a confirmation for a short while.
#[derive(Debug, Default)]
pub struct CopyFeedback {
    confirmed_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn confirm(&mut self, now: Instant) {
        self.confirmed_at = Some(now);
    }

    pub fn is_showing(&self, now: Instant) -> bool {
        self.confirmed_at
            .map_or(false, |at| now.duration_since(at) < CONFIRMATION_TIME)
    }
}
