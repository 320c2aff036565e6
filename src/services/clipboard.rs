//! Clipboard access for copying translations.

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to set clipboard text: {0}")]
pub struct ClipboardError(#[from] arboard::Error);

/// Destination for copied text.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard.
///
/// A fresh handle is opened per copy; some platforms invalidate handles
/// held across long idle periods.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}
