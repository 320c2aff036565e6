//! External collaborators invoked from effects.
//!
//! Everything here performs I/O and is only ever called from inside an
//! effect, never from a reducer.

pub mod audio;
pub mod clipboard;
pub mod preferences;
pub mod translation;

pub use audio::{tts_url, AudioError, AudioPlayer, FixedDurationPlayer};
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard, SystemClipboard};
pub use preferences::{
    FilePreferences, MemoryPreferences, PreferenceError, PreferenceStore, PreferenceValue,
};
pub use translation::{HttpTranslationClient, TranslationClient};
