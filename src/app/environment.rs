//! Services and timings the reducer captures into effects.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::TimingConfig;
use crate::services::{AudioPlayer, Clipboard, PreferenceStore, TranslationClient};

/// Debounce windows used by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Quiet period after the last keystroke.
    pub typing_debounce: Duration,
    /// Quiet period after a language change, swap or auto-translate toggle.
    pub language_debounce: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

impl From<&TimingConfig> for Timing {
    fn from(config: &TimingConfig) -> Self {
        Self {
            typing_debounce: config.typing_debounce(),
            language_debounce: config.language_debounce(),
        }
    }
}

/// External collaborators, shared with every effect the reducer builds.
///
/// The reducer never calls these directly; it clones the `Arc`s into
/// effect futures.
#[derive(Clone)]
pub struct Environment {
    pub translator: Arc<dyn TranslationClient>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub audio: Arc<dyn AudioPlayer>,
    pub clipboard: Arc<dyn Clipboard>,
    pub timing: Timing,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
