//! Key-value preference persistence.
//!
//! Values are stored as a flat TOML table. The store only knows about
//! strings, booleans and string lists; interpretation of each key lives in
//! the helpers at the bottom of this module.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::{Language, LanguagePair};

/// Persisted keys. Once published, do not rename.
pub mod keys {
    pub const SOURCE_LANGUAGE: &str = "sourceLanguage";
    pub const TARGET_LANGUAGE: &str = "targetLanguage";
    pub const FAVORITE_LANGUAGES: &str = "favoriteLanguages";
    pub const AUTO_TRANSLATE_ENABLED: &str = "autoTranslateEnabled";
}

/// A stored preference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl PreferenceValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Errors that can occur when reading or writing preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to read preferences '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write preferences '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Key-value store for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<PreferenceValue>, PreferenceError>;

    fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError>;
}

/// In-memory preferences. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, PreferenceValue>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored value.
    pub fn snapshot(&self) -> BTreeMap<String, PreferenceValue> {
        self.values.lock().clone()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<PreferenceValue>, PreferenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences stored in a TOML file.
///
/// The file is read once on open and rewritten on every `set` while
/// holding an exclusive advisory lock.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, PreferenceValue>>,
}

impl FilePreferences {
    /// Open the file at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| PreferenceError::Read {
                path: path.clone(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| PreferenceError::Parse {
                path: path.clone(),
                source: e,
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, PreferenceValue>) -> Result<(), PreferenceError> {
        let content = toml::to_string(values)?;
        let write_err = |source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(write_err)?;
        // Lock before truncating so a concurrent writer never sees a
        // half-written file. Released when `file` is dropped.
        file.lock_exclusive().map_err(write_err)?;
        file.set_len(0).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.sync_data().map_err(write_err)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<PreferenceValue>, PreferenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);
        self.persist(&values)?;
        tracing::trace!(key, path = %self.path.display(), "Preference saved");
        Ok(())
    }
}

/// Read the persisted language pair. Missing or unknown codes yield `None`.
pub fn read_language_pair(store: &dyn PreferenceStore) -> Result<Option<LanguagePair>, PreferenceError> {
    let source = store.get(keys::SOURCE_LANGUAGE)?;
    let target = store.get(keys::TARGET_LANGUAGE)?;
    let parse = |value: Option<PreferenceValue>| {
        value.as_ref().and_then(PreferenceValue::as_text).and_then(Language::from_code)
    };
    Ok(match (parse(source), parse(target)) {
        (Some(source), Some(target)) => Some(LanguagePair::new(source, target)),
        _ => None,
    })
}

/// Read persisted favorites. Unknown codes are skipped.
pub fn read_favorites(store: &dyn PreferenceStore) -> Result<Option<BTreeSet<Language>>, PreferenceError> {
    Ok(store
        .get(keys::FAVORITE_LANGUAGES)?
        .as_ref()
        .and_then(PreferenceValue::as_list)
        .map(|codes| codes.iter().filter_map(|code| Language::from_code(code)).collect()))
}

/// Read the persisted auto-translate flag.
pub fn read_auto_translate(store: &dyn PreferenceStore) -> Result<Option<bool>, PreferenceError> {
    Ok(store
        .get(keys::AUTO_TRANSLATE_ENABLED)?
        .as_ref()
        .and_then(PreferenceValue::as_flag))
}

/// Persist the language pair and favorites.
pub fn write_languages(
    store: &dyn PreferenceStore,
    pair: LanguagePair,
    favorites: &BTreeSet<Language>,
) -> Result<(), PreferenceError> {
    store.set(keys::SOURCE_LANGUAGE, PreferenceValue::Text(pair.source.code().to_string()))?;
    store.set(keys::TARGET_LANGUAGE, PreferenceValue::Text(pair.target.code().to_string()))?;
    store.set(
        keys::FAVORITE_LANGUAGES,
        PreferenceValue::List(favorites.iter().map(|lang| lang.code().to_string()).collect()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryPreferences::new();
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", PreferenceValue::Flag(true)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(PreferenceValue::Flag(true)));
    }

    #[test]
    fn language_pair_requires_both_codes() {
        let store = MemoryPreferences::new();
        store
            .set(keys::SOURCE_LANGUAGE, PreferenceValue::Text("fr".into()))
            .unwrap();
        assert_eq!(read_language_pair(&store).unwrap(), None);

        store
            .set(keys::TARGET_LANGUAGE, PreferenceValue::Text("de".into()))
            .unwrap();
        assert_eq!(
            read_language_pair(&store).unwrap(),
            Some(LanguagePair::new(Language::French, Language::German))
        );
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let store = MemoryPreferences::new();
        store
            .set(keys::SOURCE_LANGUAGE, PreferenceValue::Text("xx".into()))
            .unwrap();
        store
            .set(keys::TARGET_LANGUAGE, PreferenceValue::Text("de".into()))
            .unwrap();
        store
            .set(
                keys::FAVORITE_LANGUAGES,
                PreferenceValue::List(vec!["it".into(), "zz".into()]),
            )
            .unwrap();

        assert_eq!(read_language_pair(&store).unwrap(), None);
        assert_eq!(
            read_favorites(&store).unwrap(),
            Some(BTreeSet::from([Language::Italian]))
        );
    }

    #[test]
    fn wrong_value_type_reads_as_absent() {
        let store = MemoryPreferences::new();
        store
            .set(keys::AUTO_TRANSLATE_ENABLED, PreferenceValue::Text("yes".into()))
            .unwrap();
        assert_eq!(read_auto_translate(&store).unwrap(), None);
    }
}
