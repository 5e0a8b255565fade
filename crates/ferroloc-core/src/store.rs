use crate::error::{Error, Result};
use crate::namespace::KeyPrefix;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Leads every store written by a rebase.
pub const GENERATED_NOTICE: &str =
    "GENERATED FILE, DO NOT EDIT. Produced by `ferroloc rebase` from the LaTeX sources.";

/// The persisted key to text mapping exchanged with translators.
///
/// Keys are namespaced (see [`KeyPrefix`]) and kept in file-graph order.
/// Values are stored escaped (see [`escape`]) so that no entry spans lines.
///
/// ```
/// use ferroloc_core::store::TranslationStore;
///
/// let mut store = TranslationStore::new();
/// store.insert("main$intro".to_string(), "Hello\nworld");
/// assert_eq!(store.raw("main$intro"), Some("Hello\\nworld"));
/// assert_eq!(store.get("main$intro").as_deref(), Some("Hello\nworld"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationStore {
    #[serde(rename = "_generated", default)]
    pub notice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub entries: IndexMap<String, String>,
    /// sha256 of every source file at rebase time, keyed by relative path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, String>,
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStore {
    pub fn new() -> Self {
        Self {
            notice: GENERATED_NOTICE.to_string(),
            language: None,
            entries: IndexMap::new(),
            sources: BTreeMap::new(),
        }
    }

    /// Stores `text` under `key`, escaped. Re-inserting a key keeps its
    /// original position and returns the previous raw value.
    pub fn insert(&mut self, key: String, text: &str) -> Option<String> {
        self.entries.insert(key, escape(text))
    }

    /// The escaped value as persisted.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The unescaped value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.raw(key).map(unescape)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The unescaped entries of one file, keyed by local key, in store order.
    ///
    /// `files` holds the prefixes of every file in the graph. An entry belongs
    /// to `prefix` only if that is its [owner](KeyPrefix::owner) among them.
    pub fn entries_for(
        &self,
        prefix: &KeyPrefix,
        files: &[KeyPrefix],
    ) -> IndexMap<String, String> {
        self.entries
            .iter()
            .filter(|(key, _)| KeyPrefix::owner(files, key) == Some(prefix))
            .filter_map(|(key, value)| {
                prefix
                    .strip(key)
                    .map(|local| (local.to_string(), unescape(value)))
            })
            .collect()
    }

    pub fn record_source(&mut self, relative_path: &str, text: &str) {
        self.sources
            .insert(relative_path.to_string(), fingerprint(text));
    }

    /// Whether `text` differs from the recorded source of `relative_path`.
    /// Unrecorded paths are never stale.
    pub fn is_stale(&self, relative_path: &str, text: &str) -> bool {
        self.sources
            .get(relative_path)
            .is_some_and(|digest| *digest != fingerprint(text))
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = self.to_json_string().map_err(|e| Error::json(path, e))?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
        log::info!("Saved {} entries to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let store: Self = serde_json::from_str(&content).map_err(|e| Error::json(path, e))?;
        log::debug!("Loaded {} entries from {}", store.len(), path.display());
        Ok(store)
    }
}

/// Hex sha256 of a source text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Escapes `\` as `\\` and a line break as `\n`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`]. A backslash before anything but `n` or another
/// backslash is kept verbatim. Hand-edited values must still escape their
/// own backslashes: an unescaped `\newpage` reads back as a line break
/// followed by `ewpage`.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
