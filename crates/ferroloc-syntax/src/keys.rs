use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TITLE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[A-Za-z0-9\-_.]+$").expect("valid title key regex"));
static BLOCK_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_.]+$").expect("valid block key regex"));

/// Why a key failed its format check. Keys are used as captured regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyWarning {
    Empty,
    MissingDollar,
    IllegalCharacters,
}

impl KeyWarning {
    pub fn message(&self, key: &str) -> String {
        match self {
            KeyWarning::Empty => "empty marker key".to_string(),
            KeyWarning::MissingDollar => {
                format!("title key '{}' does not start with '$'", key)
            }
            KeyWarning::IllegalCharacters => format!(
                "key '{}' contains characters outside [A-Za-z0-9-_.]",
                key
            ),
        }
    }
}

pub fn check_title_key(key: &str) -> Option<KeyWarning> {
    if key.is_empty() {
        Some(KeyWarning::Empty)
    } else if !key.starts_with('$') {
        Some(KeyWarning::MissingDollar)
    } else if !TITLE_KEY.is_match(key) {
        Some(KeyWarning::IllegalCharacters)
    } else {
        None
    }
}

pub fn check_block_key(key: &str) -> Option<KeyWarning> {
    if key.is_empty() {
        Some(KeyWarning::Empty)
    } else if !BLOCK_KEY.is_match(key) {
        Some(KeyWarning::IllegalCharacters)
    } else {
        None
    }
}
