use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no config is given.
pub const DEFAULT_CONFIG_FILE: &str = "ferroloc.json";

static LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}([_-][A-Za-z0-9]+)*$").expect("valid language regex"));

/// Project layout, read from `ferroloc.json`.
///
/// ```json
/// {
///   "sourceDir": "manual",
///   "root": "main.tex",
///   "storeDir": "l10n",
///   "storeFile": "strings.json",
///   "outputDir": "build",
///   "languages": ["de", "pt-BR"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub source_dir: PathBuf,
    pub root: String,
    pub store_dir: PathBuf,
    pub store_file: String,
    pub output_dir: PathBuf,
    pub languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            root: "main.tex".to_string(),
            store_dir: PathBuf::from("l10n"),
            store_file: "strings.json".to_string(),
            output_dir: PathBuf::from("build"),
            languages: Vec::new(),
        }
    }
}

impl Config {
    /// Reads a config file. Relative directories are resolved against the
    /// directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| Error::json(path, e))?;
        if let Some(base) = path.parent() {
            config.rebase_dirs(base);
        }
        for language in &config.languages {
            validate_language(language)?;
        }
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::json(path, e))?;
        fs::write(path, content).map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    fn rebase_dirs(&mut self, base: &Path) {
        for dir in [&mut self.source_dir, &mut self.store_dir, &mut self.output_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Store produced by a rebase.
    pub fn source_store_path(&self) -> PathBuf {
        self.store_dir.join(&self.store_file)
    }

    pub fn language_store_path(&self, language: &str) -> Result<PathBuf> {
        validate_language(language)?;
        Ok(self.store_dir.join(language).join(&self.store_file))
    }

    pub fn language_output_dir(&self, language: &str) -> Result<PathBuf> {
        validate_language(language)?;
        Ok(self.output_dir.join(language))
    }
}

/// Language codes name directories, so only tags like `de` or `pt-BR` pass.
pub fn validate_language(language: &str) -> Result<()> {
    if LANGUAGE_CODE.is_match(language) {
        Ok(())
    } else {
        Err(Error::InvalidLanguage(language.to_string()))
    }
}
