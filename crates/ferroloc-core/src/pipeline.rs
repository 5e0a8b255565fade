//! The commands: rebase, update and check.
//!
//! Every function here fails fast. The first syntax, structural or I/O error
//! aborts the whole operation, while warnings are logged and counted in the
//! returned report.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::graph::{is_contained, IncludeGraph};
use crate::namespace::KeyPrefix;
use crate::reinject::reinject;
use crate::store::TranslationStore;
use crate::structure::validate_structure;
use ferroloc_syntax::{locate, MarkerKind};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of [`rebase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebaseReport {
    pub store_path: PathBuf,
    pub files: usize,
    pub entries: usize,
    pub key_warnings: usize,
    pub missing_includes: usize,
    pub outside_includes: usize,
}

/// Outcome of [`update`] for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub language: String,
    pub output_dir: PathBuf,
    /// Files without translations, copied verbatim.
    pub copied: usize,
    pub rewritten: usize,
    pub replaced_units: usize,
    pub unknown_keys: usize,
    /// Store entries that belong to no file of the include graph.
    pub orphaned_entries: usize,
    pub stale_files: usize,
}

/// Outcome of [`check_sources`] and [`check_tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub files: usize,
    pub units: usize,
    pub key_warnings: usize,
}

/// The include graph of the configured source tree.
pub fn collect_graph(config: &Config) -> Result<IncludeGraph> {
    IncludeGraph::collect(&config.source_dir, &config.root)
}

/// Extracts every marker of the source tree into the source store.
pub fn rebase(config: &Config) -> Result<RebaseReport> {
    let graph = collect_graph(config)?;
    let mut store = TranslationStore::new();
    let mut key_warnings = 0;

    for relative in &graph.files {
        let path = config.source_dir.join(relative);
        let text = read(&path)?;
        let extraction = extract(&text).map_err(|e| Error::syntax(&path, &text, e))?;

        for diagnostic in &extraction.warnings {
            log::warn!(
                "{}:{}: {}",
                path.display(),
                locate(&text, diagnostic.offset),
                diagnostic.message()
            );
        }
        key_warnings += extraction.warnings.len();

        let prefix = KeyPrefix::for_path(relative);
        for (key, value) in extraction.entries() {
            store.insert(prefix.qualify(key), value);
        }
        store.record_source(&source_name(relative), &text);
        log::debug!("{}: {} units", relative.display(), extraction.len());
    }

    let store_path = config.source_store_path();
    store.save(&store_path)?;

    Ok(RebaseReport {
        store_path,
        files: graph.files.len(),
        entries: store.len(),
        key_warnings,
        missing_includes: graph.missing.len(),
        outside_includes: graph.outside.len(),
    })
}

/// Builds the translated tree of one language under `<outputDir>/<language>`.
///
/// The tree is staged in a temporary directory inside `outputDir` and only
/// replaces the previous one once every file was rewritten and validated.
pub fn update(config: &Config, language: &str) -> Result<UpdateReport> {
    let store_path = config.language_store_path(language)?;
    let output_dir = config.language_output_dir(language)?;
    let store = TranslationStore::load(&store_path)?;
    if let Some(declared) = store.language.as_deref().filter(|l| *l != language) {
        log::warn!(
            "{}: store declares language '{}', building '{}'",
            store_path.display(),
            declared,
            language
        );
    }

    let graph = collect_graph(config)?;

    ensure_dir(&config.output_dir)?;
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(Error::OutputConflict { path: output_dir });
    }
    let staging = tempfile::Builder::new()
        .prefix(".ferroloc-")
        .tempdir_in(&config.output_dir)
        .map_err(|e| Error::io(&config.output_dir, e))?;

    let mut report = UpdateReport {
        language: language.to_string(),
        output_dir: output_dir.clone(),
        copied: 0,
        rewritten: 0,
        replaced_units: 0,
        unknown_keys: 0,
        orphaned_entries: 0,
        stale_files: 0,
    };
    let mut consumed = HashSet::new();
    let mut stale = HashSet::new();
    let files: Vec<KeyPrefix> = graph
        .files
        .iter()
        .map(|file| KeyPrefix::for_path(file))
        .collect();

    for relative in &graph.files {
        let source_path = config.source_dir.join(relative);
        let text = read(&source_path)?;
        let name = source_name(relative);
        if store.is_stale(&name, &text) && stale.insert(name.clone()) {
            log::warn!(
                "{}: source changed since the {} store was produced, run rebase",
                source_path.display(),
                language
            );
        }

        if !is_contained(relative) {
            return Err(Error::OutsideSourceDir {
                path: relative.clone(),
            });
        }
        let prefix = KeyPrefix::for_path(relative);
        let translations = store.entries_for(&prefix, &files);
        let staged = staging.path().join(relative);
        if let Some(parent) = staged.parent() {
            ensure_dir(parent)?;
        }

        if translations.is_empty() {
            write(&staged, &text)?;
            report.copied += 1;
            continue;
        }

        let result =
            reinject(&text, &translations).map_err(|e| Error::syntax(&source_path, &text, e))?;
        for key in &result.unknown_keys {
            let kind = match MarkerKind::of_key(key) {
                MarkerKind::Title => "title",
                MarkerKind::Block => "block",
            };
            log::warn!(
                "{}: no {} marker for '{}', skipping",
                source_path.display(),
                kind,
                prefix.qualify(key)
            );
        }
        validate_structure(&result.text)
            .map_err(|e| Error::translated_structure(language, &source_path, &result.text, e))?;

        write(&staged, &result.text)?;
        consumed.extend(translations.keys().map(|key| prefix.qualify(key)));
        report.rewritten += 1;
        report.replaced_units += result.replaced;
        report.unknown_keys += result.unknown_keys.len();
    }

    for key in store.entries.keys().filter(|key| !consumed.contains(*key)) {
        log::warn!(
            "{}: entry '{}' belongs to no file of the include graph",
            store_path.display(),
            key
        );
        report.orphaned_entries += 1;
    }
    report.stale_files = stale.len();

    if output_dir.is_dir() {
        fs::remove_dir_all(&output_dir).map_err(|e| Error::io(&output_dir, e))?;
    }
    fs::rename(staging.path(), &output_dir).map_err(|e| Error::io(&output_dir, e))?;
    log::info!(
        "{}: {} files rewritten, {} copied",
        output_dir.display(),
        report.rewritten,
        report.copied
    );
    Ok(report)
}

/// Runs [`update`] for `languages`, or for every configured language when
/// none are given. Stops at the first failing language.
pub fn update_all(config: &Config, languages: &[String]) -> Result<Vec<UpdateReport>> {
    let languages = if languages.is_empty() {
        &config.languages[..]
    } else {
        languages
    };
    if languages.is_empty() {
        log::warn!("No languages configured, nothing to update");
    }
    languages
        .iter()
        .map(|language| update(config, language))
        .collect()
}

/// Extracts and structurally validates the source tree without writing.
pub fn check_sources(config: &Config) -> Result<CheckReport> {
    let graph = collect_graph(config)?;
    let mut report = CheckReport {
        files: graph.files.len(),
        units: 0,
        key_warnings: 0,
    };

    for relative in &graph.files {
        let path = config.source_dir.join(relative);
        let text = read(&path)?;
        let extraction = extract(&text).map_err(|e| Error::syntax(&path, &text, e))?;
        for diagnostic in &extraction.warnings {
            log::warn!(
                "{}:{}: {}",
                path.display(),
                locate(&text, diagnostic.offset),
                diagnostic.message()
            );
        }
        validate_structure(&text).map_err(|e| Error::structure(&path, &text, e))?;
        report.units += extraction.len();
        report.key_warnings += extraction.warnings.len();
    }

    Ok(report)
}

/// Structurally validates every `.tex` file below `dir`, in path order.
pub fn check_tree(dir: &Path) -> Result<CheckReport> {
    let mut report = CheckReport {
        files: 0,
        units: 0,
        key_warnings: 0,
    };

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "tex") {
            continue;
        }
        let text = read(path)?;
        validate_structure(&text).map_err(|e| Error::structure(path, &text, e))?;
        report.files += 1;
    }

    log::info!("{}: {} files are well formed", dir.display(), report.files);
    Ok(report)
}

/// Creates `dir` and its parents, refusing to replace a file in the way.
fn ensure_dir(dir: &Path) -> Result<()> {
    for ancestor in dir.ancestors() {
        if ancestor.exists() {
            if !ancestor.is_dir() {
                return Err(Error::OutputConflict {
                    path: ancestor.to_path_buf(),
                });
            }
            break;
        }
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn write(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| Error::io(path, e))
}

/// Store name of a source file: its relative path with `/` separators.
fn source_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
