use crate::structure::StructuralError;
use ferroloc_syntax::{locate, Location, SyntaxError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that aborts a rebase, update or check.
///
/// Syntax and structural errors render as `path:line:column: message`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: root document not found", .path.display())]
    MissingRoot { path: PathBuf },

    #[error("{}: invalid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}:{location}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        location: Location,
        #[source]
        source: SyntaxError,
    },

    #[error("{}:{location}: {source}", .path.display())]
    Structure {
        path: PathBuf,
        location: Location,
        #[source]
        source: StructuralError,
    },

    /// A structural violation introduced by reinjecting a translation. The
    /// path is the source file, the location points into the rewritten text.
    #[error("{}:{location}: {source} (in the '{language}' translation)", .path.display())]
    TranslatedStructure {
        language: String,
        path: PathBuf,
        location: Location,
        #[source]
        source: StructuralError,
    },

    #[error("{}: lies outside the source directory", .path.display())]
    OutsideSourceDir { path: PathBuf },

    #[error("{}: exists and is not a directory", .path.display())]
    OutputConflict { path: PathBuf },

    #[error("invalid language code '{0}'")]
    InvalidLanguage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Resolves the offset of `source` against the `text` it was found in.
    pub fn syntax(path: impl AsRef<Path>, text: &str, source: SyntaxError) -> Self {
        Error::Syntax {
            path: path.as_ref().to_path_buf(),
            location: locate(text, source.offset()),
            source,
        }
    }

    /// Resolves the offset of `source` against the `text` it was found in.
    pub fn structure(path: impl AsRef<Path>, text: &str, source: StructuralError) -> Self {
        Error::Structure {
            path: path.as_ref().to_path_buf(),
            location: locate(text, source.offset()),
            source,
        }
    }

    /// Like [`Error::structure`] for the rewritten `text` of a source file.
    pub fn translated_structure(
        language: &str,
        path: impl AsRef<Path>,
        text: &str,
        source: StructuralError,
    ) -> Self {
        Error::TranslatedStructure {
            language: language.to_string(),
            path: path.as_ref().to_path_buf(),
            location: locate(text, source.offset()),
            source,
        }
    }

    /// Line and column of syntax and structural errors.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Syntax { location, .. }
            | Error::Structure { location, .. }
            | Error::TranslatedStructure { location, .. } => Some(*location),
            _ => None,
        }
    }
}
