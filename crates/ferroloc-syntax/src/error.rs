use thiserror::Error;

/// A fatal violation of the marker grammar.
///
/// Every variant carries the byte offset of the offending marker so callers
/// can resolve it to a line and column with
/// [`LocationMapper`](crate::location::LocationMapper).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("opening marker of block '{key}' must be followed by a line break")]
    UnterminatedOpening { key: String, offset: usize },

    #[error("block '{key}' is never closed by a '%%!!>>' line")]
    MissingClose { key: String, offset: usize },

    #[error("marker nested inside block '{key}'")]
    NestedMarker { key: String, offset: usize },

    #[error("'%%!!>>' closes a block that was never opened")]
    StrayClose { offset: usize },

    #[error("marker '{key}' overlaps marker '{other}'")]
    OverlappingMarkers {
        key: String,
        other: String,
        offset: usize,
    },

    #[error("duplicate marker key '{key}'")]
    DuplicateKey { key: String, offset: usize },
}

impl SyntaxError {
    /// Byte offset of the offence in the scanned text.
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnterminatedOpening { offset, .. }
            | SyntaxError::MissingClose { offset, .. }
            | SyntaxError::NestedMarker { offset, .. }
            | SyntaxError::StrayClose { offset }
            | SyntaxError::OverlappingMarkers { offset, .. }
            | SyntaxError::DuplicateKey { offset, .. } => *offset,
        }
    }
}
