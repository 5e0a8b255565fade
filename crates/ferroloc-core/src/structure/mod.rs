use thiserror::Error;

/// A structural defect that would make the typesetting tool choke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unmatched closing brace")]
    UnmatchedClosingBrace { offset: usize },

    #[error("unmatched opening brace")]
    UnmatchedOpeningBrace { offset: usize },

    #[error("{begins} \\begin tags but {ends} \\end tags; environment '{name}' is unbalanced")]
    EnvironmentCountMismatch {
        begins: usize,
        ends: usize,
        name: String,
        offset: usize,
    },

    #[error("\\begin{{{name}}} has no matching \\end{{{name}}}")]
    UnmatchedBegin { name: String, offset: usize },

    #[error("\\end{{{name}}} has no matching \\begin{{{name}}}")]
    UnmatchedEnd { name: String, offset: usize },
}

impl StructuralError {
    /// Byte offset of the offending brace or environment tag.
    pub fn offset(&self) -> usize {
        match self {
            StructuralError::UnmatchedClosingBrace { offset }
            | StructuralError::UnmatchedOpeningBrace { offset }
            | StructuralError::EnvironmentCountMismatch { offset, .. }
            | StructuralError::UnmatchedBegin { offset, .. }
            | StructuralError::UnmatchedEnd { offset, .. } => *offset,
        }
    }
}

pub mod brace_validator;
pub mod environment_validator;

#[cfg(test)]
mod tests;

pub use brace_validator::check_braces;
pub use environment_validator::check_environments;

/// Runs the brace and environment checks over a whole file.
///
/// Each check reports at most its first violation. The checks are independent:
/// a file with a stray brace still gets its environments checked.
///
/// ```
/// use ferroloc_core::structure::StructureValidator;
///
/// let mut validator = StructureValidator::new();
/// validator.validate("\\begin{itemize}\\item {x}\\end{itemize}");
/// assert!(!validator.has_errors());
///
/// validator.validate("\\begin{itemize}\\item x");
/// assert!(validator.has_errors());
/// ```
pub struct StructureValidator {
    errors: Vec<StructuralError>,
}

impl StructureValidator {
    /// Creates a new validator with an empty error list.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn validate(&mut self, text: &str) {
        self.errors.extend(check_braces(text));
        self.errors.extend(check_environments(text));
    }

    pub fn errors(&self) -> &[StructuralError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The earliest violation in the text, if any.
    pub fn into_first_error(self) -> Option<StructuralError> {
        self.errors.into_iter().min_by_key(StructuralError::offset)
    }
}

impl Default for StructureValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates `text`, failing with its earliest structural violation.
pub fn validate_structure(text: &str) -> Result<(), StructuralError> {
    let mut validator = StructureValidator::new();
    validator.validate(text);
    match validator.into_first_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
