use ferroloc_syntax::{
    check_block_key, check_title_key, KeyWarning, MarkerKind, MarkerScanner, MarkerUnit,
    SyntaxError,
};
use serde::Serialize;

/// A key that failed its format check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDiagnostic {
    pub key: String,
    /// Byte offset of the marker carrying the key.
    pub offset: usize,
    pub warning: KeyWarning,
}

impl KeyDiagnostic {
    pub fn message(&self) -> String {
        self.warning.message(&self.key)
    }
}

/// The translatable units of one file, in offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub units: Vec<MarkerUnit>,
    pub warnings: Vec<KeyDiagnostic>,
}

impl Extraction {
    /// `(local key, text)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.units
            .iter()
            .map(|unit| (unit.key.as_str(), unit.raw_text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Extracts every marker of `text`.
///
/// Malformed keys are reported in [`Extraction::warnings`] and still extracted
/// as written. Grammar violations abort with the offending offset.
///
/// ```
/// use ferroloc_core::extract::extract;
///
/// let text = "\\section{Intro%%##$intro>>}\n%%!!body<<\nHello world\n%%!!>>\n";
/// let extraction = extract(text).unwrap();
/// let entries: Vec<_> = extraction.entries().collect();
/// assert_eq!(entries, vec![("$intro", "Intro"), ("body", "Hello world")]);
/// ```
pub fn extract(text: &str) -> Result<Extraction, SyntaxError> {
    let units = MarkerScanner::new(text).units()?;
    let warnings = units
        .iter()
        .filter_map(|unit| {
            let warning = match unit.kind {
                MarkerKind::Title => check_title_key(&unit.key),
                MarkerKind::Block => check_block_key(&unit.key),
            }?;
            Some(KeyDiagnostic {
                key: unit.key.clone(),
                offset: unit.marker_start,
                warning,
            })
        })
        .collect();
    Ok(Extraction { units, warnings })
}
