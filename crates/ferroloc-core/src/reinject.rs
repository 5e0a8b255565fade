use ferroloc_syntax::scanner::BLOCK_CLOSE_TAG;
use ferroloc_syntax::{MarkerKind, MarkerScanner, SyntaxError};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A file's text after translated units were substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reinjection {
    pub text: String,
    /// Units whose text came from the translations.
    pub replaced: usize,
    /// Translation keys with no marker in the file, in translation order.
    pub unknown_keys: Vec<String>,
}

/// Substitutes `translations` (local key to unescaped text) into `source`.
///
/// The source is scanned with the same primitives extraction uses, and the
/// output is rebuilt in one pass over its units: everything outside a unit's
/// text span is copied untouched, including the marker tags themselves. Units
/// without a translation keep their source text.
///
/// ```
/// use ferroloc_core::reinject::reinject;
/// use indexmap::IndexMap;
///
/// let source = "\\section{Intro%%##$intro>>}\n";
/// let translations = IndexMap::from([("$intro".to_string(), "Einleitung".to_string())]);
/// let result = reinject(source, &translations).unwrap();
/// assert_eq!(result.text, "\\section{Einleitung%%##$intro>>}\n");
/// ```
pub fn reinject(
    source: &str,
    translations: &IndexMap<String, String>,
) -> Result<Reinjection, SyntaxError> {
    let units = MarkerScanner::new(source).units()?;

    let mut text = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut replaced = 0;
    for unit in &units {
        let Some(translated) = translations.get(&unit.key) else {
            continue;
        };
        text.push_str(&source[cursor..unit.start_offset]);
        text.push_str(translated);
        // An empty block shares its line break with the opening line, so new
        // content needs its own before the closing line.
        if unit.kind == MarkerKind::Block
            && !translated.is_empty()
            && source[unit.end_offset..].starts_with(BLOCK_CLOSE_TAG)
        {
            text.push('\n');
        }
        cursor = unit.end_offset;
        replaced += 1;
    }
    text.push_str(&source[cursor..]);

    let known: HashSet<&str> = units.iter().map(|unit| unit.key.as_str()).collect();
    let unknown_keys = translations
        .keys()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect();

    Ok(Reinjection {
        text,
        replaced,
        unknown_keys,
    })
}
