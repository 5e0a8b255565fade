use crate::error::SyntaxError;
use crate::lexer::{Lexer, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Heading-like commands whose argument can carry a title marker.
pub const HEADING_COMMANDS: [&str; 6] = [
    "section",
    "subsection",
    "subsubsection",
    "chapter",
    "caption",
    "paragraph",
];

/// Opens the in-text tag of a title marker: `%%##$key>>`.
pub const TITLE_TAG: &str = "%%##";
/// Opens a block marker line: `%%!!key<<`.
pub const BLOCK_TAG: &str = "%%!!";
/// The closing line of a block marker.
pub const BLOCK_CLOSE_TAG: &str = "%%!!>>";
/// The closing line as matched, including the line break that ends the content.
pub const BLOCK_CLOSE: &str = "\n%%!!>>";

static TITLE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(section|subsection|subsubsection|chapter|caption|paragraph)\{(.*?)%%##(.*?)>>",
    )
    .expect("valid title marker regex")
});

static BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%%!!([^\n<>]*)<<").expect("valid block marker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Title,
    Block,
}

impl MarkerKind {
    /// Title keys start with `$`, block keys never do.
    pub fn of_key(key: &str) -> Self {
        if key.starts_with('$') {
            MarkerKind::Title
        } else {
            MarkerKind::Block
        }
    }
}

/// One translatable unit found in a file.
///
/// `start_offset..end_offset` is the translatable text, which is exactly the
/// range a translation replaces. `marker_start..marker_end` covers the whole
/// marker (heading command through `>>`, or opening line through closing line)
/// and is what overlap checks use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerUnit {
    pub key: String,
    pub kind: MarkerKind,
    pub raw_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub marker_start: usize,
    pub marker_end: usize,
}

/// Finds localization markers in one file's text.
///
/// ## Grammar
///
/// - **Title**: `\section{Text%%##$key>>}` for any of [`HEADING_COMMANDS`].
///   The text runs from the opening brace to the tag, or to the first
///   unbalanced `}` if the tag trails the argument (`\section{Text}%%##$key>>`).
/// - **Block**: a line `%%!!key<<`, free-form lines, then a line `%%!!>>`.
///   Leading whitespace of the content is not part of the translatable text.
///
/// ## Primitives
///
/// [`next_title`](Self::next_title) and [`next_block`](Self::next_block) find
/// the first marker of their kind at or after a byte offset. [`units`](Self::units)
/// folds both over the whole file. Extraction and reinjection go through the
/// same primitives, so a span that was extracted is exactly the span that gets
/// replaced.
///
/// ```
/// use ferroloc_syntax::scanner::{MarkerKind, MarkerScanner};
///
/// let text = "\\section{Intro%%##$intro>>}\n%%!!body<<\nHello world\n%%!!>>\n";
/// let units = MarkerScanner::new(text).units().unwrap();
///
/// assert_eq!(units[0].kind, MarkerKind::Title);
/// assert_eq!(units[0].key, "$intro");
/// assert_eq!(units[0].raw_text, "Intro");
/// assert_eq!(units[1].key, "body");
/// assert_eq!(units[1].raw_text, "Hello world");
/// ```
pub struct MarkerScanner<'a> {
    text: &'a str,
}

impl<'a> MarkerScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The first title marker starting at or after `from`.
    pub fn next_title(&self, from: usize) -> Option<MarkerUnit> {
        let caps = TITLE_MARKER.captures_at(self.text, from)?;
        let whole = caps.get(0)?;
        let body = caps.get(2)?;
        let key = caps.get(3)?;

        let len = argument_len(body.as_str());
        Some(MarkerUnit {
            key: key.as_str().to_string(),
            kind: MarkerKind::Title,
            raw_text: body.as_str()[..len].to_string(),
            start_offset: body.start(),
            end_offset: body.start() + len,
            marker_start: whole.start(),
            marker_end: whole.end(),
        })
    }

    /// The first block marker starting at or after `from`.
    ///
    /// A `%%!!>>` line met before the next opening marker closes nothing and is
    /// an error, as is any marker line between a block's opening and closing
    /// lines. The tag only counts at the start of a line; mid-line it is text.
    pub fn next_block(&self, from: usize) -> Result<Option<MarkerUnit>, SyntaxError> {
        let open = BLOCK_OPEN.captures_at(self.text, from);
        let limit = open
            .as_ref()
            .and_then(|caps| caps.get(0))
            .map_or(self.text.len(), |m| m.start());

        let stray = self.text[from..limit]
            .match_indices(BLOCK_CLOSE_TAG)
            .map(|(pos, _)| from + pos)
            .find(|&offset| offset == 0 || self.text.as_bytes()[offset - 1] == b'\n');
        if let Some(offset) = stray {
            return Err(SyntaxError::StrayClose { offset });
        }

        let Some(open) = open else {
            return Ok(None);
        };
        let (Some(whole), Some(key)) = (open.get(0), open.get(1)) else {
            return Ok(None);
        };
        let key = key.as_str().to_string();

        // Byte index of the line break ending the opening line.
        let header_end = whole.end();
        if !self.text[header_end..].starts_with('\n') {
            return Err(SyntaxError::UnterminatedOpening {
                key,
                offset: whole.start(),
            });
        }
        let content_start = header_end + 1;

        // Searching from the opening line break lets an empty block share it.
        let close = match self.text[header_end..].find(BLOCK_CLOSE) {
            Some(pos) => header_end + pos,
            None => {
                return Err(SyntaxError::MissingClose {
                    key,
                    offset: whole.start(),
                });
            }
        };

        let interior = &self.text[header_end..close];
        for nested in ["\n%%!!", "\n%%##"] {
            if let Some(pos) = interior.find(nested) {
                return Err(SyntaxError::NestedMarker {
                    key,
                    offset: header_end + pos + 1,
                });
            }
        }
        if let Some(m) = BLOCK_OPEN.find(interior) {
            return Err(SyntaxError::NestedMarker {
                key,
                offset: header_end + m.start(),
            });
        }

        let content_end = close.max(content_start);
        let content = &self.text[content_start..content_end];
        let start = content_start + (content.len() - content.trim_start().len());

        Ok(Some(MarkerUnit {
            key,
            kind: MarkerKind::Block,
            raw_text: self.text[start..content_end].to_string(),
            start_offset: start,
            end_offset: content_end,
            marker_start: whole.start(),
            marker_end: close + BLOCK_CLOSE.len(),
        }))
    }

    /// Every marker of the file in offset order.
    ///
    /// Fails on the first block grammar violation, on markers that overlap
    /// (which includes a title inside a block) and on a key used twice.
    pub fn units(&self) -> Result<Vec<MarkerUnit>, SyntaxError> {
        let mut units = Vec::new();

        let mut cursor = 0;
        while let Some(unit) = self.next_title(cursor) {
            cursor = unit.marker_end;
            units.push(unit);
        }

        cursor = 0;
        while let Some(unit) = self.next_block(cursor)? {
            cursor = unit.marker_end;
            units.push(unit);
        }

        units.sort_by_key(|unit| unit.marker_start);

        for pair in units.windows(2) {
            if pair[1].marker_start < pair[0].marker_end {
                return Err(SyntaxError::OverlappingMarkers {
                    key: pair[1].key.clone(),
                    other: pair[0].key.clone(),
                    offset: pair[1].marker_start,
                });
            }
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for unit in &units {
            if seen.insert(unit.key.as_str(), unit.marker_start).is_some() {
                return Err(SyntaxError::DuplicateKey {
                    key: unit.key.clone(),
                    offset: unit.marker_start,
                });
            }
        }

        Ok(units)
    }
}

/// Length of a heading argument within a raw capture: up to the first `}`
/// that closes more than it opened, or the whole capture.
fn argument_len(capture: &str) -> usize {
    let mut depth = 0i32;
    for token in Lexer::new(capture) {
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => {
                depth -= 1;
                if depth < 0 {
                    return token.offset;
                }
            }
            _ => {}
        }
    }
    capture.len()
}
