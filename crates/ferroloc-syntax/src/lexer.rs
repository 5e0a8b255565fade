/// The structural classes a [`Lexer`] distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `\section`, `\{`, `\\`: a backslash and whatever it escapes.
    Command,
    /// An unescaped `{`.
    LBrace,
    /// An unescaped `}`.
    RBrace,
    /// Everything else, including whitespace and `%` comments.
    Text,
}

/// A token with its byte offset in the lexed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub offset: usize,
    pub text: &'a str,
}

/// A brace-aware lexer for LaTeX source code.
///
/// ## Overview
///
/// The lexer only knows what it takes to tell a structural brace from an
/// escaped one:
///
/// - **Commands**: a backslash followed by letters (`\section`) or by a single
///   symbol (`\{`, `\}`, `\\`, `\%`). Escaped braces are therefore swallowed by
///   the command token and never reported as [`TokenKind::LBrace`] or
///   [`TokenKind::RBrace`].
/// - **Braces**: `{` and `}`
/// - **Text**: everything else, consumed greedily until a backslash or brace
///
/// Comments are *not* recognized. Localization tags such as
/// `%%##$key>>` sit inside the argument of a heading, before its closing brace,
/// so treating `%` as a comment would hide that brace.
///
/// Title extraction and structural validation both consume this lexer, which
/// keeps their notion of "unescaped" identical.
///
/// ## Examples
///
/// ```
/// use ferroloc_syntax::lexer::{Lexer, TokenKind};
///
/// let kinds: Vec<_> = Lexer::new(r"\section{A \{b\}}").map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Command, // \section
///         TokenKind::LBrace,
///         TokenKind::Text,    // "A "
///         TokenKind::Command, // \{
///         TokenKind::Text,    // "b"
///         TokenKind::Command, // \}
///         TokenKind::RBrace,
///     ]
/// );
/// ```
pub struct Lexer<'a> {
    /// The input source text being lexed.
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new `Lexer` for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let start = self.position;
        let rest = &self.input[start..];
        let mut chars = rest.chars();
        let c = chars.next()?;

        let kind = match c {
            '\\' => {
                self.position += c.len_utf8();
                if let Some(next) = chars.next() {
                    self.position += next.len_utf8();
                    if next.is_alphabetic() {
                        while let Some(n) = self.input[self.position..].chars().next() {
                            if n.is_alphabetic() {
                                self.position += n.len_utf8();
                            } else {
                                break;
                            }
                        }
                    }
                }
                TokenKind::Command
            }
            '{' => {
                self.position += c.len_utf8();
                TokenKind::LBrace
            }
            '}' => {
                self.position += c.len_utf8();
                TokenKind::RBrace
            }
            _ => {
                self.position += c.len_utf8();
                while let Some(n) = self.input[self.position..].chars().next() {
                    match n {
                        '\\' | '{' | '}' => break,
                        _ => self.position += n.len_utf8(),
                    }
                }
                TokenKind::Text
            }
        };

        Some(Token {
            kind,
            offset: start,
            text: &self.input[start..self.position],
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Byte offsets of every structural (unescaped) brace in `input`, paired with
/// `true` for `{` and `false` for `}`.
pub fn structural_braces(input: &str) -> Vec<(usize, bool)> {
    Lexer::new(input)
        .filter_map(|token| match token.kind {
            TokenKind::LBrace => Some((token.offset, true)),
            TokenKind::RBrace => Some((token.offset, false)),
            _ => None,
        })
        .collect()
}
