use super::StructuralError;
use ferroloc_syntax::lexer::structural_braces;

/// Checks that unescaped braces balance.
///
/// ## Algorithm
///
/// 1. Scan left to right, `{` counting up and `}` counting down. The first `}`
///    that drives the count negative is reported.
/// 2. If the count ends positive, scan right to left with the roles swapped.
///    The first `{` that drives that count negative is the unmatched one.
///
/// Escaped braces (`\{`, `\}`) never count, see
/// [`Lexer`](ferroloc_syntax::lexer::Lexer).
pub fn check_braces(text: &str) -> Option<StructuralError> {
    let braces = structural_braces(text);

    let mut depth = 0i64;
    for &(offset, is_open) in &braces {
        if is_open {
            depth += 1;
        } else {
            depth -= 1;
            if depth < 0 {
                return Some(StructuralError::UnmatchedClosingBrace { offset });
            }
        }
    }

    if depth == 0 {
        return None;
    }

    let mut depth = 0i64;
    for &(offset, is_open) in braces.iter().rev() {
        if is_open {
            depth -= 1;
            if depth < 0 {
                return Some(StructuralError::UnmatchedOpeningBrace { offset });
            }
        } else {
            depth += 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced() {
        assert_eq!(check_braces(r"\textbf{a {b} c}"), None);
    }

    #[test]
    fn test_extra_closing() {
        assert_eq!(
            check_braces("{a}}"),
            Some(StructuralError::UnmatchedClosingBrace { offset: 3 })
        );
    }

    #[test]
    fn test_extra_opening_found_from_the_right() {
        // The first brace is the unmatched one; a forward scan cannot tell.
        assert_eq!(
            check_braces("{a {b} {c}"),
            Some(StructuralError::UnmatchedOpeningBrace { offset: 0 })
        );
    }

    #[test]
    fn test_escaped_braces_ignored() {
        assert_eq!(check_braces(r"\{ \} {\}}"), None);
    }
}
