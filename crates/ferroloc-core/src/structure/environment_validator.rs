use super::StructuralError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static ENVIRONMENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(begin|end)\{([^}]*)\}").expect("valid environment regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
struct EnvironmentTag<'a> {
    name: &'a str,
    is_begin: bool,
    offset: usize,
}

/// Checks that every environment name has as many `\begin` as `\end` tags.
///
/// The begin and end names are compared as sorted multisets, so the check is
/// order-insensitive: `\begin{a}\begin{b}\end{a}\end{b}` passes. It catches
/// forgotten and misspelled tags, not bad nesting.
///
/// A count mismatch is reported as [`StructuralError::EnvironmentCountMismatch`];
/// equal counts with different names as [`StructuralError::UnmatchedBegin`] or
/// [`StructuralError::UnmatchedEnd`]. Either way the error names the first
/// unbalanced environment in sort order and points at its most likely
/// offending tag.
pub fn check_environments(text: &str) -> Option<StructuralError> {
    let tags: Vec<EnvironmentTag> = ENVIRONMENT_TAG
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(EnvironmentTag {
                name: caps.get(2)?.as_str(),
                is_begin: caps.get(1)?.as_str() == "begin",
                offset: whole.start(),
            })
        })
        .collect();

    let mut begins: Vec<&str> = tags.iter().filter(|t| t.is_begin).map(|t| t.name).collect();
    let mut ends: Vec<&str> = tags.iter().filter(|t| !t.is_begin).map(|t| t.name).collect();
    begins.sort_unstable();
    ends.sort_unstable();

    let (name, surplus_begin) = first_unpaired(&begins, &ends)?;
    let offset = if surplus_begin {
        unmatched_begin_offset(&tags, name)
    } else {
        unmatched_end_offset(&tags, name)
    };

    let error = if begins.len() != ends.len() {
        StructuralError::EnvironmentCountMismatch {
            begins: begins.len(),
            ends: ends.len(),
            name: name.to_string(),
            offset,
        }
    } else if surplus_begin {
        StructuralError::UnmatchedBegin {
            name: name.to_string(),
            offset,
        }
    } else {
        StructuralError::UnmatchedEnd {
            name: name.to_string(),
            offset,
        }
    };
    Some(error)
}

/// Walks two sorted name lists in step and returns the first name without a
/// partner, flagged `true` when it comes from `begins`.
fn first_unpaired<'a>(begins: &[&'a str], ends: &[&'a str]) -> Option<(&'a str, bool)> {
    let (mut i, mut j) = (0, 0);
    loop {
        match (begins.get(i), ends.get(j)) {
            (Some(b), Some(e)) => match b.cmp(e) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                Ordering::Less => return Some((*b, true)),
                Ordering::Greater => return Some((*e, false)),
            },
            (Some(b), None) => return Some((*b, true)),
            (None, Some(e)) => return Some((*e, false)),
            (None, None) => return None,
        }
    }
}

/// The `\begin{name}` left open when pairing tags of `name` from the right.
fn unmatched_begin_offset(tags: &[EnvironmentTag], name: &str) -> usize {
    let mut depth = 0i64;
    let mut last = 0;
    for tag in tags.iter().rev().filter(|t| t.name == name) {
        if tag.is_begin {
            depth -= 1;
            last = tag.offset;
            if depth < 0 {
                return tag.offset;
            }
        } else {
            depth += 1;
        }
    }
    last
}

/// The first `\end{name}` with nothing left to close.
fn unmatched_end_offset(tags: &[EnvironmentTag], name: &str) -> usize {
    let mut depth = 0i64;
    let mut last = 0;
    for tag in tags.iter().filter(|t| t.name == name) {
        if tag.is_begin {
            depth += 1;
        } else {
            depth -= 1;
            last = tag.offset;
            if depth < 0 {
                return tag.offset;
            }
        }
    }
    last
}
