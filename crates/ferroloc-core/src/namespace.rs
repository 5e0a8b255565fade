use std::fmt;
use std::path::{Component, Path};

/// The namespace of one source file's keys inside a translation store.
///
/// The prefix is the file's relative path with `/` and the trailing `.tex`
/// both turned into `$`: `guide/intro.tex` becomes `guide$intro$`, so block key
/// `k1` is stored as `guide$intro$k1` and title key `$t1` as `guide$intro$$t1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    /// Builds the prefix for a path relative to the source directory.
    /// `.` components are ignored and separators are normalized to `/`.
    pub fn for_path(relative: &Path) -> Self {
        let joined = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        let stem = joined.strip_suffix(".tex").unwrap_or(&joined);
        KeyPrefix(format!("{}$", stem.replace('/', "$")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn qualify(&self, local_key: &str) -> String {
        format!("{}{}", self.0, local_key)
    }

    /// The rest of `namespaced` after this prefix, taken verbatim.
    ///
    /// A prefix match alone does not prove ownership: `guide$` is also a
    /// prefix of the keys of `guide/intro.tex`. Use [`KeyPrefix::owner`] to
    /// decide which file a key belongs to.
    pub fn strip<'k>(&self, namespaced: &'k str) -> Option<&'k str> {
        namespaced.strip_prefix(self.0.as_str())
    }

    /// The file owning `namespaced` among `prefixes`: the longest prefix that
    /// matches. Local keys may themselves contain `$` (malformed keys are kept
    /// as written), so the remainder is never inspected.
    pub fn owner<'p>(prefixes: &'p [KeyPrefix], namespaced: &str) -> Option<&'p KeyPrefix> {
        prefixes
            .iter()
            .filter(|prefix| namespaced.starts_with(prefix.as_str()))
            .max_by_key(|prefix| prefix.0.len())
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
