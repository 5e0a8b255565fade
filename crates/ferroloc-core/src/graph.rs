use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

static INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\input\{([^}]*)\}").expect("valid input regex"));

/// An `\input` whose target does not exist. The walk skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingInclude {
    pub parent: PathBuf,
    pub path: PathBuf,
}

/// An `\input` of a file that is already being visited higher up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeCycle {
    pub parent: PathBuf,
    pub path: PathBuf,
}

/// An `\input` that points outside the source directory, through an
/// absolute path or `..`. The walk skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutsideInclude {
    pub parent: PathBuf,
    pub path: PathBuf,
}

/// The files reachable from a root document through `\input`, depth first.
///
/// Paths are relative to the source directory and always end in `.tex`. The
/// root comes first and every file appears once per `\input` that reaches it:
/// a file included from two parents is listed twice. Every listed path is
/// [contained](is_contained) in the source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludeGraph {
    pub files: Vec<PathBuf>,
    pub missing: Vec<MissingInclude>,
    pub cycles: Vec<IncludeCycle>,
    pub outside: Vec<OutsideInclude>,
}

impl IncludeGraph {
    /// Walks the graph from `root` inside `base_dir`.
    ///
    /// Missing, cyclic and outside references are logged and recorded, never
    /// fatal. An absent or outside root and an unreadable file are.
    pub fn collect(base_dir: &Path, root: &str) -> Result<Self> {
        let root = normalize(&with_tex_suffix(root));
        if !is_contained(&root) {
            return Err(Error::OutsideSourceDir { path: root });
        }
        let root_path = base_dir.join(&root);
        if !root_path.is_file() {
            return Err(Error::MissingRoot { path: root_path });
        }

        let mut graph = IncludeGraph::default();
        let mut stack = Vec::new();
        graph.visit(base_dir, root, &mut stack)?;
        log::debug!(
            "Collected {} files from {} ({} missing)",
            graph.files.len(),
            base_dir.display(),
            graph.missing.len()
        );
        Ok(graph)
    }

    fn visit(
        &mut self,
        base_dir: &Path,
        relative: PathBuf,
        stack: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let path = base_dir.join(&relative);
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        self.files.push(relative.clone());
        stack.push(relative.clone());

        for reference in input_references(&text) {
            let child = normalize(&with_tex_suffix(&reference));
            if !is_contained(&child) {
                log::warn!(
                    "{}: \\input{{{}}} points outside the source directory, skipping",
                    relative.display(),
                    reference
                );
                self.outside.push(OutsideInclude {
                    parent: relative.clone(),
                    path: child,
                });
                continue;
            }
            if stack.contains(&child) {
                log::warn!(
                    "{}: \\input{{{}}} includes a file that is already open, skipping",
                    relative.display(),
                    reference
                );
                self.cycles.push(IncludeCycle {
                    parent: relative.clone(),
                    path: child,
                });
                continue;
            }
            if !base_dir.join(&child).is_file() {
                log::warn!(
                    "{}: \\input{{{}}} refers to missing file {}",
                    relative.display(),
                    reference,
                    child.display()
                );
                self.missing.push(MissingInclude {
                    parent: relative.clone(),
                    path: child,
                });
                continue;
            }
            self.visit(base_dir, child, stack)?;
        }

        stack.pop();
        Ok(())
    }
}

/// The names referenced by `\input{...}` in `text`, in order.
pub fn input_references(text: &str) -> Vec<String> {
    INPUT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Whether `relative` stays below the directory it is joined to: it has at
/// least one component and only plain names, no root, prefix or `..`.
pub fn is_contained(relative: &Path) -> bool {
    let mut components = relative.components().peekable();
    components.peek().is_some()
        && components.all(|component| matches!(component, Component::Normal(_)))
}

fn with_tex_suffix(name: &str) -> String {
    if name.ends_with(".tex") {
        name.to_string()
    } else {
        format!("{}.tex", name)
    }
}

fn normalize(name: &str) -> PathBuf {
    Path::new(name)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
