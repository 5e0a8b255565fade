//! # FerroLoc Core
//!
//! Extraction, reinjection and validation of localized LaTeX document trees.
//!
//! ## Overview
//!
//! A LaTeX manual is the single source of truth for its translations. Authors
//! mark translatable titles and blocks inline; this crate walks the `\input`
//! graph, pulls every marked unit into a flat key/value store, and later
//! writes a per-language copy of the tree with the translated text substituted
//! back. Each rewritten file is checked for balanced braces and environments
//! before it is handed to the typesetter.
//!
//! ## Modules
//!
//! - [`graph`] - Depth-first `\input` graph from a root document
//! - [`extract`] - Marker units and key diagnostics of one file
//! - [`namespace`] - Path-derived key prefixes
//! - [`store`] - The JSON translation store and its escaping
//! - [`reinject`] - Substitution of translations into a file
//! - [`structure`] - Brace and environment balance checks
//! - [`config`] - `ferroloc.json`
//! - [`pipeline`] - The `rebase`, `update` and `check` operations
//!
//! ## Examples
//!
//! ```no_run
//! use ferroloc_core::{pipeline, Config};
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("ferroloc.json"))?;
//! let report = pipeline::rebase(&config)?;
//! println!("{} entries written to {}", report.entries, report.store_path.display());
//!
//! for report in pipeline::update_all(&config, &[])? {
//!     println!("{}: {} files rewritten", report.language, report.rewritten);
//! }
//! # Ok::<(), ferroloc_core::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod graph;
pub mod namespace;
pub mod pipeline;
pub mod reinject;
pub mod store;
pub mod structure;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::{extract, Extraction, KeyDiagnostic};
pub use graph::IncludeGraph;
pub use namespace::KeyPrefix;
pub use reinject::{reinject, Reinjection};
pub use store::TranslationStore;
pub use structure::{validate_structure, StructuralError, StructureValidator};
