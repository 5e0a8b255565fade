//! # FerroLoc Syntax
//!
//! Recognizes the localization marker grammar layered on top of LaTeX sources.
//!
//! The crate does not parse LaTeX. It knows three things:
//!
//! - which braces are structural ([`lexer`]),
//! - where title and block markers start and end ([`scanner`]),
//! - how a byte offset maps to a line and column ([`location`]).
//!
//! ```
//! use ferroloc_syntax::{locate, Location, MarkerScanner};
//!
//! let text = "intro\n%%!!a<<\nnever closed\n";
//! let err = MarkerScanner::new(text).units().unwrap_err();
//! assert_eq!(locate(text, err.offset()), Location::new(2, 1));
//! ```

pub mod error;
pub mod keys;
pub mod lexer;
pub mod location;
pub mod scanner;

pub use error::SyntaxError;
pub use keys::{check_block_key, check_title_key, KeyWarning};
pub use location::{locate, Location, LocationMapper};
pub use scanner::{MarkerKind, MarkerScanner, MarkerUnit};
