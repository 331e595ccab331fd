//! Change classification
//!
//! Decides whether a set of changed file paths warrants rebuilding the
//! container environment. Everything in this module is pure: no I/O, no
//! errors, no state beyond the compiled patterns.
//!
//! # Example
//!
//! ```
//! use redock::classifier::{matches, should_rebuild, DEFAULT_REBUILD_PATTERNS, DEFAULT_SKIP_PATTERNS};
//!
//! assert!(matches("backend/src/App.java", "backend/**"));
//! assert!(!matches("frontend/app.js", "backend/**"));
//!
//! let changed = ["README.md", "backend/App.java"];
//! assert!(should_rebuild(&changed, DEFAULT_REBUILD_PATTERNS, DEFAULT_SKIP_PATTERNS));
//! ```

mod decision;
mod pattern;

pub use decision::{
    should_rebuild, Category, ChangeClassifier, FileClassification, DEFAULT_REBUILD_PATTERNS,
    DEFAULT_SKIP_PATTERNS,
};
pub use pattern::{matches, normalize_path, Pattern, RECURSIVE_MARKER};
