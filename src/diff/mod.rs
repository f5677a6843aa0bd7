//! Diff-header classification.
//!
//! Raw diff text and, optionally, a parser record go in; an operation, the
//! paths it applies to, and a display label come out.

pub mod adapter;
pub mod classify;
pub mod extract;
pub mod label;
pub mod parser;
pub mod types;

pub use adapter::{adapt, ParsedHint};
pub use classify::{classify, Classification};
pub use extract::extract;
pub use label::format_label;
pub use parser::{parse_diff, split_segments, FileKind, Hunk, ParseError, ParsedFile};
pub use types::{ConfidenceTier, DiffPath, ExtractedPaths, Label, OperationKind};
