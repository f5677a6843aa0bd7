pub mod apply;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod stabilizer;

// Re-exports
pub use apply::{ApplyChanges, ApplyRequest};
pub use crate::config::{KeyStrategy, Settings};
pub use diff::{ConfidenceTier, DiffPath, Label, OperationKind};
pub use engine::{describe, LabelEngine, ResolvedSegment, TextState};
pub use error::Error;
pub use stabilizer::{DiffSegmentKey, StabilizerEntry, StabilizerStore};
