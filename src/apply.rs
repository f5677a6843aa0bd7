//! Boundary to the service that writes changes to disk.
//!
//! This crate never applies a diff itself. It only hands the implementor
//! the segment text together with the resolved operation and target path.

use anyhow::Result;
use serde::Serialize;

use crate::diff::types::{DiffPath, OperationKind};
use crate::engine::ResolvedSegment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyRequest {
  pub diff_text:   String,
  pub target_path: DiffPath,
  pub operation:   OperationKind
}

impl ApplyRequest {
  /// Builds a request for a resolved segment.
  ///
  /// Returns `None` when the operation is unknown or no target path is known.
  pub fn for_segment(segment: &ResolvedSegment, diff_text: &str) -> Option<Self> {
    if segment.operation() == OperationKind::Unknown {
      return None;
    }

    let target_path = segment.target_path()?.clone();
    Some(Self { diff_text: diff_text.to_string(), target_path, operation: segment.operation() })
  }
}

/// Implemented by whatever owns the on-disk mutation
pub trait ApplyChanges {
  fn apply(&self, request: &ApplyRequest) -> Result<()>;
}
