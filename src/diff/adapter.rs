//! Converts parser records into the closed types the classifier works on.

use super::parser::{FileKind, ParsedFile};
use super::types::{ConfidenceTier, DiffPath, OperationKind};

/// A [`ParsedFile`] reduced to what classification needs.
///
/// `operation` is `None` when the parser's declared type says nothing about
/// the file operation (binary records). A kind the parser only inferred
/// from its paths is trusted no more than the unified-header fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHint {
  pub operation:  Option<OperationKind>,
  pub old_path:   Option<DiffPath>,
  pub new_path:   Option<DiffPath>,
  pub similarity: Option<u8>,
  pub has_hunks:  bool,
  pub confidence: ConfidenceTier
}

impl ParsedHint {
  pub fn is_explicit(&self) -> bool {
    self.confidence == ConfidenceTier::ExplicitParsedType
  }
}

impl From<&ParsedFile> for ParsedHint {
  fn from(file: &ParsedFile) -> Self {
    let similarity = file.similarity.map(|percent| percent.min(100));

    let operation = match file.kind {
      FileKind::Added => Some(OperationKind::Create),
      FileKind::Deleted => Some(OperationKind::Delete),
      FileKind::Renamed => Some(OperationKind::Rename { similarity_percent: similarity }),
      FileKind::Copied => Some(OperationKind::Copy { similarity_percent: similarity }),
      FileKind::Modified => Some(OperationKind::Modify),
      FileKind::Binary => None
    };

    Self {
      operation,
      old_path: file.old_path.as_deref().and_then(DiffPath::new),
      new_path: file.new_path.as_deref().and_then(DiffPath::new),
      similarity,
      has_hunks: file.hunks.iter().any(|hunk| !hunk.lines.is_empty() || hunk.old_lines > 0 || hunk.new_lines > 0),
      confidence: if file.kind_declared {
        ConfidenceTier::ExplicitParsedType
      } else {
        ConfidenceTier::UnifiedHeaderFallback
      }
    }
  }
}

pub fn adapt(file: &ParsedFile) -> ParsedHint {
  ParsedHint::from(file)
}
