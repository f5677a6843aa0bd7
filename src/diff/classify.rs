//! Operation classification.
//!
//! Combines an optional parser hint with the paths extracted from raw text.
//! Rules are tried in order and the first one that produces a result wins;
//! the result is then checked against the shape each operation requires.

use serde::Serialize;

use super::adapter::ParsedHint;
use super::types::{ConfidenceTier, DiffPath, ExtractedPaths, OperationKind};

/// A resolved operation with the paths it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
  pub operation:  OperationKind,
  pub old_path:   Option<DiffPath>,
  pub new_path:   Option<DiffPath>,
  pub confidence: ConfidenceTier
}

impl Classification {
  /// The path an action on this file should target: the old path for a
  /// delete, the new one (or whichever is known) otherwise.
  pub fn target_path(&self) -> Option<&DiffPath> {
    match self.operation {
      OperationKind::Delete => self.old_path.as_ref(),
      _ => self.new_path.as_ref().or(self.old_path.as_ref())
    }
  }
}

type ClassifyRule = fn(Option<&ParsedHint>, &ExtractedPaths) -> Option<Classification>;

const CLASSIFY_RULES: [(&str, ClassifyRule); 3] = [
  ("parsed-paths-differ", classify_distinct_parsed_paths),
  ("parsed-type", classify_parsed_type),
  ("extracted-hint", classify_extracted_hint)
];

/// Resolves the operation for one diff segment. Never fails.
pub fn classify(parsed: Option<&ParsedHint>, extracted: &ExtractedPaths) -> Classification {
  for (name, rule) in CLASSIFY_RULES.iter() {
    if let Some(classification) = rule(parsed, extracted) {
      log::trace!("Classification rule {name} matched: {:?}", classification.operation);
      return sanitize(classification);
    }
  }

  let (old_path, new_path) = match parsed {
    Some(hint) if hint.old_path.is_some() || hint.new_path.is_some() => (hint.old_path.clone(), hint.new_path.clone()),
    _ => (extracted.old_path.clone(), extracted.new_path.clone())
  };

  Classification { operation: OperationKind::Unknown, old_path, new_path, confidence: ConfidenceTier::Unknown }
}

// An inferred parser kind only counts when raw text offers nothing better
fn trusted_hint<'a>(parsed: Option<&'a ParsedHint>, extracted: &ExtractedPaths) -> Option<&'a ParsedHint> {
  parsed.filter(|hint| hint.is_explicit() || extracted.hinted_operation.is_none())
}

fn similarity(parsed: &ParsedHint, extracted: &ExtractedPaths) -> Option<u8> {
  parsed
    .similarity
    .or_else(|| extracted.hinted_operation.and_then(|operation| operation.similarity()))
}

// Upstream parsers often call a move "modified"; differing paths outrank that claim
fn classify_distinct_parsed_paths(parsed: Option<&ParsedHint>, extracted: &ExtractedPaths) -> Option<Classification> {
  let hint = trusted_hint(parsed, extracted)?;
  let declared = hint.operation?;

  let (old, new) = match (&hint.old_path, &hint.new_path) {
    (Some(old), Some(new)) if old != new => (old.clone(), new.clone()),
    _ => return None
  };

  let similarity_percent = similarity(hint, extracted);
  let operation = match declared {
    OperationKind::Copy { .. } => OperationKind::Copy { similarity_percent },
    _ => OperationKind::Rename { similarity_percent }
  };

  Some(Classification {
    operation,
    old_path: Some(old),
    new_path: Some(new),
    confidence: hint.confidence
  })
}

fn classify_parsed_type(parsed: Option<&ParsedHint>, extracted: &ExtractedPaths) -> Option<Classification> {
  let hint = trusted_hint(parsed, extracted)?;
  let declared = hint.operation?;

  let old_path = hint.old_path.clone().or_else(|| extracted.old_path.clone());
  let new_path = hint.new_path.clone().or_else(|| extracted.new_path.clone());

  let (operation, old_path, new_path) = match declared {
    OperationKind::Create => (declared, None, new_path),
    OperationKind::Delete => (declared, old_path, None),
    OperationKind::Rename { .. } | OperationKind::Copy { .. } => {
      (declared.with_similarity(similarity(hint, extracted)), old_path, new_path)
    },
    _ => (declared, old_path, new_path)
  };

  Some(Classification { operation, old_path, new_path, confidence: hint.confidence })
}

fn classify_extracted_hint(_parsed: Option<&ParsedHint>, extracted: &ExtractedPaths) -> Option<Classification> {
  let operation = extracted.hinted_operation?;

  Some(Classification {
    operation,
    old_path: extracted.old_path.clone(),
    new_path: extracted.new_path.clone(),
    confidence: extracted.confidence
  })
}

/// Enforces the path shape each operation requires.
///
/// Rename/copy need two distinct paths, create needs a new path, delete an
/// old path, modify at least one path. A result that cannot be repaired
/// becomes `Unknown` at the lowest tier but keeps its paths for display.
pub fn sanitize(classification: Classification) -> Classification {
  let Classification { operation, old_path, new_path, confidence } = classification;

  let repaired = match (&operation, &old_path, &new_path) {
    (OperationKind::Rename { .. } | OperationKind::Copy { .. }, Some(old), Some(new)) if old == new => {
      Some(OperationKind::Modify)
    },
    (OperationKind::Rename { .. } | OperationKind::Copy { .. }, Some(_), Some(_)) => Some(operation),
    (OperationKind::Create, _, Some(_)) => Some(operation),
    (OperationKind::Delete, Some(_), _) => Some(operation),
    (OperationKind::Modify, Some(old), Some(new)) if old != new => {
      Some(OperationKind::Rename { similarity_percent: None })
    },
    (OperationKind::Modify, Some(_), _) | (OperationKind::Modify, _, Some(_)) => Some(operation),
    _ => None
  };

  match repaired {
    Some(operation) => Classification { operation, old_path, new_path, confidence },
    None => {
      log::trace!("Operation {:?} lacks the paths it needs, falling back to unknown", operation);
      Classification { operation: OperationKind::Unknown, old_path, new_path, confidence: ConfidenceTier::Unknown }
    }
  }
}
