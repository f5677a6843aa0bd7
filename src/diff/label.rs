//! Display strings for classified diff segments.

use super::classify::Classification;
use super::types::{Label, OperationKind};

pub const UNKNOWN_OPERATION: &str = "Unknown file operation";
pub const UNKNOWN_PATH_WITH_CHANGES: &str = "File: (unknown path, changes detected)";

/// Renders the label for a classification.
///
/// `has_changes` only matters when no path is known at all: it separates
/// "there are hunks but no header" from "there is nothing".
pub fn format_label(classification: &Classification, has_changes: bool) -> Label {
  let old = classification.old_path.as_ref();
  let new = classification.new_path.as_ref();

  let text = match (classification.operation, old, new) {
    (OperationKind::Create, _, Some(path)) => format!("Create: {path}"),
    (OperationKind::Delete, Some(path), _) => format!("Delete: {path}"),
    (OperationKind::Rename { similarity_percent }, Some(old), Some(new)) => {
      format!("{}: {old} -> {new}", two_path_verb("Rename", similarity_percent))
    },
    (OperationKind::Copy { similarity_percent }, Some(old), Some(new)) => {
      format!("{}: {old} -> {new}", two_path_verb("Copy", similarity_percent))
    },
    _ => match new.or(old) {
      Some(path) => format!("File: {path}"),
      None if has_changes => UNKNOWN_PATH_WITH_CHANGES.to_string(),
      None => UNKNOWN_OPERATION.to_string()
    }
  };

  Label::new(text)
}

fn two_path_verb(verb: &str, similarity_percent: Option<u8>) -> String {
  match similarity_percent {
    Some(percent) if percent < 100 => format!("{verb} with changes"),
    _ => verb.to_string()
  }
}
