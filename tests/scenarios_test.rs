mod common;

use common::*;
use difflabel::diff::{Hunk, FileKind, ParsedFile};
use difflabel::{describe, ConfidenceTier, OperationKind, TextState};

#[test]
fn test_modify_with_git_header() {
  assert_eq!(describe(None, MODIFY_DIFF).label, "File: foo.py");

  let segments = engine().label_document(MODIFY_DIFF, TextState::Complete);
  assert_eq!(segments.len(), 1);
  assert_eq!(segments[0].label, "File: foo.py");
  assert_eq!(segments[0].operation(), OperationKind::Modify);
}

#[test]
fn test_create_from_dev_null() {
  assert_eq!(describe(None, CREATE_DIFF).label, "Create: new.py");

  let segments = engine().label_document(CREATE_DIFF, TextState::Complete);
  assert_eq!(segments[0].label, "Create: new.py");
  assert_eq!(segments[0].classification.old_path, None);
}

#[test]
fn test_delete_with_marker() {
  assert_eq!(describe(None, DELETE_DIFF).label, "Delete: old.py");

  let segments = engine().label_document(DELETE_DIFF, TextState::Complete);
  assert_eq!(segments[0].label, "Delete: old.py");
  assert_eq!(segments[0].confidence(), ConfidenceTier::ExplicitParsedType);
}

#[test]
fn test_rename_without_hunks() {
  assert_eq!(describe(None, RENAME_DIFF).label, "Rename with changes: a.py -> b.py");

  let segments = engine().label_document(RENAME_DIFF, TextState::Streaming);
  assert_eq!(segments[0].label, "Rename with changes: a.py -> b.py");
  assert_eq!(segments[0].operation(), OperationKind::Rename { similarity_percent: Some(87) });
}

#[test]
fn test_hunks_without_headers() {
  let record = ParsedFile {
    kind:          FileKind::Modified,
    kind_declared: true,
    old_path:      None,
    new_path:      None,
    similarity:    None,
    hunks:         vec![Hunk {
      header:    "@@ -1 +1 @@".to_string(),
      old_start: 1,
      old_lines: 1,
      new_start: 1,
      new_lines: 1,
      lines:     vec!["-a".to_string(), "+b".to_string()]
    }]
  };

  assert_eq!(describe(Some(&record), "garbled output\n").label, "File: (unknown path, changes detected)");
}

#[test]
fn test_empty_input() {
  let entry = describe(None, "");
  assert_eq!(entry.label, "Unknown file operation");
  assert_eq!(entry.confidence(), ConfidenceTier::Unknown);
}

#[test]
fn test_differing_paths_outrank_declared_modify() {
  let record = ParsedFile {
    kind:          FileKind::Modified,
    kind_declared: true,
    old_path:      Some("x.py".to_string()),
    new_path:      Some("y.py".to_string()),
    similarity:    None,
    hunks:         Vec::new()
  };

  let entry = describe(Some(&record), "diff --git a/x.py b/y.py\n");
  assert_eq!(entry.classification.operation, OperationKind::Rename { similarity_percent: None });
  assert_eq!(entry.label, "Rename: x.py -> y.py");
}

#[test]
fn test_git_rename_beats_parser_that_lost_the_paths() {
  let record = ParsedFile {
    kind:          FileKind::Modified,
    kind_declared: true,
    old_path:      None,
    new_path:      None,
    similarity:    None,
    hunks:         Vec::new()
  };

  let entry = describe(Some(&record), "diff --git a/x.py b/y.py\n");
  assert!(matches!(entry.classification.operation, OperationKind::Rename { .. }));
}

#[test]
fn test_null_sentinel_on_one_side() {
  let creates = ["--- /dev/null\n+++ b/n.py\n", "--- a//dev/null\n+++ b/n.py\n"];
  for raw in creates {
    let entry = describe(None, raw);
    assert_eq!(entry.classification.old_path, None, "{raw:?}");
    assert_eq!(entry.label, "Create: n.py", "{raw:?}");
  }

  let deletes = ["--- a/n.py\n+++ /dev/null\n", "--- a/n.py\n+++ b//dev/null\n"];
  for raw in deletes {
    let entry = describe(None, raw);
    assert_eq!(entry.classification.new_path, None, "{raw:?}");
    assert_eq!(entry.label, "Delete: n.py", "{raw:?}");
  }
}

#[test]
fn test_repo_directory_named_dev_is_a_real_path() {
  let raw = "--- a/dev/null\n+++ b/dev/null\n@@ -1 +1 @@\n-a\n+b\n";
  assert_eq!(describe(None, raw).label, "File: dev/null");

  let segments = engine().label_document(raw, TextState::Complete);
  assert_eq!(segments[0].label, "File: dev/null");
  assert_eq!(segments[0].operation(), OperationKind::Modify);
}

#[test]
fn test_git_header_path_with_spaces() {
  let raw = "diff --git a/my file.txt b/my file.txt\nnew file mode 100644\n";
  assert_eq!(describe(None, raw).label, "Create: my file.txt");

  let segments = engine().label_document(raw, TextState::Complete);
  assert_eq!(segments[0].label, "Create: my file.txt");
  assert_eq!(segments[0].operation(), OperationKind::Create);
}

#[test]
fn test_labels_are_deterministic_outside_the_stabilizer() {
  for raw in [MODIFY_DIFF, CREATE_DIFF, DELETE_DIFF, RENAME_DIFF, GIT_CREATE_DIFF, MIXED_DOCUMENT, ""] {
    assert_eq!(describe(None, raw), describe(None, raw));
    assert_eq!(
      engine().label_document(raw, TextState::Complete),
      engine().label_document(raw, TextState::Complete)
    );
  }
}
