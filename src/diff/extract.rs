//! Path extraction from raw diff-segment text.
//!
//! Three scanners read the header region of a segment (everything before
//! the first `@@` hunk line): the `diff --git` line, git extended-header
//! markers, and the unified `---`/`+++` pair. Their evidence is then run
//! through an ordered table of decision rules; the first rule that yields a
//! result wins. Nothing in here fails: missing information is `None`.

use super::types::{strip_git_prefix, unquote, ConfidenceTier, DiffPath, ExtractedPaths, OperationKind};

const GIT_HEADER: &str = "diff --git ";
const NEW_FILE_MODE: &str = "new file mode";
const DELETED_FILE_MODE: &str = "deleted file mode";
const RENAME_FROM: &str = "rename from ";
const RENAME_TO: &str = "rename to ";
const COPY_FROM: &str = "copy from ";
const COPY_TO: &str = "copy to ";
const SIMILARITY_INDEX: &str = "similarity index ";
const OLD_HEADER: &str = "--- ";
const NEW_HEADER: &str = "+++ ";
const HUNK_HEADER: &str = "@@";

/// Paths found on a `diff --git a/<old> b/<new>` line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHeader {
  pub old: Option<DiffPath>,
  pub new: Option<DiffPath>
}

/// Git extended-header lines seen before the first hunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentMarkers {
  pub new_file:     bool,
  pub deleted_file: bool,
  pub rename_from:  Option<DiffPath>,
  pub rename_to:    Option<DiffPath>,
  pub copy_from:    Option<DiffPath>,
  pub copy_to:      Option<DiffPath>,
  pub similarity:   Option<u8>
}

/// First `---` and `+++` lines.
///
/// The outer `Option` records whether the line was seen at all, the inner
/// one whether it named a file (`/dev/null` does not).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedHeader {
  pub old: Option<Option<DiffPath>>,
  pub new: Option<Option<DiffPath>>
}

/// Everything the scanners found in one segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderEvidence {
  pub git:     Option<GitHeader>,
  pub markers: ContentMarkers,
  pub unified: UnifiedHeader
}

type DecisionRule = fn(&HeaderEvidence) -> Option<ExtractedPaths>;

// Precedence, highest first
const DECISION_RULES: [(&str, DecisionRule); 5] = [
  ("rename-copy-markers", decide_from_rename_markers),
  ("git-header-rename", decide_from_git_rename),
  ("file-mode-markers", decide_from_file_mode_markers),
  ("similarity-marker", decide_from_similarity),
  ("unified-header", decide_from_unified_header)
];

/// Extracts paths and an operation hint from a diff segment.
pub fn extract(raw: &str) -> ExtractedPaths {
  let evidence = scan(raw);

  for (name, rule) in DECISION_RULES.iter() {
    if let Some(extracted) = rule(&evidence) {
      log::trace!("Extraction rule {name} matched: {:?}", extracted.hinted_operation);
      return extracted;
    }
  }

  let (old_path, new_path) = identity_paths(&evidence);
  ExtractedPaths { old_path, new_path, hinted_operation: None, confidence: ConfidenceTier::Unknown }
}

/// Runs all three scanners over the header region of `raw`.
pub fn scan(raw: &str) -> HeaderEvidence {
  let lines: Vec<&str> = header_lines(raw).collect();

  HeaderEvidence {
    git:     scan_git_header(&lines),
    markers: scan_content_markers(&lines),
    unified: scan_unified_header(&lines)
  }
}

/// The paths a segment announces itself with, independent of what operation it turns out to be.
///
/// Uses the `diff --git` line when there is one and the unified header
/// otherwise, so the result stays the same while later header lines stream in.
pub fn header_paths(raw: &str) -> (Option<DiffPath>, Option<DiffPath>) {
  identity_paths(&scan(raw))
}

/// The prefix of `raw` made of newline-terminated lines only.
pub fn complete_lines(raw: &str) -> &str {
  match raw.rfind('\n') {
    Some(end) => &raw[..=end],
    None => ""
  }
}

/// True when the text contains at least one hunk header.
pub fn has_hunks(raw: &str) -> bool {
  raw.lines().any(|line| line.starts_with(HUNK_HEADER))
}

fn header_lines(raw: &str) -> impl Iterator<Item = &str> {
  raw
    .lines()
    .map(|line| line.trim_end_matches('\r'))
    .take_while(|line| !line.starts_with(HUNK_HEADER))
}

fn identity_paths(evidence: &HeaderEvidence) -> (Option<DiffPath>, Option<DiffPath>) {
  match &evidence.git {
    Some(git) if git.old.is_some() || git.new.is_some() => (git.old.clone(), git.new.clone()),
    _ => (evidence.unified.old.clone().flatten(), evidence.unified.new.clone().flatten())
  }
}

pub fn scan_git_header(lines: &[&str]) -> Option<GitHeader> {
  lines.iter().find_map(|line| parse_git_header(line))
}

fn parse_git_header(line: &str) -> Option<GitHeader> {
  let rest = line.strip_prefix(GIT_HEADER)?.trim();
  let (old, new) = split_git_header_paths(rest)?;
  Some(GitHeader { old: DiffPath::from_header(old), new: DiffPath::from_header(new) })
}

// "a/x b/y" is ambiguous when paths contain spaces, so prefer the split
// where both sides name the same file, then the one before " b/".
pub(crate) fn split_git_header_paths(rest: &str) -> Option<(&str, &str)> {
  if rest.starts_with('"') {
    let close = rest[1..].find('"')? + 1;
    let (old, new) = rest.split_at(close + 1);
    let new = new.trim_start();
    return (!new.is_empty()).then_some((old, new));
  }

  if rest.ends_with('"') {
    if let Some(split) = rest.rfind(" \"") {
      return Some((&rest[..split], &rest[split + 1..]));
    }
  }

  let spaces: Vec<usize> = rest.match_indices(' ').map(|(index, _)| index).collect();

  let symmetric = spaces.iter().find(|&&index| {
    let (old, new) = (&rest[..index], &rest[index + 1..]);
    strip_git_prefix(old) == strip_git_prefix(new)
  });

  symmetric
    .copied()
    .or_else(|| rest.find(" b/"))
    .or_else(|| spaces.first().copied())
    .map(|index| (&rest[..index], &rest[index + 1..]))
    .filter(|(old, new)| !old.is_empty() && !new.is_empty())
}

pub fn scan_content_markers(lines: &[&str]) -> ContentMarkers {
  let mut markers = ContentMarkers::default();

  for line in lines {
    if line.starts_with(NEW_FILE_MODE) {
      markers.new_file = true;
    } else if line.starts_with(DELETED_FILE_MODE) {
      markers.deleted_file = true;
    } else if let Some(path) = line.strip_prefix(RENAME_FROM) {
      markers.rename_from = markers.rename_from.take().or_else(|| marker_path(path));
    } else if let Some(path) = line.strip_prefix(RENAME_TO) {
      markers.rename_to = markers.rename_to.take().or_else(|| marker_path(path));
    } else if let Some(path) = line.strip_prefix(COPY_FROM) {
      markers.copy_from = markers.copy_from.take().or_else(|| marker_path(path));
    } else if let Some(path) = line.strip_prefix(COPY_TO) {
      markers.copy_to = markers.copy_to.take().or_else(|| marker_path(path));
    } else if let Some(value) = line.strip_prefix(SIMILARITY_INDEX) {
      markers.similarity = markers.similarity.or_else(|| parse_similarity(value));
    }
  }

  markers
}

fn marker_path(raw: &str) -> Option<DiffPath> {
  DiffPath::new(unquote(raw.trim()))
}

/// Parses the value of a `similarity index 87%` line.
pub fn parse_similarity(value: &str) -> Option<u8> {
  value
    .trim()
    .trim_end_matches('%')
    .parse::<u8>()
    .ok()
    .map(|percent| percent.min(100))
}

pub fn scan_unified_header(lines: &[&str]) -> UnifiedHeader {
  let mut header = UnifiedHeader::default();

  for line in lines {
    if header.old.is_none() {
      if let Some(value) = line.strip_prefix(OLD_HEADER) {
        header.old = Some(unified_path(value));
        continue;
      }
    }
    if header.new.is_none() {
      if let Some(value) = line.strip_prefix(NEW_HEADER) {
        header.new = Some(unified_path(value));
      }
    }
  }

  header
}

// `--- a/foo.rs\t2024-01-01 10:00:00` carries a timestamp after a tab
fn unified_path(value: &str) -> Option<DiffPath> {
  let path = value.split('\t').next().unwrap_or(value);
  DiffPath::from_header(path)
}

fn distinct(old: &Option<DiffPath>, new: &Option<DiffPath>) -> Option<(DiffPath, DiffPath)> {
  match (old, new) {
    (Some(old), Some(new)) if old != new => Some((old.clone(), new.clone())),
    _ => None
  }
}

fn decide_from_rename_markers(evidence: &HeaderEvidence) -> Option<ExtractedPaths> {
  let markers = &evidence.markers;
  let similarity_percent = markers.similarity;

  let (operation, (old, new)) = match distinct(&markers.rename_from, &markers.rename_to) {
    Some(paths) => (OperationKind::Rename { similarity_percent }, paths),
    None => (OperationKind::Copy { similarity_percent }, distinct(&markers.copy_from, &markers.copy_to)?)
  };

  Some(ExtractedPaths {
    old_path:         Some(old),
    new_path:         Some(new),
    hinted_operation: Some(operation),
    confidence:       ConfidenceTier::RenameMarkerMatch
  })
}

fn decide_from_git_rename(evidence: &HeaderEvidence) -> Option<ExtractedPaths> {
  let git = evidence.git.as_ref()?;
  let (old, new) = distinct(&git.old, &git.new)?;
  let markers = &evidence.markers;

  let operation = if markers.copy_from.is_some() || markers.copy_to.is_some() {
    OperationKind::Copy { similarity_percent: markers.similarity }
  } else {
    OperationKind::Rename { similarity_percent: markers.similarity }
  };

  Some(ExtractedPaths {
    old_path:         Some(old),
    new_path:         Some(new),
    hinted_operation: Some(operation),
    confidence:       ConfidenceTier::GitHeaderMatch
  })
}

fn decide_from_file_mode_markers(evidence: &HeaderEvidence) -> Option<ExtractedPaths> {
  let markers = &evidence.markers;
  let git = evidence.git.clone().unwrap_or_default();

  if markers.new_file {
    let new_path = evidence.unified.new.clone().flatten().or(git.new);
    if new_path.is_some() {
      return Some(ExtractedPaths {
        old_path: None,
        new_path,
        hinted_operation: Some(OperationKind::Create),
        confidence: ConfidenceTier::ContentMarkerMatch
      });
    }
  }

  if markers.deleted_file {
    let old_path = evidence.unified.old.clone().flatten().or(git.old);
    if old_path.is_some() {
      return Some(ExtractedPaths {
        old_path,
        new_path: None,
        hinted_operation: Some(OperationKind::Delete),
        confidence: ConfidenceTier::ContentMarkerMatch
      });
    }
  }

  None
}

fn decide_from_similarity(evidence: &HeaderEvidence) -> Option<ExtractedPaths> {
  let similarity_percent = evidence.markers.similarity?;
  let (old, new) = distinct(&evidence.unified.old.clone().flatten(), &evidence.unified.new.clone().flatten())?;

  Some(ExtractedPaths {
    old_path:         Some(old),
    new_path:         Some(new),
    hinted_operation: Some(OperationKind::Rename { similarity_percent: Some(similarity_percent) }),
    confidence:       ConfidenceTier::ContentMarkerMatch
  })
}

fn decide_from_unified_header(evidence: &HeaderEvidence) -> Option<ExtractedPaths> {
  let (Some(old), Some(new)) = (&evidence.unified.old, &evidence.unified.new) else {
    return None;
  };

  let operation = match (old, new) {
    (None, Some(_)) => OperationKind::Create,
    (Some(_), None) => OperationKind::Delete,
    (Some(old), Some(new)) if old == new => OperationKind::Modify,
    (Some(_), Some(_)) => OperationKind::Rename { similarity_percent: None },
    (None, None) => return None
  };

  Some(ExtractedPaths {
    old_path:         old.clone(),
    new_path:         new.clone(),
    hinted_operation: Some(operation),
    confidence:       ConfidenceTier::UnifiedHeaderFallback
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn path(raw: &str) -> Option<DiffPath> {
    DiffPath::new(raw)
  }

  #[test]
  fn test_git_header_with_equal_paths_sets_no_hint() {
    let extracted = extract("diff --git a/x.py b/x.py\n");
    assert_eq!(extracted.old_path, path("x.py"));
    assert_eq!(extracted.new_path, path("x.py"));
    assert_eq!(extracted.hinted_operation, None);
    assert_eq!(extracted.confidence, ConfidenceTier::Unknown);
  }

  #[test]
  fn test_git_header_with_distinct_paths_is_rename() {
    let extracted = extract("diff --git a/a.py b/b.py\n");
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Rename { similarity_percent: None }));
    assert_eq!(extracted.confidence, ConfidenceTier::GitHeaderMatch);
  }

  #[test]
  fn test_git_header_after_leading_noise() {
    let extracted = extract("Here is the change you asked for:\n\ndiff --git a/lib.rs b/lib.rs\n--- a/lib.rs\n+++ b/lib.rs\n");
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Modify));
    assert_eq!(extracted.new_path, path("lib.rs"));
  }

  #[test]
  fn test_git_header_with_spaces_in_path() {
    let header = parse_git_header("diff --git a/my file.txt b/my file.txt").unwrap();
    assert_eq!(header.old, path("my file.txt"));
    assert_eq!(header.new, path("my file.txt"));
  }

  #[test]
  fn test_git_header_with_quoted_paths() {
    let header = parse_git_header("diff --git \"a/old name.txt\" \"b/new name.txt\"").unwrap();
    assert_eq!(header.old, path("old name.txt"));
    assert_eq!(header.new, path("new name.txt"));
  }

  #[test]
  fn test_truncated_git_header_has_no_paths() {
    assert_eq!(parse_git_header("diff --git a/foo.py"), None);
  }

  #[test]
  fn test_rename_markers_override_git_paths() {
    let raw = "diff --git a/src/a.py b/src/b.py\nsimilarity index 87%\nrename from src/a.py\nrename to src/b.py\n";
    let extracted = extract(raw);
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Rename { similarity_percent: Some(87) }));
    assert_eq!(extracted.old_path, path("src/a.py"));
    assert_eq!(extracted.new_path, path("src/b.py"));
    assert_eq!(extracted.confidence, ConfidenceTier::RenameMarkerMatch);
  }

  #[test]
  fn test_copy_markers() {
    let raw = "diff --git a/base.rs b/copy.rs\nsimilarity index 100%\ncopy from base.rs\ncopy to copy.rs\n";
    let extracted = extract(raw);
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Copy { similarity_percent: Some(100) }));
  }

  #[test]
  fn test_new_file_mode_is_create() {
    let raw = "diff --git a/new.rs b/new.rs\nnew file mode 100644\n";
    let extracted = extract(raw);
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Create));
    assert_eq!(extracted.old_path, None);
    assert_eq!(extracted.new_path, path("new.rs"));
    assert_eq!(extracted.confidence, ConfidenceTier::ContentMarkerMatch);
  }

  #[test]
  fn test_deleted_file_mode_is_delete() {
    let raw = "diff --git a/old.rs b/old.rs\ndeleted file mode 100644\n--- a/old.rs\n+++ /dev/null\n";
    let extracted = extract(raw);
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Delete));
    assert_eq!(extracted.old_path, path("old.rs"));
    assert_eq!(extracted.new_path, None);
  }

  #[test]
  fn test_marker_without_any_path_has_no_hint() {
    let extracted = extract("new file mode 100644\n");
    assert_eq!(extracted.hinted_operation, None);
    assert!(extracted.is_empty());
  }

  #[test]
  fn test_similarity_alone_uses_unified_paths() {
    let raw = "similarity index 70%\n--- a/one.rs\n+++ b/two.rs\n";
    let extracted = extract(raw);
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Rename { similarity_percent: Some(70) }));
    assert_eq!(extracted.confidence, ConfidenceTier::ContentMarkerMatch);
  }

  #[test]
  fn test_unified_header_inference() {
    let create = extract("--- /dev/null\n+++ b/new.py\n");
    assert_eq!(create.hinted_operation, Some(OperationKind::Create));
    assert_eq!(create.old_path, None);

    let delete = extract("--- a/gone.py\n+++ /dev/null\n");
    assert_eq!(delete.hinted_operation, Some(OperationKind::Delete));
    assert_eq!(delete.new_path, None);

    let modify = extract("--- a/same.py\n+++ b/same.py\n");
    assert_eq!(modify.hinted_operation, Some(OperationKind::Modify));

    let rename = extract("--- a/one.py\n+++ b/two.py\n");
    assert_eq!(rename.hinted_operation, Some(OperationKind::Rename { similarity_percent: None }));
    assert_eq!(rename.confidence, ConfidenceTier::UnifiedHeaderFallback);
  }

  #[test]
  fn test_unified_header_keeps_absolute_paths() {
    let extracted = extract("--- /etc/hosts\n+++ /etc/hosts\n");
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Modify));
    assert_eq!(extracted.old_path, path("/etc/hosts"));
  }

  #[test]
  fn test_unified_header_strips_timestamps() {
    let extracted = extract("--- a/foo.c\t2024-01-01 10:00:00\n+++ b/foo.c\t2024-01-02 10:00:00\n");
    assert_eq!(extracted.new_path, path("foo.c"));
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Modify));
  }

  #[test]
  fn test_half_unified_header_has_no_hint() {
    let extracted = extract("--- /dev/null\n");
    assert_eq!(extracted.hinted_operation, None);
    assert_eq!(extracted.confidence, ConfidenceTier::Unknown);
  }

  #[test]
  fn test_lines_after_first_hunk_are_ignored() {
    let raw = "--- a/doc.md\n+++ b/doc.md\n@@ -1,2 +1,2 @@\n-new file mode 100644\n+deleted file mode 100644\n";
    let extracted = extract(raw);
    assert_eq!(extracted.hinted_operation, Some(OperationKind::Modify));
  }

  #[test]
  fn test_null_sentinel_on_either_side() {
    for raw in ["--- /dev/null\n+++ b/f.rs\n", "--- a//dev/null\n+++ b/f.rs\n"] {
      assert_eq!(extract(raw).old_path, None, "{raw:?}");
    }
    for raw in ["--- a/f.rs\n+++ /dev/null\n", "--- a/f.rs\n+++ b//dev/null\n"] {
      assert_eq!(extract(raw).new_path, None, "{raw:?}");
    }

    let renamed = extract("--- a/dev/null\n+++ b/f.rs\n");
    assert_eq!(renamed.old_path, path("dev/null"));
    assert_eq!(renamed.hinted_operation, Some(OperationKind::Rename { similarity_percent: None }));
  }

  #[test]
  fn test_parse_similarity() {
    assert_eq!(parse_similarity("87%"), Some(87));
    assert_eq!(parse_similarity(" 100% "), Some(100));
    assert_eq!(parse_similarity("abc"), None);
    assert_eq!(parse_similarity(""), None);
  }

  #[test]
  fn test_complete_lines() {
    assert_eq!(complete_lines("a\nb\n+++ b/ne"), "a\nb\n");
    assert_eq!(complete_lines("a\n"), "a\n");
    assert_eq!(complete_lines("partial"), "");
  }

  #[test]
  fn test_header_paths_prefers_git_line() {
    let raw = "diff --git a/x.py b/x.py\nnew file mode 100644\n--- /dev/null\n+++ b/x.py\n";
    assert_eq!(header_paths(raw), (path("x.py"), path("x.py")));
    assert_eq!(header_paths("--- /dev/null\n+++ b/y.py\n"), (None, path("y.py")));
  }

  #[test]
  fn test_empty_input() {
    assert_eq!(extract(""), ExtractedPaths::default());
  }
}
