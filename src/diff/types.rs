//! Closed types shared by the extractor, classifier and formatter.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The device-null marker used by diff headers for "no file on this side"
pub const DEV_NULL: &str = "/dev/null";

// Conventional git prefixes, including the mnemonic ones (c/ i/ w/ o/)
const GIT_PREFIXES: [&str; 6] = ["a/", "b/", "c/", "i/", "w/", "o/"];

/// A non-empty file path taken from a diff header.
///
/// The device-null sentinel never becomes a `DiffPath`; constructors
/// return `None` for it so "no file" is always `Option::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffPath(String);

impl DiffPath {
  /// Builds a path from text that has already had its git prefix removed.
  pub fn new(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_null_sentinel(trimmed) {
      return None;
    }
    Some(Self(trimmed.to_string()))
  }

  /// Builds a path from a header token, stripping one `a/`-style prefix.
  ///
  /// The null check runs on the token both before and after stripping, so
  /// `/dev/null` and `a//dev/null` yield `None`. `b/dev/null` is the repo
  /// path `dev/null` and is kept.
  pub fn from_header(raw: &str) -> Option<Self> {
    let trimmed = unquote(raw.trim());
    if is_null_sentinel(trimmed) {
      return None;
    }
    Self::new(strip_git_prefix(trimmed))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Display for DiffPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// True for the null sentinel with or without a git prefix in front of it.
pub fn is_null_sentinel(raw: &str) -> bool {
  let trimmed = raw.trim();
  if trimmed == DEV_NULL {
    return true;
  }

  GIT_PREFIXES.iter().any(|prefix| {
    trimmed
      .strip_prefix(prefix)
      .map(|rest| rest == DEV_NULL)
      .unwrap_or(false)
  })
}

/// Removes a single conventional git prefix (`a/`, `b/`, ...) if present.
pub fn strip_git_prefix(raw: &str) -> &str {
  GIT_PREFIXES
    .iter()
    .find_map(|prefix| raw.strip_prefix(prefix))
    .filter(|rest| !rest.is_empty())
    .unwrap_or(raw)
}

/// Drops the surrounding quotes git adds to paths with unusual characters.
pub fn unquote(raw: &str) -> &str {
  raw
    .strip_prefix('"')
    .and_then(|rest| rest.strip_suffix('"'))
    .unwrap_or(raw)
}

/// What happened to the file a diff segment describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
  Create,
  Delete,
  Rename { similarity_percent: Option<u8> },
  Copy { similarity_percent: Option<u8> },
  Modify,
  Unknown
}

impl OperationKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      OperationKind::Create => "create",
      OperationKind::Delete => "delete",
      OperationKind::Rename { .. } => "rename",
      OperationKind::Copy { .. } => "copy",
      OperationKind::Modify => "modify",
      OperationKind::Unknown => "unknown"
    }
  }

  /// Similarity carried by a rename or copy, if any.
  pub fn similarity(&self) -> Option<u8> {
    match self {
      OperationKind::Rename { similarity_percent } | OperationKind::Copy { similarity_percent } => *similarity_percent,
      _ => None
    }
  }

  /// Same variant with its similarity replaced. Other variants are returned unchanged.
  pub fn with_similarity(self, similarity: Option<u8>) -> Self {
    match self {
      OperationKind::Rename { .. } => OperationKind::Rename { similarity_percent: similarity },
      OperationKind::Copy { .. } => OperationKind::Copy { similarity_percent: similarity },
      other => other
    }
  }
}

/// How much a classification can be trusted, lowest first.
///
/// The derived ordering is what the stabilizer compares: a stored label is
/// only replaced by a candidate with a strictly greater tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
  Unknown,
  UnifiedHeaderFallback,
  ContentMarkerMatch,
  GitHeaderMatch,
  RenameMarkerMatch,
  ExplicitParsedType
}

/// Paths and operation hint pulled out of raw diff text.
///
/// `hinted_operation` is only ever `Some` when at least one path is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPaths {
  pub old_path:         Option<DiffPath>,
  pub new_path:         Option<DiffPath>,
  pub hinted_operation: Option<OperationKind>,
  pub confidence:       ConfidenceTier
}

impl Default for ExtractedPaths {
  fn default() -> Self {
    Self { old_path: None, new_path: None, hinted_operation: None, confidence: ConfidenceTier::Unknown }
  }
}

impl ExtractedPaths {
  pub fn is_empty(&self) -> bool {
    self.old_path.is_none() && self.new_path.is_none()
  }
}

/// The display string for one diff segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
  pub(crate) fn new(text: String) -> Self {
    Self(text)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl PartialEq<&str> for Label {
  fn eq(&self, other: &&str) -> bool {
    self.0 == *other
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_null_sentinel_normalizes_to_none() {
    assert_eq!(DiffPath::from_header("/dev/null"), None);
    assert_eq!(DiffPath::from_header("a//dev/null"), None);
    assert_eq!(DiffPath::from_header("  /dev/null  "), None);
    assert_eq!(DiffPath::new("/dev/null"), None);
  }

  #[test]
  fn test_repo_path_named_dev_null_is_kept() {
    assert_eq!(DiffPath::from_header("b/dev/null").unwrap().as_str(), "dev/null");
    assert!(!is_null_sentinel("a/dev/null"));
    assert!(is_null_sentinel("a//dev/null"));
  }

  #[test]
  fn test_absolute_paths_are_kept() {
    let path = DiffPath::from_header("/etc/hosts").unwrap();
    assert_eq!(path.as_str(), "/etc/hosts");
  }

  #[test]
  fn test_prefix_is_stripped_once() {
    assert_eq!(DiffPath::from_header("b/src/main.rs").unwrap().as_str(), "src/main.rs");
    assert_eq!(DiffPath::from_header("a/b/nested.rs").unwrap().as_str(), "b/nested.rs");
    assert_eq!(DiffPath::from_header("i/test.md").unwrap().as_str(), "test.md");
    assert_eq!(DiffPath::from_header("\"b/with space.txt\"").unwrap().as_str(), "with space.txt");
  }

  #[test]
  fn test_empty_path_is_none() {
    assert_eq!(DiffPath::new(""), None);
    assert_eq!(DiffPath::from_header("   "), None);
  }

  #[test]
  fn test_confidence_ordering() {
    assert!(ConfidenceTier::ExplicitParsedType > ConfidenceTier::RenameMarkerMatch);
    assert!(ConfidenceTier::RenameMarkerMatch > ConfidenceTier::GitHeaderMatch);
    assert!(ConfidenceTier::GitHeaderMatch > ConfidenceTier::ContentMarkerMatch);
    assert!(ConfidenceTier::ContentMarkerMatch > ConfidenceTier::UnifiedHeaderFallback);
    assert!(ConfidenceTier::UnifiedHeaderFallback > ConfidenceTier::Unknown);
  }

  #[test]
  fn test_similarity_accessors() {
    let rename = OperationKind::Rename { similarity_percent: None }.with_similarity(Some(90));
    assert_eq!(rename.similarity(), Some(90));
    assert_eq!(OperationKind::Modify.with_similarity(Some(50)), OperationKind::Modify);
    assert_eq!(OperationKind::Create.similarity(), None);
  }
}
