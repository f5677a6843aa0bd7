//! Structured diff parsing.
//!
//! This is the "we already have a parsed file object" side of labelling: a
//! deliberately plain parser that turns diff text into [`ParsedFile`]
//! records. Its output is treated as untrusted by the rest of the crate.
//! In particular it reports [`FileKind::Modified`] when the two paths differ
//! but no `rename from`/`rename to` lines were seen, and it rejects hunk
//! headers it cannot read.

use serde::Serialize;
use thiserror::Error;

use super::extract::{parse_similarity, split_git_header_paths};
use super::types::{strip_git_prefix, unquote};

const PREVIEW_LIMIT: usize = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
  #[error("Malformed hunk header on line {line}: {text}")]
  MalformedHunkHeader { line: usize, text: String },

  #[error("Hunk on line {line} appears before any file header")]
  OrphanHunk { line: usize }
}

/// File type as declared by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
  Added,
  Deleted,
  Renamed,
  Copied,
  Modified,
  Binary
}

impl FileKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      FileKind::Added => "added",
      FileKind::Deleted => "deleted",
      FileKind::Renamed => "renamed",
      FileKind::Copied => "copied",
      FileKind::Modified => "modified",
      FileKind::Binary => "binary"
    }
  }
}

/// One `@@ -a,b +c,d @@` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
  pub header:    String,
  pub old_start: u32,
  pub old_lines: u32,
  pub new_start: u32,
  pub new_lines: u32,
  pub lines:     Vec<String>
}

/// A file record as produced by [`parse_diff`].
///
/// Paths are kept as the parser saw them: git prefixes are removed but the
/// `/dev/null` marker is left in place. `kind_declared` is false when no
/// extended header line named the kind and it was inferred from the paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFile {
  pub kind:          FileKind,
  pub kind_declared: bool,
  pub old_path:      Option<String>,
  pub new_path:      Option<String>,
  pub similarity:    Option<u8>,
  pub hunks:         Vec<Hunk>
}

impl ParsedFile {
  fn empty() -> Self {
    Self {
      kind:          FileKind::Modified,
      kind_declared: false,
      old_path:      None,
      new_path:      None,
      similarity:    None,
      hunks:         Vec::new()
    }
  }
}

// Per-file state that does not belong in the public record
#[derive(Debug)]
struct FileBuilder {
  file:           ParsedFile,
  declared_kind:  Option<FileKind>,
  saw_old_header: bool
}

impl FileBuilder {
  fn new() -> Self {
    Self { file: ParsedFile::empty(), declared_kind: None, saw_old_header: false }
  }

  fn declare(&mut self, kind: FileKind) {
    // Binary wins over anything seen earlier, otherwise first declaration sticks
    if kind == FileKind::Binary || self.declared_kind.is_none() {
      self.declared_kind = Some(kind);
    }
  }

  fn finish(self) -> ParsedFile {
    let mut file = self.file;
    let kind = match self.declared_kind {
      Some(kind) => kind,
      None if file.old_path.as_deref() == Some("/dev/null") => FileKind::Added,
      None if file.new_path.as_deref() == Some("/dev/null") => FileKind::Deleted,
      None => FileKind::Modified
    };
    file.kind = kind;
    file.kind_declared = self.declared_kind.is_some();
    file
  }
}

// Lines still owed to the open hunk
#[derive(Debug, Default, Clone, Copy)]
struct HunkBudget {
  old: u32,
  new: u32
}

impl HunkBudget {
  fn is_open(&self) -> bool {
    self.old > 0 || self.new > 0
  }

  /// Consumes one hunk line. Returns false when the line cannot belong to the hunk.
  fn consume(&mut self, line: &str) -> bool {
    match line.chars().next() {
      Some('+') => self.new = self.new.saturating_sub(1),
      Some('-') => self.old = self.old.saturating_sub(1),
      Some(' ') | None => {
        self.old = self.old.saturating_sub(1);
        self.new = self.new.saturating_sub(1);
      },
      Some('\\') => {},
      Some(_) => return false
    }
    true
  }
}

/// Parses the ranges of a hunk header: `@@ -1,5 +1,6 @@ fn main()`.
pub fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
  let body = line.strip_prefix("@@ ")?;
  let ranges = &body[..body.find(" @@")?];
  let mut parts = ranges.split_whitespace();

  let (old_start, old_lines) = parse_range(parts.next()?.strip_prefix('-')?)?;
  let (new_start, new_lines) = parse_range(parts.next()?.strip_prefix('+')?)?;
  Some((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
  match range.split_once(',') {
    Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
    None => Some((range.parse().ok()?, 1))
  }
}

// Handles various git prefixes (a/, b/, c/, i/, w/, o/)
fn strip_prefix(path: &str) -> String {
  let path = path.trim();
  let path = path.split('\t').next().unwrap_or(path);
  strip_git_prefix(unquote(path)).to_string()
}

/// Extracts the two paths from a "diff --git" line, which may contain spaces
fn paths_from_git_line(line: &str) -> (Option<String>, Option<String>) {
  let rest = line.strip_prefix("diff --git ").unwrap_or(line).trim();
  match split_git_header_paths(rest) {
    Some((old, new)) => (Some(strip_prefix(old)), Some(strip_prefix(new))),
    None => (None, None)
  }
}

/// Truncates text at a valid UTF-8 character boundary for log output
pub(crate) fn preview(text: &str, limit: usize) -> String {
  if text.len() <= limit {
    return text.to_string();
  }

  let truncated_index = text
    .char_indices()
    .take_while(|(i, _)| *i < limit)
    .last()
    .map(|(i, c)| i + c.len_utf8())
    .unwrap_or(0);

  format!("{}... (truncated)", &text[..truncated_index])
}

/// Parse diff text into file records.
///
/// Handles git diffs (with extended headers) and bare unified diffs, with
/// leading noise such as commit lines or prose before the first header.
///
/// # Arguments
/// * `diff_content` - Raw diff text, possibly still being streamed
///
/// # Returns
/// * `Result<Vec<ParsedFile>, ParseError>` - Parsed files; empty input yields no files
pub fn parse_diff(diff_content: &str) -> Result<Vec<ParsedFile>, ParseError> {
  log::debug!("Parsing diff with {} lines", diff_content.lines().count());
  if log::log_enabled!(log::Level::Trace) && !diff_content.is_empty() {
    log::trace!("Diff content preview: \n{}", preview(diff_content, PREVIEW_LIMIT));
  }

  let mut files = Vec::new();
  let mut current: Option<FileBuilder> = None;
  let mut budget = HunkBudget::default();
  let mut lines = diff_content.lines().map(|line| line.trim_end_matches('\r')).enumerate().peekable();

  while let Some((index, line)) = lines.next() {
    let number = index + 1;

    if budget.is_open() {
      if budget.consume(line) {
        if let Some(hunk) = current.as_mut().and_then(|builder| builder.file.hunks.last_mut()) {
          hunk.lines.push(line.to_string());
        }
        continue;
      }
      budget = HunkBudget::default();
    }

    if line.starts_with("diff --git ") {
      if let Some(builder) = current.take() {
        files.push(builder.finish());
      }
      let (old_path, new_path) = paths_from_git_line(line);
      let mut builder = FileBuilder::new();
      builder.file.old_path = old_path;
      builder.file.new_path = new_path;
      current = Some(builder);
    } else if line.starts_with("--- ") {
      let next_is_new_header = lines.peek().map(|(_, next)| next.starts_with("+++ ")).unwrap_or(false);
      let starts_new_file = match &current {
        None => true,
        Some(builder) => next_is_new_header && (builder.saw_old_header || !builder.file.hunks.is_empty())
      };
      if starts_new_file {
        if let Some(builder) = current.take() {
          files.push(builder.finish());
        }
      }
      let builder = current.get_or_insert_with(FileBuilder::new);
      builder.file.old_path = Some(strip_prefix(&line[4..]));
      builder.saw_old_header = true;
    } else if let Some(path) = line.strip_prefix("+++ ") {
      current.get_or_insert_with(FileBuilder::new).file.new_path = Some(strip_prefix(path));
    } else if line.starts_with("@@") {
      let Some(builder) = current.as_mut() else {
        return Err(ParseError::OrphanHunk { line: number });
      };
      let (old_start, old_lines, new_start, new_lines) = parse_hunk_header(line)
        .ok_or_else(|| ParseError::MalformedHunkHeader { line: number, text: line.to_string() })?;
      builder.file.hunks.push(Hunk {
        header: line.to_string(),
        old_start,
        old_lines,
        new_start,
        new_lines,
        lines: Vec::new()
      });
      budget = HunkBudget { old: old_lines, new: new_lines };
    } else if let Some(builder) = current.as_mut() {
      apply_extended_header(builder, line);
    }
  }

  if let Some(builder) = current {
    files.push(builder.finish());
  }

  log::debug!("Parsed {} files from diff", files.len());
  if log::log_enabled!(log::Level::Debug) {
    for (i, file) in files.iter().enumerate() {
      log::debug!(
        "File {}: {:?} -> {:?} ({}, {} hunks)",
        i,
        file.old_path,
        file.new_path,
        file.kind.as_str(),
        file.hunks.len()
      );
    }
  }

  Ok(files)
}

fn apply_extended_header(builder: &mut FileBuilder, line: &str) {
  if line.starts_with("new file mode") {
    builder.declare(FileKind::Added);
  } else if line.starts_with("deleted file mode") {
    builder.declare(FileKind::Deleted);
  } else if let Some(path) = line.strip_prefix("rename from ") {
    builder.declare(FileKind::Renamed);
    builder.file.old_path = Some(unquote(path.trim()).to_string());
  } else if let Some(path) = line.strip_prefix("rename to ") {
    builder.declare(FileKind::Renamed);
    builder.file.new_path = Some(unquote(path.trim()).to_string());
  } else if let Some(path) = line.strip_prefix("copy from ") {
    builder.declare(FileKind::Copied);
    builder.file.old_path = Some(unquote(path.trim()).to_string());
  } else if let Some(path) = line.strip_prefix("copy to ") {
    builder.declare(FileKind::Copied);
    builder.file.new_path = Some(unquote(path.trim()).to_string());
  } else if let Some(value) = line.strip_prefix("similarity index ") {
    builder.file.similarity = parse_similarity(value);
  } else if line.starts_with("Binary files") || line == "GIT binary patch" {
    builder.declare(FileKind::Binary);
  }
}

/// Splits a diff document into the raw text of each file segment.
///
/// A segment starts at a `diff --git` line, or at a `---` line directly
/// followed by `+++` once the current segment already has its own unified
/// header or hunks. Leading noise belongs to the first segment. Line
/// terminators are preserved so callers can tell a finished line from one
/// still being streamed.
pub fn split_segments(text: &str) -> Vec<&str> {
  let mut segments = Vec::new();
  let mut start = 0;
  let mut offset = 0;
  let mut seen_header = false;
  let mut seen_old_header = false;
  let mut seen_hunk = false;
  let mut budget = HunkBudget::default();
  let mut lines = text.split_inclusive('\n').peekable();

  while let Some(raw_line) = lines.next() {
    let line = raw_line.trim_end_matches(|c| c == '\n' || c == '\r');
    let line_start = offset;
    offset += raw_line.len();

    if budget.is_open() {
      if budget.consume(line) {
        continue;
      }
      budget = HunkBudget::default();
    }

    let boundary = if line.starts_with("diff --git ") {
      seen_header
    } else if line.starts_with("--- ") {
      let next_is_new_header = lines.peek().map(|next| next.starts_with("+++ ")).unwrap_or(false);
      next_is_new_header && (seen_old_header || seen_hunk)
    } else {
      false
    };

    if boundary {
      segments.push(&text[start..line_start]);
      start = line_start;
      seen_old_header = false;
      seen_hunk = false;
    }

    if line.starts_with("diff --git ") || line.starts_with("+++ ") {
      seen_header = true;
    } else if line.starts_with("--- ") {
      seen_header = true;
      seen_old_header = true;
    } else if line.starts_with("@@") {
      seen_header = true;
      seen_hunk = true;
      if let Some((_, old_lines, _, new_lines)) = parse_hunk_header(line) {
        budget = HunkBudget { old: old_lines, new: new_lines };
      }
    }
  }

  if start < text.len() {
    segments.push(&text[start..]);
  }

  segments
}
