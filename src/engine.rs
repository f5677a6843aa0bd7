//! The labelling pipeline.
//!
//! Parser record (optional) and raw segment text go through the adapter,
//! the extractor and the classifier, get a label, and finally pass through
//! the stabilizer so a segment never regresses while it is streaming.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::Settings;
use crate::diff::adapter::ParsedHint;
use crate::diff::classify::{classify, Classification};
use crate::diff::extract::{complete_lines, extract, has_hunks};
use crate::diff::label::format_label;
use crate::diff::parser::{parse_diff, split_segments, ParsedFile};
use crate::diff::types::{ConfidenceTier, DiffPath, Label, OperationKind};
use crate::stabilizer::{DiffSegmentKey, StabilizerEntry, StabilizerStore};

/// Whether the caller has seen all of the text yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextState {
  Complete,
  /// Still arriving; a final line without a newline may be cut mid-token and is ignored
  Streaming
}

impl TextState {
  fn visible<'a>(&self, raw: &'a str) -> &'a str {
    match self {
      TextState::Complete => raw,
      TextState::Streaming => complete_lines(raw)
    }
  }
}

/// The outcome for one segment, after stabilisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSegment {
  pub index:          usize,
  pub label:          Label,
  #[serde(flatten)]
  pub classification: Classification
}

impl ResolvedSegment {
  pub fn operation(&self) -> OperationKind {
    self.classification.operation
  }

  pub fn confidence(&self) -> ConfidenceTier {
    self.classification.confidence
  }

  pub fn target_path(&self) -> Option<&DiffPath> {
    self.classification.target_path()
  }
}

/// Classifies and labels a segment without touching any store.
///
/// The same `parsed` and `raw` always give the same entry.
pub fn describe(parsed: Option<&ParsedFile>, raw: &str) -> StabilizerEntry {
  let hint = parsed.map(ParsedHint::from);
  let extracted = extract(raw);
  let classification = classify(hint.as_ref(), &extracted);
  let has_changes = hint.as_ref().map(|hint| hint.has_hunks).unwrap_or(false) || has_hunks(raw);
  let label = format_label(&classification, has_changes);

  StabilizerEntry::new(label, classification)
}

pub struct LabelEngine {
  settings: Settings,
  store:    Arc<StabilizerStore>
}

impl LabelEngine {
  pub fn new(settings: Settings, store: Arc<StabilizerStore>) -> Self {
    Self { settings, store }
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn store(&self) -> &StabilizerStore {
    &self.store
  }

  /// Resolves one segment through the stabilizer.
  pub fn resolve(&self, index: usize, parsed: Option<&ParsedFile>, raw: &str, state: TextState) -> ResolvedSegment {
    let visible = state.visible(raw);
    let key = DiffSegmentKey::for_segment(index, visible, &self.settings);
    let candidate = describe(parsed, visible);
    let entry = self.store.stabilize(key, candidate);

    ResolvedSegment { index, label: entry.label, classification: entry.classification }
  }

  /// Splits a diff document into segments and resolves each one in order.
  pub fn label_document(&self, text: &str, state: TextState) -> Vec<ResolvedSegment> {
    let visible = state.visible(text);
    split_segments(visible)
      .into_iter()
      .enumerate()
      .map(|(index, segment)| self.resolve_segment(index, segment))
      .collect()
  }

  /// Same as [`LabelEngine::label_document`], with segments resolved on the rayon pool.
  pub fn label_document_parallel(&self, text: &str, state: TextState) -> Vec<ResolvedSegment> {
    let visible = state.visible(text);
    let segments = split_segments(visible);
    segments
      .par_iter()
      .enumerate()
      .map(|(index, segment)| self.resolve_segment(index, segment))
      .collect()
  }

  fn resolve_segment(&self, index: usize, segment: &str) -> ResolvedSegment {
    let parsed = match parse_diff(segment) {
      Ok(files) => {
        if files.len() > 1 {
          log::debug!("Segment {index} parsed into {} files, using the first", files.len());
        }
        files.into_iter().next()
      },
      Err(err) => {
        log::debug!("Falling back to raw-text heuristics for segment {index}: {err}");
        None
      }
    };

    // Text was already trimmed to what is visible
    self.resolve(index, parsed.as_ref(), segment, TextState::Complete)
  }
}
