//! Anti-flicker store for streamed diff segments.
//!
//! The same segment is re-classified on every render while its text grows.
//! A label, once shown, is only replaced by a classification of strictly
//! higher confidence. The store has no expiry; it lives as long as its
//! owner (one per rendering session) and is cleared with [`StabilizerStore::reset`].

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::config::{KeyStrategy, Settings};
use crate::diff::classify::Classification;
use crate::diff::extract::{complete_lines, header_paths};
use crate::diff::types::{ConfidenceTier, DiffPath, Label};

/// Identity of one logical diff segment across repeated renders.
///
/// Computed from inputs only: the segment index, the paths the segment
/// announces in its header, and its first complete line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiffSegmentKey {
  Prefix {
    index:    usize,
    old_path: String,
    new_path: String,
    text:     String
  },
  Digest {
    index:  usize,
    digest: u64
  }
}

impl DiffSegmentKey {
  pub fn for_segment(index: usize, raw: &str, settings: &Settings) -> Self {
    let complete = complete_lines(raw);
    let (old_path, new_path) = header_paths(complete);
    let first_line = complete.lines().next().unwrap_or_default();

    match settings.key_strategy {
      KeyStrategy::Prefix => DiffSegmentKey::Prefix {
        index,
        old_path: path_prefix(old_path.as_ref(), settings.key_path_prefix),
        new_path: path_prefix(new_path.as_ref(), settings.key_path_prefix),
        text: char_prefix(first_line, settings.key_text_prefix)
      },
      KeyStrategy::Digest => {
        let mut identity = String::with_capacity(first_line.len() + 64);
        for part in [old_path.as_ref().map(DiffPath::as_str), new_path.as_ref().map(DiffPath::as_str), Some(first_line)] {
          identity.push_str(part.unwrap_or_default());
          identity.push('\0');
        }
        DiffSegmentKey::Digest { index, digest: xxh3_64(identity.as_bytes()) }
      }
    }
  }

  pub fn index(&self) -> usize {
    match self {
      DiffSegmentKey::Prefix { index, .. } | DiffSegmentKey::Digest { index, .. } => *index
    }
  }
}

fn char_prefix(text: &str, limit: usize) -> String {
  text.chars().take(limit).collect()
}

fn path_prefix(path: Option<&DiffPath>, limit: usize) -> String {
  path.map(|path| char_prefix(path.as_str(), limit)).unwrap_or_default()
}

/// The best result seen so far for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StabilizerEntry {
  pub label:          Label,
  pub classification: Classification
}

impl StabilizerEntry {
  pub fn new(label: Label, classification: Classification) -> Self {
    Self { label, classification }
  }

  pub fn confidence(&self) -> ConfidenceTier {
    self.classification.confidence
  }
}

#[derive(Debug, Default)]
pub struct StabilizerStore {
  entries: Mutex<HashMap<DiffSegmentKey, StabilizerEntry>>
}

impl StabilizerStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the entry to display for `key`.
  ///
  /// The candidate is stored and returned on first sight of the key, or when
  /// its confidence is strictly higher than the stored one. Otherwise the
  /// stored entry is returned unchanged.
  pub fn stabilize(&self, key: DiffSegmentKey, candidate: StabilizerEntry) -> StabilizerEntry {
    let mut entries = self.entries.lock();

    if let Some(stored) = entries.get(&key) {
      if candidate.confidence() <= stored.confidence() {
        if candidate.label != stored.label {
          log::trace!(
            "Holding label {:?} ({:?}) over {:?} ({:?}) for segment {}",
            stored.label.as_str(),
            stored.confidence(),
            candidate.label.as_str(),
            candidate.confidence(),
            key.index()
          );
        }
        return stored.clone();
      }
    }

    log::debug!("Segment {} labelled {:?} ({:?})", key.index(), candidate.label.as_str(), candidate.confidence());
    entries.insert(key, candidate.clone());
    candidate
  }

  pub fn get(&self, key: &DiffSegmentKey) -> Option<StabilizerEntry> {
    self.entries.lock().get(key).cloned()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// Forgets every segment.
  pub fn reset(&self) {
    self.entries.lock().clear();
  }
}
