//! Error types for the diff-label crate.
//!
//! Labelling itself never fails; these cover the surfaces around it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Config file not found at {0:?}")]
  MissingConfigFile(PathBuf),

  #[error("Failed to load configuration: {0}")]
  Config(#[from] config::ConfigError)
}
