use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use config::{Config, FileFormat};
use lazy_static::lazy_static;

use crate::error::Error;

// Constants
const DEFAULT_KEY_PATH_PREFIX: usize = 32;
const DEFAULT_KEY_TEXT_PREFIX: usize = 64;
const ENV_PREFIX: &str = "DIFF_LABEL";

lazy_static! {
  static ref DEFAULT_CONFIG_FILE: Option<PathBuf> = home::home_dir().map(|home| home.join(".config/diff-label/config.ini"));
}

/// How a diff segment's stabilizer key is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
  /// Segment index plus short prefixes of both header paths and of the first line
  #[default]
  Prefix,
  /// Segment index plus an xxh3 digest of the full header paths and first line
  Digest
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
  pub key_strategy:    KeyStrategy,
  pub key_path_prefix: usize,
  pub key_text_prefix: usize
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      key_strategy:    KeyStrategy::Prefix,
      key_path_prefix: DEFAULT_KEY_PATH_PREFIX,
      key_text_prefix: DEFAULT_KEY_TEXT_PREFIX
    }
  }
}

impl Settings {
  /// Loads settings from defaults, an INI file, then `DIFF_LABEL_*` environment variables.
  ///
  /// An explicit `path` must exist. Without one the file under
  /// `~/.config/diff-label/` is read if present and skipped otherwise.
  pub fn load(path: Option<&Path>) -> Result<Self, Error> {
    if let Some(path) = path {
      if !path.exists() {
        return Err(Error::MissingConfigFile(path.to_path_buf()));
      }
    }

    let file = path.map(Path::to_path_buf).or_else(|| DEFAULT_CONFIG_FILE.clone());
    let defaults = Settings::default();

    let mut builder = Config::builder()
      .set_default("key_strategy", "prefix")?
      .set_default("key_path_prefix", defaults.key_path_prefix as i64)?
      .set_default("key_text_prefix", defaults.key_text_prefix as i64)?;

    if let Some(file) = file {
      log::debug!("Reading settings from {}", file.display());
      builder = builder.add_source(config::File::new(file.to_string_lossy().as_ref(), FileFormat::Ini).required(path.is_some()));
    }

    let settings: Settings = builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()?
      .try_deserialize()?;

    log::debug!("Loaded settings: {settings:?}");
    Ok(settings)
  }
}
