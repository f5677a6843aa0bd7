use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use dotenv::dotenv;
use structopt::StructOpt;
use difflabel::{describe, LabelEngine, OperationKind, ResolvedSegment, Settings, StabilizerStore, TextState};

#[derive(StructOpt, Debug)]
#[structopt(name = "diff-label", about = "Labels each file change in a unified or git diff.")]
struct Args {
  /// Diff file to read; stdin when omitted
  #[structopt(parse(from_os_str))]
  input: Option<PathBuf>,

  /// Print resolved segments as JSON
  #[structopt(long)]
  json: bool,

  /// Treat the input as still streaming and ignore a final unterminated line
  #[structopt(long)]
  partial: bool,

  /// Settings file (INI)
  #[structopt(short = "c", long = "config", parse(from_os_str))]
  config: Option<PathBuf>
}

fn read_input(path: Option<&Path>) -> Result<String> {
  match path {
    Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read diff from {}", path.display())),
    None => {
      let mut input = String::new();
      std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read diff from stdin")?;
      Ok(input)
    }
  }
}

fn paint(segment: &ResolvedSegment) -> ColoredString {
  let label = segment.label.as_str();
  match segment.operation() {
    OperationKind::Create => label.green(),
    OperationKind::Delete => label.red(),
    OperationKind::Rename { .. } | OperationKind::Copy { .. } => label.yellow(),
    OperationKind::Modify => label.blue(),
    OperationKind::Unknown => label.dimmed()
  }
}

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let args = Args::from_args();
  let settings = Settings::load(args.config.as_deref())?;
  let input = read_input(args.input.as_deref())?;

  let state = if args.partial { TextState::Streaming } else { TextState::Complete };
  let engine = LabelEngine::new(settings, Arc::new(StabilizerStore::new()));
  let segments = engine.label_document(&input, state);
  log::debug!("Labelled {} segments", segments.len());

  if args.json {
    println!("{}", serde_json::to_string_pretty(&segments).context("Failed to serialize segments")?);
    return Ok(());
  }

  if segments.is_empty() {
    println!("{}", describe(None, &input).label.as_str().dimmed());
  }

  for segment in &segments {
    println!("{}", paint(segment));
  }

  Ok(())
}
