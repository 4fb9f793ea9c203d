//! Interactive copy command.
//!
//! Meant to be launched from a file manager's Send-To menu with the clicked
//! folder as its only argument. Anything not given on the command line is
//! asked for on stdin. Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treeplan::{copy, ExistenceClass, Prompt, TargetKind};

/// Copy files or folders, keeping their relative folder structure.
#[derive(Debug, Parser)]
#[command(name = "treeplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input folder.
    input: Option<PathBuf>,

    /// Output folder.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to copy: "file" or "dir".
    #[arg(short, long)]
    target: Option<TargetKind>,

    /// Descend into subfolders.
    #[arg(long, conflicts_with = "shallow")]
    recursive: bool,

    /// Only look at the input folder's immediate children.
    #[arg(long)]
    shallow: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut prompt = Prompt::stdio();

    let input = match cli.input {
        Some(p) if ExistenceClass::of(&p) == ExistenceClass::Dir => p,
        Some(p) => {
            tracing::warn!(path = %p.display(), "input is not a folder");
            prompt.existing_dir("Input Folder: ")?
        }
        None => prompt.existing_dir("Input Folder: ")?,
    };
    let output = match cli.output {
        Some(p) if ExistenceClass::of(&p) == ExistenceClass::Dir => p,
        _ => prompt.existing_dir("Output Folder: ")?,
    };
    let target = match cli.target {
        Some(t) => t,
        None => prompt.target()?,
    };
    let recursive = if cli.recursive {
        true
    } else if cli.shallow {
        false
    } else {
        prompt.yes_no("Recursively?")?
    };
    let filter = prompt.predicate()?;

    let mapping = treeplan::build_mapping(&input, &output, target, recursive)?;
    let report = copy::copy_matching(&mapping, &filter);

    prompt.say(&report)?;
    for err in &report.errors {
        prompt.say(format_args!("  failed: {err}"))?;
    }
    if !report.is_clean() {
        bail!("{} of {} entries failed to copy", report.error_count(), report.scanned);
    }
    Ok(())
}
