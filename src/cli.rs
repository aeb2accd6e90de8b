use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::DeckOverrides;
use crate::formats::ContentKind;
use crate::mapping::StrategyKind;

/// Scout archive to flashcard deck tools.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a deck from an extracted directory.
    Build(BuildArgs),
    /// Show or save a sample configuration.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Content kind held by the directory.
    #[arg(value_enum)]
    pub kind: ContentKind,

    /// Extracted directory with JSON records and images.
    #[arg(value_parser = existing_dir)]
    pub dir: PathBuf,

    /// Output package path (default: per deck kind).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Deck name (default: per deck kind).
    #[arg(long)]
    pub deck_name: Option<String>,

    /// Note model name (default: per deck kind).
    #[arg(long)]
    pub model_name: Option<String>,

    /// How records are matched to images (default: exact).
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// Run without writing the package.
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite an existing package.
    #[arg(long)]
    pub force: bool,

    /// Config file to use instead of the default search paths.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

impl BuildArgs {
    pub fn overrides(&self) -> DeckOverrides {
        DeckOverrides {
            out: self.out.clone(),
            deck_name: self.deck_name.clone(),
            model_name: self.model_name.clone(),
            strategy: self.strategy,
        }
    }
}

#[derive(Debug, Clone, Copy, Args)]
pub struct Verbosity {
    /// Only show errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Verbosity {
    /// Filter directive implied by the flags, if any.
    pub fn level(self) -> Option<&'static str> {
        match (self.quiet, self.verbose) {
            (true, _) => Some("error"),
            (false, 0) => None,
            (false, 1) => Some("debug"),
            (false, _) => Some("trace"),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print a sample configuration.
    #[arg(long, conflicts_with = "save")]
    pub show: bool,

    /// Save a sample configuration to this path (default: ./scout-decks.json).
    #[arg(long)]
    pub save: Option<PathBuf>,
}

fn existing_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("directory does not exist: {raw}"))
    }
}
