use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use scout_decks::build::{self, RunContext};
use scout_decks::cli::{BuildArgs, Cli, Command, ConfigArgs};
use scout_decks::config::{self, CONFIG_FILE_NAME};
use scout_decks::error::Outcome;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match try_main(cli) {
        Ok(()) => ExitCode::from(Outcome::Success.exit_code()),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(Outcome::from_error(&err).exit_code())
        }
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Build(args) => {
            let loaded = config::load(args.config.as_deref()).context("load config")?;
            let level = args
                .verbosity
                .level()
                .map(str::to_owned)
                .or_else(|| loaded.config.logging.level.clone())
                .unwrap_or_else(|| "info".to_owned());
            scout_decks::logging::init(&level).context("init logging")?;
            tracing::debug!(?cli, "parsed cli");
            for warning in &loaded.warnings {
                tracing::warn!(%warning, "ignoring unusable config file");
            }
            if let Some(source) = &loaded.source {
                tracing::debug!(config = %source.display(), "loaded config");
            }
            run_build(args, &loaded.config)
        }
        Command::Config(args) => {
            scout_decks::logging::init("info").context("init logging")?;
            tracing::debug!(?cli, "parsed cli");
            run_config(args)
        }
    }
}

fn run_build(args: &BuildArgs, config: &config::Config) -> anyhow::Result<()> {
    let ctx = RunContext {
        kind: args.kind,
        source_dir: args.dir.clone(),
        settings: config.resolve(args.kind, args.overrides()),
        dry_run: args.dry_run,
        force: args.force,
    };
    let report = build::run(&ctx).context("build")?;
    if let Some(out) = &report.written {
        println!("Created {} with {} notes", out.display(), report.notes);
    }
    Ok(())
}

fn run_config(args: &ConfigArgs) -> anyhow::Result<()> {
    if args.show {
        println!("Sample configuration:");
        println!("{}", config::sample_json()?);
        return Ok(());
    }
    let path = args
        .save
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    config::save_sample(&path)?;
    println!("Sample configuration saved to {}", path.display());
    Ok(())
}
