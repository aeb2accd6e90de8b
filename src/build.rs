use std::path::PathBuf;

use anyhow::Context as _;

use crate::config::DeckSettings;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::formats::ContentKind;
use crate::summary::{self, Summary};
use crate::{deck, mapping, package, scan};

/// Everything one `build` invocation needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub kind: ContentKind,
    pub source_dir: PathBuf,
    pub settings: DeckSettings,
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug)]
pub struct BuildReport {
    pub summary: Summary,
    /// Package path, absent on dry runs.
    pub written: Option<PathBuf>,
    pub notes: usize,
}

/// Runs scan → map → summarize → package; the summary is printed before any
/// structural failure after mapping so users see what went wrong.
pub fn run(ctx: &RunContext) -> anyhow::Result<BuildReport> {
    tracing::info!(
        kind = %ctx.kind,
        dir = %ctx.source_dir.display(),
        strategy = ?ctx.settings.strategy,
        "build: scan"
    );
    let scanned = scan::scan_directory(ctx.kind, &ctx.source_dir).context("scan")?;

    if scanned.records.is_empty() {
        return Err(BuildError::NoRecordsFound {
            kind: ctx.kind,
            dir: ctx.source_dir.clone(),
        }
        .into());
    }
    if scanned.images.is_empty() {
        return Err(BuildError::NoImagesFound {
            dir: ctx.source_dir.clone(),
        }
        .into());
    }

    tracing::info!(kind = %ctx.kind, "build: map");
    let mapping = mapping::map_content_to_images(
        &scanned.records,
        &scanned.images,
        ctx.settings.strategy.strategy(),
    );
    let summary = summary::summarize(ctx.kind, &scanned.records, &scanned.images, &mapping);
    println!("{}", summary.report(ctx.dry_run));

    if mapping.mapped.is_empty() {
        return Err(BuildError::NoRecordsMappable { kind: ctx.kind }.into());
    }

    if ctx.dry_run {
        tracing::info!("dry run complete; no package written");
        return Ok(BuildReport {
            summary,
            written: None,
            notes: mapping.mapped.len(),
        });
    }

    tracing::info!(deck = %ctx.settings.deck_name, "build: deck");
    let (deck, media) = deck::create_deck(
        ctx.kind,
        &ctx.settings.deck_name,
        &ctx.settings.model_name,
        &mapping.mapped,
        &scanned.images,
    )
    .context("create deck")?;
    require_notes(ctx.kind, &deck)?;

    tracing::info!(out = %ctx.settings.out.display(), "build: package");
    package::write_package(&deck, &media, &ctx.settings.out, ctx.force)
        .context("write package")?;

    tracing::info!(out = %ctx.settings.out.display(), "successfully created package");
    Ok(BuildReport {
        summary,
        written: Some(ctx.settings.out.clone()),
        notes: deck.notes.len(),
    })
}

/// A deck whose every image failed to stage is not worth packaging.
fn require_notes(kind: ContentKind, deck: &Deck) -> Result<(), BuildError> {
    if deck.notes.is_empty() {
        tracing::warn!(deck = %deck.name, "no notes survived media staging");
        return Err(BuildError::NoRecordsMappable { kind });
    }
    Ok(())
}
