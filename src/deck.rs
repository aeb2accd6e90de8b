//! Flashcard deck assembly from mapped records.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::formats::{ContentKind, RecordDetails};
use crate::ids::{note_guid, stable_id};
use crate::images::ImageIndex;
use crate::mapping::MappedRecord;

const OVERVIEW_LIMIT: usize = 500;
const IMAGE_STYLE: &str = "max-width: 85%; height: auto;";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteModel {
    pub id: u64,
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub guid: String,
    pub fields: Vec<String>,
    /// Basename of the media file the note shows.
    pub media: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: u64,
    pub name: String,
    pub kind: ContentKind,
    pub model: NoteModel,
    pub notes: Vec<Note>,
}

/// Media copied for a deck; the staging directory is removed on drop.
#[derive(Debug)]
pub struct MediaFiles {
    dir: tempfile::TempDir,
    files: Vec<PathBuf>,
}

impl MediaFiles {
    pub fn stage() -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("scout_decks_")
            .tempdir()
            .context("create media staging dir")?;
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn copy_in(&mut self, basename: &str, source: &Path) -> anyhow::Result<()> {
        let target = self.dir.path().join(basename);
        if self.files.contains(&target) {
            return Ok(());
        }
        std::fs::copy(source, &target).with_context(|| {
            format!("copy image {} -> {}", source.display(), target.display())
        })?;
        self.files.push(target);
        Ok(())
    }
}

pub fn model_fields(kind: ContentKind) -> Vec<String> {
    let fields: &[&str] = match kind {
        ContentKind::MeritBadges => &["Image", "Name", "Description", "EagleRequired"],
        ContentKind::CubAdventures => &["Image", "Name", "Rank", "Type", "Overview"],
    };
    fields.iter().map(|f| (*f).to_owned()).collect()
}

/// Builds a deck with one note per mapped record whose image could be staged.
pub fn create_deck(
    kind: ContentKind,
    deck_name: &str,
    model_name: &str,
    mapped: &[MappedRecord],
    images: &ImageIndex,
) -> anyhow::Result<(Deck, MediaFiles)> {
    let model = NoteModel {
        id: stable_id(model_name),
        name: model_name.to_owned(),
        fields: model_fields(kind),
    };
    let mut deck = Deck {
        id: stable_id(deck_name),
        name: deck_name.to_owned(),
        kind,
        model,
        notes: Vec::with_capacity(mapped.len()),
    };
    let mut media = MediaFiles::stage()?;

    for item in mapped {
        let Some(source) = images.get(&item.image) else {
            tracing::warn!(image = %item.image, "mapped image missing from index; skipping note");
            continue;
        };
        if let Err(err) = media.copy_in(&item.image, source) {
            tracing::warn!(name = %item.record.name, ?err, "failed to copy image; skipping note");
            continue;
        }
        deck.notes.push(build_note(item)?);
    }

    tracing::info!(deck = %deck.name, notes = deck.notes.len(), "created deck");
    Ok((deck, media))
}

fn build_note(item: &MappedRecord) -> anyhow::Result<Note> {
    let record = &item.record;
    let image_field = format!(
        "<img src=\"{}\" style=\"{IMAGE_STYLE}\">",
        attr_escape(&item.image)
    );

    let (guid, fields) = match &record.details {
        RecordDetails::Badge { eagle_required } => {
            let slug = record
                .slug()
                .with_context(|| format!("derive note guid for {:?}", record.name))?;
            let guid = note_guid(&format!("{slug}|{}", item.image));
            let eagle = if *eagle_required { "1" } else { "" };
            let fields = vec![
                image_field,
                record.name.clone(),
                record.description.clone(),
                eagle.to_owned(),
            ];
            (guid, fields)
        }
        RecordDetails::Adventure {
            rank,
            adventure_type,
        } => {
            let fields = vec![
                image_field,
                record.name.clone(),
                rank.clone(),
                adventure_type.clone(),
                truncate_overview(&record.description),
            ];
            (record.stable_id().to_string(), fields)
        }
    };

    Ok(Note {
        guid,
        fields,
        media: item.image.clone(),
    })
}

fn truncate_overview(overview: &str) -> String {
    if overview.chars().count() <= OVERVIEW_LIMIT {
        return overview.to_owned();
    }
    let kept: String = overview.chars().take(OVERVIEW_LIMIT - 3).collect();
    format!("{kept}...")
}

fn attr_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
