//! Zip packaging of a [`Deck`] and its media.
//!
//! Layout: `deck.json` (the deck document), `media` (JSON object mapping entry
//! names to basenames) and one entry per media file named `0`, `1`, ...

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;

use crate::deck::{Deck, MediaFiles};

pub const DECK_ENTRY: &str = "deck.json";
pub const MEDIA_ENTRY: &str = "media";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDocument {
    pub created_at: String,
    pub deck: Deck,
}

pub fn write_package(
    deck: &Deck,
    media: &MediaFiles,
    out_path: &Path,
    force: bool,
) -> anyhow::Result<()> {
    if out_path.exists() && !force {
        anyhow::bail!("package output already exists: {}", out_path.display());
    }
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create package parent dir: {}", parent.display()))?;
    }

    let document = PackageDocument {
        created_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        deck: deck.clone(),
    };
    let deck_json = serde_json::to_vec_pretty(&document).context("serialize deck document")?;

    let mut media_index = BTreeMap::new();
    for (idx, path) in media.files().iter().enumerate() {
        let basename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid media filename: {}", path.display()))?;
        media_index.insert(idx.to_string(), basename.to_owned());
    }
    let media_json = serde_json::to_vec(&media_index).context("serialize media index")?;

    let mut out_options = OpenOptions::new();
    out_options.write(true);
    if force {
        out_options.create(true).truncate(true);
    } else {
        out_options.create_new(true);
    }
    let out_file = out_options
        .open(out_path)
        .with_context(|| format!("open package output: {}", out_path.display()))?;

    let mut zip = zip::ZipWriter::new(out_file);
    let deflated_options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);
    // Images are already compressed.
    let stored_options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    zip.start_file(DECK_ENTRY, deflated_options)
        .context("package start_file deck.json")?;
    zip.write_all(&deck_json)
        .context("package write deck.json")?;

    zip.start_file(MEDIA_ENTRY, deflated_options)
        .context("package start_file media")?;
    zip.write_all(&media_json).context("package write media")?;

    for (idx, path) in media.files().iter().enumerate() {
        let mut f = fs::File::open(path)
            .with_context(|| format!("open media: {}", path.display()))?;
        zip.start_file(idx.to_string(), stored_options)
            .with_context(|| format!("package start_file media {idx}"))?;
        std::io::copy(&mut f, &mut zip)
            .with_context(|| format!("package write media: {}", path.display()))?;
    }

    zip.finish().context("package finish zip")?;
    tracing::info!(
        out = %out_path.display(),
        notes = deck.notes.len(),
        media = media.len(),
        "wrote deck package"
    );
    Ok(())
}
