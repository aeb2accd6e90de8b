//! Source directory layouts and the per-file JSON scan.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::formats::{ContentKind, ContentRecord};
use crate::images::{self, ImageIndex};
use crate::normalize::{self, DocumentHints};

/// Rank subdirectories of a Cub Scout export, with their display names.
pub const RANKS: &[(&str, &str)] = &[
    ("lion", "Lion"),
    ("tiger", "Tiger"),
    ("wolf", "Wolf"),
    ("bear", "Bear"),
    ("webelos", "Webelos"),
    ("arrow-of-light", "Arrow of Light"),
];

/// Files with this prefix are not adventures (the Bobcat rank requirement).
pub const EXCLUDED_PREFIX: &str = "bobcat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// JSON and images anywhere below the root.
    Flat,
    /// `<rank>/*.json` with images in `<rank>/images/`.
    Ranked,
}

impl Layout {
    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::MeritBadges => Self::Flat,
            ContentKind::CubAdventures => Self::Ranked,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub records: Vec<ContentRecord>,
    pub images: ImageIndex,
}

pub fn scan_directory(kind: ContentKind, dir: &Path) -> anyhow::Result<ScanResult> {
    let result = match Layout::for_kind(kind) {
        Layout::Flat => scan_flat(kind, dir)?,
        Layout::Ranked => scan_ranked(kind, dir)?,
    };
    tracing::info!(
        %kind,
        dir = %dir.display(),
        records = result.records.len(),
        images = result.images.len(),
        "scanned directory"
    );
    Ok(result)
}

fn scan_flat(kind: ContentKind, dir: &Path) -> anyhow::Result<ScanResult> {
    let mut documents = Vec::new();
    for entry in images::walk(dir) {
        let entry = entry.with_context(|| format!("walk source dir: {}", dir.display()))?;
        if entry.file_type().is_file() && is_json(entry.path()) {
            documents.push(entry.into_path());
        }
    }

    let records = normalize::merge_records(
        documents
            .iter()
            .filter_map(|path| load_document(kind, path, DocumentHints::default())),
    );
    let images = images::discover_images(dir)?;

    Ok(ScanResult { records, images })
}

fn scan_ranked(kind: ContentKind, dir: &Path) -> anyhow::Result<ScanResult> {
    let mut per_document = Vec::new();
    let mut images = ImageIndex::new();

    for &(rank_dir, rank_name) in RANKS {
        let rank_path = dir.join(rank_dir);
        if !rank_path.is_dir() {
            continue;
        }
        tracing::debug!(path = %rank_path.display(), "processing rank directory");

        for path in list_json_files(&rank_path) {
            if file_name_starts_with(&path, EXCLUDED_PREFIX) {
                tracing::debug!(path = %path.display(), "skipping excluded file");
                continue;
            }
            let hints = DocumentHints {
                rank: Some(rank_name),
            };
            if let Some(records) = load_document(kind, &path, hints) {
                per_document.push(records);
            }
        }

        let images_dir = rank_path.join("images");
        if images_dir.is_dir() {
            let rank_images = images::discover_images_filtered(&images_dir, |name| {
                !name.starts_with(EXCLUDED_PREFIX)
            })?;
            tracing::debug!(
                dir = %images_dir.display(),
                images = rank_images.len(),
                "found rank images"
            );
            images.extend(rank_images);
        }
    }

    Ok(ScanResult {
        records: normalize::merge_records(per_document),
        images,
    })
}

/// Reads and normalizes one document; failures are logged and the file skipped.
fn load_document(
    kind: ContentKind,
    path: &Path,
    hints: DocumentHints<'_>,
) -> Option<Vec<ContentRecord>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to read json file; skipping");
            return None;
        }
    };
    let data: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to parse json file; skipping");
            return None;
        }
    };

    let records = normalize::normalize_with_hints(kind, &data, hints);
    tracing::debug!(path = %path.display(), records = records.len(), "normalized document");
    Some(records)
}

/// JSON files directly inside `dir`, sorted; unreadable entries are logged and skipped.
fn list_json_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "failed to read directory; skipping");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                tracing::warn!(dir = %dir.display(), %err, "skipping unreadable entry");
                continue;
            }
        };
        if path.is_file() && is_json(&path) {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn file_name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::formats::RecordDetails;

    #[test]
    fn flat_scan_reads_nested_json_and_images() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let nested = temp.path().join("more");
        fs::create_dir_all(&nested)?;
        fs::write(
            temp.path().join("badges.json"),
            json!([
                {"name": "Camping", "description": "Learn outdoor skills", "image_filename": "camping.png"},
                {"name": "Hiking", "description": "Trail adventures", "image_filename": "hiking.jpg"},
            ])
            .to_string(),
        )?;
        fs::write(
            nested.join("wrapped.json"),
            json!({"meritBadges": [{"name": "Archery"}, {"name": "Camping", "description": "dup"}]})
                .to_string(),
        )?;
        fs::write(temp.path().join("camping.png"), b"png")?;
        fs::write(nested.join("hiking.jpg"), b"jpg")?;

        let result = scan_directory(ContentKind::MeritBadges, temp.path())?;

        let names: Vec<&str> = result.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Camping", "Hiking", "Archery"]);
        assert_eq!(result.records[0].description, "Learn outdoor skills");
        assert_eq!(result.images.len(), 2);
        assert!(result.images.contains("camping.png"));
        Ok(())
    }

    #[test]
    fn broken_json_file_is_skipped() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        fs::write(temp.path().join("a_broken.json"), "{ not json")?;
        fs::write(
            temp.path().join("b_good.json"),
            json!([{"name": "Chess"}]).to_string(),
        )?;

        let result = scan_directory(ContentKind::MeritBadges, temp.path())?;

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name, "Chess");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn flat_scan_follows_symlinked_files() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let store = temp.path().join("store");
        let src = temp.path().join("src");
        fs::create_dir_all(&store)?;
        fs::create_dir_all(&src)?;
        fs::write(
            store.join("badges.json"),
            json!([{"name": "Camping", "image_filename": "camping.png"}]).to_string(),
        )?;
        fs::write(store.join("camping.png"), b"png")?;
        std::os::unix::fs::symlink(store.join("badges.json"), src.join("badges.json"))?;
        std::os::unix::fs::symlink(store.join("camping.png"), src.join("camping.png"))?;

        let result = scan_directory(ContentKind::MeritBadges, &src)?;

        assert_eq!(result.records.len(), 1);
        assert!(result.images.contains("camping.png"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn flat_scan_skips_unreadable_entries() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("a_dangling.json"))?;
        fs::write(
            temp.path().join("b_badges.json"),
            json!([{"name": "Chess"}]).to_string(),
        )?;
        fs::write(temp.path().join("chess.png"), b"png")?;

        let result = scan_directory(ContentKind::MeritBadges, temp.path())?;

        assert_eq!(result.records[0].name, "Chess");
        assert_eq!(result.images.len(), 1);
        Ok(())
    }

    #[test]
    fn empty_directory_yields_nothing() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        for kind in [ContentKind::MeritBadges, ContentKind::CubAdventures] {
            let result = scan_directory(kind, temp.path())?;
            assert!(result.records.is_empty());
            assert!(result.images.is_empty());
        }
        Ok(())
    }

    #[test]
    fn ranked_scan_uses_rank_directories_only() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let tiger = temp.path().join("tiger");
        let tiger_images = tiger.join("images");
        fs::create_dir_all(&tiger_images)?;
        fs::create_dir_all(temp.path().join("unknown-rank"))?;

        fs::write(
            tiger.join("backyard-jungle.json"),
            json!({
                "adventure_name": "Backyard Jungle",
                "adventure_type": "Required",
                "adventure_overview": "Explore nature",
                "image_filename": "jungle.png",
            })
            .to_string(),
        )?;
        fs::write(
            tiger.join("bobcat-tiger.json"),
            json!({"adventure_name": "Bobcat"}).to_string(),
        )?;
        fs::write(
            temp.path().join("unknown-rank").join("stray.json"),
            json!({"adventure_name": "Stray"}).to_string(),
        )?;
        fs::write(tiger_images.join("jungle.png"), b"png")?;
        fs::write(tiger_images.join("bobcat.png"), b"png")?;
        fs::write(tiger.join("outside-images.png"), b"png")?;

        let result = scan_directory(ContentKind::CubAdventures, temp.path())?;

        assert_eq!(result.records.len(), 1);
        let adventure = &result.records[0];
        assert_eq!(adventure.name, "Backyard Jungle");
        assert_eq!(
            adventure.details,
            RecordDetails::Adventure {
                rank: "Tiger".to_owned(),
                adventure_type: "Required".to_owned(),
            }
        );
        assert_eq!(result.images.basenames().collect::<Vec<_>>(), ["jungle.png"]);
        Ok(())
    }
}
