use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use walkdir::{DirEntry, WalkDir};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Discovered images keyed by basename, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    entries: Vec<(String, PathBuf)>,
    positions: HashMap<String, usize>,
}

impl ImageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an image; an existing basename keeps its position but takes the new path.
    pub fn insert(&mut self, basename: impl Into<String>, path: impl Into<PathBuf>) {
        let basename = basename.into();
        let path = path.into();
        match self.positions.get(&basename) {
            Some(&idx) => {
                tracing::debug!(
                    basename = %basename,
                    previous = %self.entries[idx].1.display(),
                    replacement = %path.display(),
                    "image basename collision; keeping the later file"
                );
                self.entries[idx].1 = path;
            }
            None => {
                self.positions.insert(basename.clone(), self.entries.len());
                self.entries.push((basename, path));
            }
        }
    }

    pub fn extend(&mut self, other: ImageIndex) {
        for (basename, path) in other.entries {
            self.insert(basename, path);
        }
    }

    pub fn get(&self, basename: &str) -> Option<&Path> {
        self.positions
            .get(basename)
            .map(|&idx| self.entries[idx].1.as_path())
    }

    pub fn contains(&self, basename: &str) -> bool {
        self.positions.contains_key(basename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn basenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }
}

impl<K: Into<String>, P: Into<PathBuf>> FromIterator<(K, P)> for ImageIndex {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (basename, path) in iter {
            index.insert(basename, path);
        }
        index
    }
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Recursively indexes image files under `root` by basename.
pub fn discover_images(root: &Path) -> anyhow::Result<ImageIndex> {
    discover_images_filtered(root, |_| true)
}

/// Like [`discover_images`], skipping files whose basename `keep` rejects.
pub fn discover_images_filtered(
    root: &Path,
    keep: impl Fn(&str) -> bool,
) -> anyhow::Result<ImageIndex> {
    let mut index = ImageIndex::new();

    for entry in walk(root) {
        let entry = entry.with_context(|| format!("walk image dir: {}", root.display()))?;
        if !entry.file_type().is_file() || !has_image_extension(entry.path()) {
            continue;
        }
        let Some(basename) = entry.file_name().to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 image filename");
            continue;
        };
        if !keep(basename) {
            tracing::debug!(path = %entry.path().display(), "image excluded by filter");
            continue;
        }
        index.insert(basename, entry.path());
    }

    tracing::debug!(root = %root.display(), images = index.len(), "discovered images");
    Ok(index)
}

/// Sorted recursive walk that follows symlinks. Only a failure to read `root`
/// itself is returned; entries below it that cannot be read are logged and skipped.
pub(crate) fn walk(root: &Path) -> impl Iterator<Item = Result<DirEntry, walkdir::Error>> + '_ {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Err(err) if err.depth() > 0 => {
                tracing::warn!(root = %root.display(), %err, "skipping unreadable entry");
                None
            }
            other => Some(other),
        })
}
