//! Content-to-image matching.
//!
//! A [`MatchStrategy`] picks at most one image basename per record. Strategies
//! are selected per deck kind through [`StrategyKind`]; `exact` trusts only the
//! record's declared `image_filename`, the others fall back to slug lookups when
//! nothing is declared.

use std::collections::BTreeSet;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::formats::ContentRecord;
use crate::images::{IMAGE_EXTENSIONS, ImageIndex};

pub trait MatchStrategy {
    fn name(&self) -> &'static str;

    fn find_image(&self, record: &ContentRecord, images: &ImageIndex) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Only the record's declared `image_filename`.
    #[default]
    Exact,
    /// Declared filename, else slug equality, else slug/stem containment.
    Fuzzy,
    /// Declared filename, else `<slug>-merit-badge.<ext>` or `<slug>.<ext>`.
    BadgePattern,
}

impl StrategyKind {
    pub fn strategy(self) -> &'static dyn MatchStrategy {
        match self {
            Self::Exact => &ExactFilename,
            Self::Fuzzy => &SlugFuzzy,
            Self::BadgePattern => &BadgePattern,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactFilename;

impl MatchStrategy for ExactFilename {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn find_image(&self, record: &ContentRecord, images: &ImageIndex) -> Option<String> {
        declared_image(record, images)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlugFuzzy;

impl MatchStrategy for SlugFuzzy {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn find_image(&self, record: &ContentRecord, images: &ImageIndex) -> Option<String> {
        if record.image_filename.is_some() {
            return declared_image(record, images);
        }
        let slug = record_slug(record)?;

        if let Some(exact) = images
            .basenames()
            .find(|basename| lowercase_stem(basename) == slug)
        {
            return Some(exact.to_owned());
        }

        // Shortest basename wins; `min_by_key` keeps the first of equal keys.
        images
            .basenames()
            .filter(|basename| {
                let stem = lowercase_stem(basename);
                stem.contains(slug.as_str()) || slug.contains(stem.as_str())
            })
            .min_by_key(|basename| basename.chars().count())
            .map(str::to_owned)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BadgePattern;

impl MatchStrategy for BadgePattern {
    fn name(&self) -> &'static str {
        "badge-pattern"
    }

    fn find_image(&self, record: &ContentRecord, images: &ImageIndex) -> Option<String> {
        if record.image_filename.is_some() {
            return declared_image(record, images);
        }
        let slug = record_slug(record)?;

        [format!("{slug}-merit-badge"), slug]
            .iter()
            .flat_map(|stem| IMAGE_EXTENSIONS.iter().map(move |ext| format!("{stem}.{ext}")))
            .find(|candidate| images.contains(candidate))
    }
}

fn declared_image(record: &ContentRecord, images: &ImageIndex) -> Option<String> {
    record
        .image_filename
        .as_deref()
        .filter(|filename| images.contains(filename))
        .map(str::to_owned)
}

fn record_slug(record: &ContentRecord) -> Option<String> {
    match record.slug() {
        Ok(slug) => Some(slug),
        Err(err) => {
            tracing::warn!(name = %record.name, %err, "cannot slug-match record");
            None
        }
    }
}

fn lowercase_stem(basename: &str) -> String {
    Path::new(basename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(basename)
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRecord {
    pub record: ContentRecord,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingResult {
    pub mapped: Vec<MappedRecord>,
    pub unmapped: Vec<ContentRecord>,
}

impl MappingResult {
    pub fn total(&self) -> usize {
        self.mapped.len() + self.unmapped.len()
    }

    pub fn used_images(&self) -> BTreeSet<&str> {
        self.mapped.iter().map(|m| m.image.as_str()).collect()
    }

    /// Index basenames no record mapped to, in index order.
    pub fn unused_images<'a>(&self, images: &'a ImageIndex) -> Vec<&'a str> {
        let used = self.used_images();
        images
            .basenames()
            .filter(|basename| !used.contains(basename))
            .collect()
    }
}

/// Pairs every record with at most one image; input order is preserved in both lists.
pub fn map_content_to_images(
    records: &[ContentRecord],
    images: &ImageIndex,
    strategy: &dyn MatchStrategy,
) -> MappingResult {
    let mut result = MappingResult::default();

    for record in records {
        match strategy.find_image(record, images) {
            Some(image) => {
                tracing::debug!(name = %record.name, %image, "mapped record");
                result.mapped.push(MappedRecord {
                    record: record.clone(),
                    image,
                });
            }
            None => {
                tracing::debug!(name = %record.name, "no image found for record");
                result.unmapped.push(record.clone());
            }
        }
    }

    tracing::info!(
        strategy = strategy.name(),
        mapped = result.mapped.len(),
        unmapped = result.unmapped.len(),
        "mapped records to images"
    );
    result
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn index(names: &[&str]) -> ImageIndex {
        names
            .iter()
            .map(|name| (name.to_string(), format!("/images/{name}")))
            .collect()
    }

    fn mapped_pairs(result: &MappingResult) -> Vec<(&str, &str)> {
        result
            .mapped
            .iter()
            .map(|m| (m.record.name.as_str(), m.image.as_str()))
            .collect()
    }

    #[test]
    fn exact_maps_declared_filename() {
        let records = vec![
            ContentRecord::badge("Camping", "Learn outdoor skills").with_image_filename("camping.png"),
        ];
        let images = index(&["camping.png"]);

        let result = map_content_to_images(&records, &images, &ExactFilename);

        assert_eq!(mapped_pairs(&result), [("Camping", "camping.png")]);
        assert!(result.unmapped.is_empty());
        assert!(result.unused_images(&images).is_empty());
    }

    #[test]
    fn exact_ignores_records_without_declared_filename() {
        let records = vec![ContentRecord::badge("Hiking", "")];
        let images = index(&["hiking.jpg"]);

        let result = map_content_to_images(&records, &images, &ExactFilename);

        assert!(result.mapped.is_empty());
        assert_eq!(result.unmapped[0].name, "Hiking");
        assert_eq!(result.unused_images(&images), ["hiking.jpg"]);
    }

    #[test]
    fn exact_requires_case_sensitive_basename() {
        let records = vec![ContentRecord::badge("Camping", "").with_image_filename("Camping.PNG")];
        let result = map_content_to_images(&records, &index(&["camping.png"]), &ExactFilename);
        assert!(result.mapped.is_empty());
    }

    #[test]
    fn fuzzy_matches_slug_to_stem() {
        let records = vec![ContentRecord::badge("Hiking", "")];
        let images = index(&["hiking.jpg"]);

        let result = map_content_to_images(&records, &images, &SlugFuzzy);

        assert_eq!(mapped_pairs(&result), [("Hiking", "hiking.jpg")]);
    }

    #[test]
    fn fuzzy_prefers_exact_stem_over_containment() {
        let records = vec![ContentRecord::adventure("Bear Claws", "Bear", "", "")];
        let images = index(&["bear-claws-extra.png", "Bear-Claws.JPG"]);

        let result = map_content_to_images(&records, &images, &SlugFuzzy);

        assert_eq!(mapped_pairs(&result), [("Bear Claws", "Bear-Claws.JPG")]);
    }

    #[test]
    fn fuzzy_containment_prefers_shortest_then_first_seen() {
        let records = vec![ContentRecord::badge("Jungle", "")];
        let images = index(&["backyard-jungle.png", "jungle-2.png", "jungle-1.png"]);

        let result = map_content_to_images(&records, &images, &SlugFuzzy);

        assert_eq!(mapped_pairs(&result), [("Jungle", "jungle-2.png")]);
    }

    #[test]
    fn fuzzy_containment_works_in_both_directions() {
        let records = vec![ContentRecord::adventure("Backyard Jungle", "Tiger", "", "")];
        let images = index(&["jungle.png"]);

        let result = map_content_to_images(&records, &images, &SlugFuzzy);

        assert_eq!(mapped_pairs(&result), [("Backyard Jungle", "jungle.png")]);
    }

    #[test]
    fn fuzzy_does_not_fall_back_when_filename_is_declared() {
        let records = vec![ContentRecord::badge("Hiking", "").with_image_filename("missing.png")];
        let result = map_content_to_images(&records, &index(&["hiking.jpg"]), &SlugFuzzy);
        assert_eq!(result.unmapped.len(), 1);
    }

    #[test]
    fn fuzzy_leaves_unsluggable_names_unmapped() {
        let records = vec![ContentRecord::badge("???", "")];
        let result = map_content_to_images(&records, &index(&["x.png"]), &SlugFuzzy);
        assert_eq!(result.unmapped.len(), 1);
    }

    #[test]
    fn badge_pattern_prefers_merit_badge_suffix() {
        let records = vec![
            ContentRecord::badge("First Aid", ""),
            ContentRecord::badge("Chess", ""),
            ContentRecord::badge("Golf", ""),
        ];
        let images = index(&["first-aid.png", "first-aid-merit-badge.jpg", "chess.webp"]);

        let result = map_content_to_images(&records, &images, &BadgePattern);

        assert_eq!(
            mapped_pairs(&result),
            [("First Aid", "first-aid-merit-badge.jpg"), ("Chess", "chess.webp")]
        );
        assert_eq!(result.unmapped[0].name, "Golf");
        assert_eq!(result.unused_images(&images), ["first-aid.png"]);
    }

    #[test]
    fn strategy_kind_selects_implementation() {
        assert_eq!(StrategyKind::Exact.strategy().name(), "exact");
        assert_eq!(StrategyKind::Fuzzy.strategy().name(), "fuzzy");
        assert_eq!(StrategyKind::BadgePattern.strategy().name(), "badge-pattern");
        assert_eq!(StrategyKind::default(), StrategyKind::Exact);
    }

    #[test]
    fn mapping_does_not_touch_the_index() {
        let images = index(&["a.png", "b.png"]);
        let before: Vec<_> = images.iter().map(|(n, p)| (n.to_owned(), p.to_owned())).collect();

        let records = vec![ContentRecord::badge("A", "")];
        let _ = map_content_to_images(&records, &images, &SlugFuzzy);

        let after: Vec<_> = images.iter().map(|(n, p)| (n.to_owned(), p.to_owned())).collect();
        assert_eq!(before, after);
    }

    fn arb_records() -> impl Strategy<Value = Vec<ContentRecord>> {
        prop::collection::vec(
            ("[a-d]{1,3}", prop::option::of("[a-d]{1,3}\\.png")).prop_map(|(name, file)| {
                let record = ContentRecord::badge(name, "");
                match file {
                    Some(file) => record.with_image_filename(file),
                    None => record,
                }
            }),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn totals_and_used_images_are_consistent(
            records in arb_records(),
            names in prop::collection::vec("[a-d]{1,3}\\.png", 0..8),
        ) {
            let images: ImageIndex = names.iter().map(|n| (n.clone(), n.clone())).collect();
            for kind in [StrategyKind::Exact, StrategyKind::Fuzzy, StrategyKind::BadgePattern] {
                let result = map_content_to_images(&records, &images, kind.strategy());

                prop_assert_eq!(result.total(), records.len());
                let used = result.used_images();
                prop_assert!(used.iter().all(|name| images.contains(name)));

                let unused = result.unused_images(&images);
                prop_assert_eq!(unused.len() + used.len(), images.len());
                prop_assert!(unused.iter().all(|name| !used.contains(name)));
            }
        }
    }
}
