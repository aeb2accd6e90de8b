use std::fmt;

use serde::Serialize;

use crate::formats::{ContentKind, ContentRecord, RecordDetails};
use crate::images::ImageIndex;
use crate::mapping::MappingResult;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingImage {
    pub label: String,
    pub expected_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub kind: ContentKind,
    pub total_records: usize,
    pub total_images: usize,
    pub mapped: usize,
    pub unmapped: usize,
    pub unused_images: Vec<String>,
    pub missing_images: Vec<MissingImage>,
}

impl Summary {
    pub fn unused_image_count(&self) -> usize {
        self.unused_images.len()
    }

    pub fn report(&self, dry_run: bool) -> SummaryReport<'_> {
        SummaryReport {
            summary: self,
            dry_run,
        }
    }
}

pub fn summarize(
    kind: ContentKind,
    records: &[ContentRecord],
    images: &ImageIndex,
    mapping: &MappingResult,
) -> Summary {
    let mut unused_images: Vec<String> = mapping
        .unused_images(images)
        .into_iter()
        .map(str::to_owned)
        .collect();
    unused_images.sort();

    let missing_images = mapping
        .unmapped
        .iter()
        .map(|record| MissingImage {
            label: record.label(),
            expected_image: expected_image(record),
        })
        .collect();

    Summary {
        kind,
        total_records: records.len(),
        total_images: images.len(),
        mapped: mapping.mapped.len(),
        unmapped: mapping.unmapped.len(),
        unused_images,
        missing_images,
    }
}

/// The declared filename, or the name an image for this record would usually have.
pub fn expected_image(record: &ContentRecord) -> String {
    if let Some(filename) = &record.image_filename {
        return filename.clone();
    }
    let Ok(slug) = record.slug() else {
        return "unknown".to_owned();
    };
    match record.details {
        RecordDetails::Badge { .. } => format!("{slug}-merit-badge.jpg"),
        RecordDetails::Adventure { .. } => format!("{slug}.jpg"),
    }
}

pub struct SummaryReport<'a> {
    summary: &'a Summary,
    dry_run: bool,
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let noun = s.kind.noun();
        let title_noun = capitalize(noun);
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(f, "BUILD SUMMARY")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total {noun} in JSON: {}", s.total_records)?;
        writeln!(f, "Total images available: {}", s.total_images)?;
        writeln!(f, "{title_noun} mapped to images: {}", s.mapped)?;
        writeln!(f, "{title_noun} without images: {}", s.unmapped)?;
        writeln!(f, "Unused images: {}", s.unused_image_count())?;

        if !s.missing_images.is_empty() {
            writeln!(f, "\nMissing images ({}):", s.missing_images.len())?;
            for missing in &s.missing_images {
                writeln!(f, "  • {} → {}", missing.label, missing.expected_image)?;
            }
        }

        if self.dry_run {
            writeln!(f, "\n[DRY RUN] Would create deck with {} notes", s.mapped)?;
        }

        write!(f, "{rule}")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
