//! Tolerant conversion of loosely structured JSON into [`ContentRecord`]s.
//!
//! Upstream data drifts between field names (`name` vs `title`, `overview` vs
//! `description`, ...). Each logical field is read from a priority-ordered key
//! list and the first present, non-empty value wins.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::formats::{ContentKind, ContentRecord, RecordDetails};

/// Source keys accepted for each logical field, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldKeys {
    pub wrappers: &'static [&'static str],
    pub name: &'static [&'static str],
    pub description: &'static [&'static str],
    pub image: &'static [&'static str],
    pub image_filename: &'static [&'static str],
    pub eagle_required: &'static [&'static str],
    pub rank: &'static [&'static str],
    pub adventure_type: &'static [&'static str],
}

pub const BADGE_KEYS: FieldKeys = FieldKeys {
    wrappers: &["badges", "items", "data", "meritBadges"],
    name: &["name", "title", "badge"],
    description: &["overview", "description", "blurb", "summary"],
    image: &["image", "img", "icon"],
    image_filename: &["image_filename", "imageFilename"],
    eagle_required: &["is_eagle_required", "eagle_required"],
    rank: &[],
    adventure_type: &[],
};

pub const ADVENTURE_KEYS: FieldKeys = FieldKeys {
    wrappers: &["adventures", "items", "data"],
    name: &["adventure_name", "name", "title"],
    description: &["adventure_overview", "overview", "description"],
    image: &["image", "img", "icon"],
    image_filename: &["image_filename", "imageFilename"],
    eagle_required: &[],
    rank: &["rank_name", "rank"],
    adventure_type: &["adventure_type", "type"],
};

impl FieldKeys {
    pub fn for_kind(kind: ContentKind) -> &'static FieldKeys {
        match kind {
            ContentKind::MeritBadges => &BADGE_KEYS,
            ContentKind::CubAdventures => &ADVENTURE_KEYS,
        }
    }
}

/// Extra context a directory scan knows about a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentHints<'a> {
    /// Rank to use when an adventure entry does not name one.
    pub rank: Option<&'a str>,
}

pub fn normalize(kind: ContentKind, data: &Value) -> Vec<ContentRecord> {
    normalize_with_hints(kind, data, DocumentHints::default())
}

/// Normalizes one JSON document; later entries with an already seen name are dropped.
pub fn normalize_with_hints(
    kind: ContentKind,
    data: &Value,
    hints: DocumentHints<'_>,
) -> Vec<ContentRecord> {
    let keys = FieldKeys::for_kind(kind);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for entry in entries(data, keys) {
        let Some(object) = entry.as_object() else {
            tracing::debug!(%kind, "skipping non-object entry");
            continue;
        };
        let Some(record) = record_from_object(kind, keys, object, hints) else {
            tracing::debug!(%kind, "skipping entry without a usable name");
            continue;
        };
        if !seen.insert(record.name.clone()) {
            tracing::debug!(%kind, name = %record.name, "skipping duplicate name");
            continue;
        }
        records.push(record);
    }

    records
}

/// Concatenates per-document record lists, keeping the first record of each name.
pub fn merge_records(lists: impl IntoIterator<Item = Vec<ContentRecord>>) -> Vec<ContentRecord> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for record in lists.into_iter().flatten() {
        if seen.insert(record.name.clone()) {
            merged.push(record);
        } else {
            tracing::debug!(name = %record.name, "dropping duplicate across documents");
        }
    }
    merged
}

fn entries<'a>(data: &'a Value, keys: &FieldKeys) -> Vec<&'a Value> {
    match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(object) => {
            let wrapped = keys.wrappers.iter().find_map(|key| object.get(*key));
            match wrapped {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(inner @ Value::Object(_)) => vec![inner],
                Some(_) => Vec::new(),
                None => vec![data],
            }
        }
        _ => Vec::new(),
    }
}

fn record_from_object(
    kind: ContentKind,
    keys: &FieldKeys,
    object: &Map<String, Value>,
    hints: DocumentHints<'_>,
) -> Option<ContentRecord> {
    let name = first_text(object, keys.name)?;
    let description = first_text(object, keys.description).unwrap_or_default();

    let details = match kind {
        ContentKind::MeritBadges => RecordDetails::Badge {
            eagle_required: first_flag(object, keys.eagle_required),
        },
        ContentKind::CubAdventures => RecordDetails::Adventure {
            rank: first_text(object, keys.rank)
                .or_else(|| hints.rank.map(str::to_owned))
                .unwrap_or_default(),
            adventure_type: first_text(object, keys.adventure_type).unwrap_or_default(),
        },
    };

    Some(ContentRecord {
        name,
        description,
        image_filename: first_text(object, keys.image_filename),
        image: first_text(object, keys.image),
        details,
    })
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(text_value)
}

fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        // Zero is treated as absent, like `false`.
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_owned(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn first_flag(object: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(flag_value)
        .unwrap_or(false)
}

fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
