use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EmptySlugError;
use crate::ids::{slugify, stable_id};

/// Which scout program a source directory holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    MeritBadges,
    CubAdventures,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeritBadges => "merit-badges",
            Self::CubAdventures => "cub-adventures",
        }
    }

    /// Plural noun used in log lines and the build summary.
    pub fn noun(self) -> &'static str {
        match self {
            Self::MeritBadges => "badges",
            Self::CubAdventures => "adventures",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub name: String,
    /// Badge description or adventure overview.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub details: RecordDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordDetails {
    Badge {
        eagle_required: bool,
    },
    Adventure {
        rank: String,
        adventure_type: String,
    },
}

impl ContentRecord {
    pub fn badge(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_filename: None,
            image: None,
            details: RecordDetails::Badge {
                eagle_required: false,
            },
        }
    }

    pub fn adventure(
        name: impl Into<String>,
        rank: impl Into<String>,
        adventure_type: impl Into<String>,
        overview: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: overview.into(),
            image_filename: None,
            image: None,
            details: RecordDetails::Adventure {
                rank: rank.into(),
                adventure_type: adventure_type.into(),
            },
        }
    }

    pub fn with_image_filename(mut self, image_filename: impl Into<String>) -> Self {
        self.image_filename = Some(image_filename.into());
        self
    }

    pub fn kind(&self) -> ContentKind {
        match self.details {
            RecordDetails::Badge { .. } => ContentKind::MeritBadges,
            RecordDetails::Adventure { .. } => ContentKind::CubAdventures,
        }
    }

    pub fn slug(&self) -> Result<String, EmptySlugError> {
        slugify(&self.name)
    }

    pub fn rank(&self) -> Option<&str> {
        match &self.details {
            RecordDetails::Adventure { rank, .. } => Some(rank),
            RecordDetails::Badge { .. } => None,
        }
    }

    pub fn stable_seed(&self) -> String {
        match &self.details {
            RecordDetails::Badge { .. } => format!("badge:{}", self.name),
            RecordDetails::Adventure { rank, .. } => format!("adventure:{rank}:{}", self.name),
        }
    }

    pub fn stable_id(&self) -> u64 {
        stable_id(&self.stable_seed())
    }

    /// Human-facing label; adventures carry their rank.
    pub fn label(&self) -> String {
        match &self.details {
            RecordDetails::Adventure { rank, .. } if !rank.is_empty() => {
                format!("{} ({rank})", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_names_and_ranks_share_stable_ids() {
        let a = ContentRecord::adventure("Backyard Jungle", "Tiger", "Required", "one");
        let b = ContentRecord::adventure("Backyard Jungle", "Tiger", "Elective", "two");
        let c = ContentRecord::adventure("Backyard Jungle", "Wolf", "Required", "one");

        assert_eq!(a.stable_id(), b.stable_id());
        assert_ne!(a.stable_id(), c.stable_id());
        assert_eq!(a.stable_seed(), "adventure:Tiger:Backyard Jungle");
    }

    #[test]
    fn label_includes_rank_for_adventures() {
        let adventure = ContentRecord::adventure("Backyard Jungle", "Tiger", "", "");
        assert_eq!(adventure.label(), "Backyard Jungle (Tiger)");
        assert_eq!(ContentRecord::badge("Camping", "").label(), "Camping");
    }

    #[test]
    fn slug_of_punctuation_only_name_is_an_error() {
        assert!(ContentRecord::badge("???", "").slug().is_err());
        assert_eq!(
            ContentRecord::badge("Bear's Den", "").slug().unwrap(),
            "bears-den"
        );
    }
}
