use std::path::PathBuf;

use thiserror::Error;

use crate::formats::ContentKind;

/// A name reduced to nothing once lowercased and stripped to `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input string produces empty slug: {input:?}")]
pub struct EmptySlugError {
    pub input: String,
}

/// Structural failures that abort a build before any deck is written.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no {} found in directory: {}", .kind.noun(), .dir.display())]
    NoRecordsFound { kind: ContentKind, dir: PathBuf },

    #[error("no images found in directory: {}", .dir.display())]
    NoImagesFound { dir: PathBuf },

    #[error("no {} could be mapped to images", .kind.noun())]
    NoRecordsMappable { kind: ContentKind },
}

/// Result of a build as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NoRecordsFound,
    NoImagesFound,
    NoRecordsMappable,
    UnexpectedFailure,
}

impl Outcome {
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::NoRecordsFound { .. }) => Self::NoRecordsFound,
            Some(BuildError::NoImagesFound { .. }) => Self::NoImagesFound,
            Some(BuildError::NoRecordsMappable { .. }) => Self::NoRecordsMappable,
            None => Self::UnexpectedFailure,
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::UnexpectedFailure => 1,
            Self::NoImagesFound => 3,
            Self::NoRecordsFound => 4,
            Self::NoRecordsMappable => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context as _;

    use super::*;

    #[test]
    fn outcome_sees_through_context_layers() {
        let err = Err::<(), _>(BuildError::NoImagesFound {
            dir: PathBuf::from("data"),
        })
        .context("build")
        .unwrap_err();

        assert_eq!(Outcome::from_error(&err), Outcome::NoImagesFound);
        assert_eq!(Outcome::from_error(&err).exit_code(), 3);
    }

    #[test]
    fn outcome_defaults_to_unexpected_failure() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(Outcome::from_error(&err), Outcome::UnexpectedFailure);
        assert_eq!(Outcome::UnexpectedFailure.exit_code(), 1);
    }

    #[test]
    fn structural_outcomes_have_distinct_exit_codes() {
        let codes = [
            Outcome::Success,
            Outcome::NoRecordsFound,
            Outcome::NoImagesFound,
            Outcome::NoRecordsMappable,
            Outcome::UnexpectedFailure,
        ]
        .map(Outcome::exit_code);

        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
