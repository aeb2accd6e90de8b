use sha2::{Digest as _, Sha256};

use crate::error::EmptySlugError;

/// Number of leading digest bytes folded into a stable id (10 hex characters).
const STABLE_ID_BYTES: usize = 5;

/// Lowercase, hyphen-separated token built from `[a-z0-9-]` only.
pub fn slugify(name: &str) -> Result<String, EmptySlugError> {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
            continue;
        }
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit()) {
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(ch);
    }

    if slug.is_empty() {
        return Err(EmptySlugError {
            input: name.to_owned(),
        });
    }
    Ok(slug)
}

/// Deterministic non-negative id derived from the SHA-256 digest of `seed`.
pub fn stable_id(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    digest[..STABLE_ID_BYTES]
        .iter()
        .fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// Hex GUID for a note, stable across rebuilds of the same content.
pub fn note_guid(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(&digest[..16])
}
