//! Reconciling an archive's existing record with incoming metadata

use crate::error::TagError;
use crate::metadata::{ComicInfo, ListField, ScalarField};
use std::fmt;
use std::str::FromStr;

/// How incoming metadata combines with what is already in the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Keep existing fields the incoming record leaves empty
    #[default]
    Merge,
    /// Replace the stored record wholesale
    Overwrite,
}

impl WriteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Merge => "merge",
            WriteMode::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(WriteMode::Merge),
            "overwrite" => Ok(WriteMode::Overwrite),
            other => Err(TagError::ValidationError(format!(
                "unknown write mode '{}' (expected 'merge' or 'overwrite')",
                other
            ))),
        }
    }
}

/// Combine an existing record with an incoming one
///
/// Merge: each incoming non-empty field wins, every other existing field is
/// kept. Lists are replaced as a whole, never unioned. Overwrite: the
/// incoming record is returned unchanged.
pub fn reconcile(existing: Option<ComicInfo>, incoming: ComicInfo, mode: WriteMode) -> ComicInfo {
    let mut merged = match (mode, existing) {
        (WriteMode::Overwrite, _) | (WriteMode::Merge, None) => return incoming,
        (WriteMode::Merge, Some(existing)) => existing,
    };

    for field in ScalarField::ALL {
        if let Some(value) = incoming.scalar(field).filter(|v| !v.trim().is_empty()) {
            merged.set_scalar(field, Some(value));
        }
    }

    for field in ListField::ALL {
        let values = incoming.list(field);
        if values.iter().any(|v| !v.trim().is_empty()) {
            merged.set_list(field, values);
        }
    }

    merged
}
