use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use super::format::{derive_filename_with_extension, derive_filename_within, MAX_FILENAME_BYTES};
use crate::hash::same_content;
use crate::metadata::ComicInfo;

/// Highest numeric suffix tried before giving up
const MAX_SUFFIX: u32 = 999;

/// What renaming an archive after its metadata would do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenamePlan {
    /// The current name already matches (ignoring case)
    Unchanged,
    /// Move the archive to `dest` in the same directory
    Rename { dest: PathBuf },
    /// A file with identical content already sits at `dest`
    Duplicate { dest: PathBuf },
    /// The record has nothing to build a name from
    NoName,
}

/// Plan renaming `source` after `info`, resolving collisions in its directory
///
/// An occupied target with different content gets a ` (2)`, ` (3)`, ...
/// suffix before the extension.
pub fn plan_rename(source: &Path, info: &ComicInfo) -> Result<RenamePlan> {
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let Some(name) = derive_filename_with_extension(info, &ext) else {
        return Ok(RenamePlan::NoName);
    };

    let current = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let dir = source.parent().unwrap_or(Path::new(""));

    for attempt in 1..=MAX_SUFFIX {
        let candidate = if attempt == 1 {
            name.clone()
        } else {
            // Re-derive with room for the suffix so the cap still holds
            let suffix = format!(" ({})", attempt);
            let Some(base) =
                derive_filename_within(info, &ext, MAX_FILENAME_BYTES - suffix.len())
            else {
                break;
            };
            match base.rsplit_once('.') {
                Some((stem, ext)) => format!("{}{}.{}", stem, suffix, ext),
                None => format!("{}{}", base, suffix),
            }
        };

        if candidate.to_lowercase() == current.to_lowercase() {
            return Ok(RenamePlan::Unchanged);
        }

        let dest = dir.join(&candidate);
        if !dest.exists() {
            return Ok(RenamePlan::Rename { dest });
        }
        if dest.is_file() && same_content(source, &dest)? {
            return Ok(RenamePlan::Duplicate { dest });
        }
    }

    bail!("No free filename for {:?} in {:?}", name, dir)
}
