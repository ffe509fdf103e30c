use crate::error::{Result, TagError};
use crate::metadata::{xml, ComicInfo};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Fixed entry name of the metadata document inside a CBZ
pub const COMIC_INFO_ENTRY: &str = "ComicInfo.xml";

/// Largest metadata entry read before giving up on the archive
pub const MAX_COMIC_INFO_BYTES: u64 = 4 * 1024 * 1024;

pub(crate) type Archive = ZipArchive<BufReader<File>>;

/// Open a CBZ for reading
///
/// A file that opens but is not a readable ZIP container is a
/// `CorruptArchive`; a missing file is `NotFound`.
pub(crate) fn open_archive(path: &Path) -> Result<Archive> {
    let file = File::open(path).map_err(|e| TagError::io(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| TagError::corrupt(path, e))
}

/// Entry names are matched case-insensitively
pub(crate) fn is_comic_info(name: &str) -> bool {
    name.eq_ignore_ascii_case(COMIC_INFO_ENTRY)
}

/// Indices of every metadata entry in the archive, in central directory order
pub(crate) fn comic_info_indices(archive: &mut Archive, path: &Path) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| TagError::corrupt(path, e))?;
        if is_comic_info(entry.name()) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Whether the archive carries a ComicInfo.xml entry
pub fn has_comic_info(path: &Path) -> Result<bool> {
    let mut archive = open_archive(path)?;
    Ok(!comic_info_indices(&mut archive, path)?.is_empty())
}

/// Read the ComicInfo.xml record from a CBZ
///
/// Returns `Ok(None)` when the archive has no metadata entry.
pub fn read_comic_info(path: &Path) -> Result<Option<ComicInfo>> {
    let mut archive = open_archive(path)?;

    let Some(index) = comic_info_indices(&mut archive, path)?.into_iter().next() else {
        debug!(path = %path.display(), "no ComicInfo.xml entry");
        return Ok(None);
    };

    let mut entry = archive
        .by_index(index)
        .map_err(|e| TagError::corrupt(path, e))?;
    // The declared size is not trusted; a forged header must not drive the allocation
    let mut bytes = Vec::new();
    (&mut entry)
        .take(MAX_COMIC_INFO_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| TagError::corrupt(path, e))?;
    if bytes.len() as u64 > MAX_COMIC_INFO_BYTES {
        return Err(TagError::parse(
            path,
            format!("entry is larger than {} bytes", MAX_COMIC_INFO_BYTES),
        ));
    }

    let info = xml::decode(&bytes).map_err(|e| TagError::parse(path, e))?;
    debug!(path = %path.display(), "read ComicInfo.xml");
    Ok(Some(info))
}
