use crate::error::{Result, TagError};
use crate::lookup::{reconcile, WriteMode};
use crate::metadata::reader::{comic_info_indices, is_comic_info, open_archive, read_comic_info};
use crate::metadata::{xml, ComicInfo, COMIC_INFO_ENTRY};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A rewritten copy of an archive, staged next to the original and not yet
/// visible under the original name.
///
/// Dropping it without calling [`StagedArchive::commit`] removes the staged
/// copy and leaves the original untouched.
#[derive(Debug)]
pub struct StagedArchive {
    temp: NamedTempFile,
    target: PathBuf,
    removed_entries: usize,
}

impl StagedArchive {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Number of metadata entries left out of the staged copy
    pub fn removed_entries(&self) -> usize {
        self.removed_entries
    }

    /// Atomically replace the original with the staged copy
    pub fn commit(self) -> Result<()> {
        let StagedArchive { temp, target, .. } = self;
        // On failure the PersistError owns the temp file and deletes it when dropped
        temp.persist(&target)
            .map_err(|e| TagError::io_failure(&target, e.error))?;
        debug!(path = %target.display(), "replaced archive");
        Ok(())
    }
}

/// Copy every non-metadata entry of `path` into a temp file in the same
/// directory, appending `comic_info` as the new metadata entry when given.
///
/// Entries are copied raw, so their compressed bytes, timestamps and
/// compression methods are preserved.
pub fn stage(path: &Path, comic_info: Option<&[u8]>) -> Result<StagedArchive> {
    let mut archive = open_archive(path)?;
    let permissions = fs::metadata(path)
        .map_err(|e| TagError::io(path, e))?
        .permissions();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".cbztag-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| TagError::io_failure(dir, e))?;
    let temp_path = temp.path().to_path_buf();

    let mut writer = ZipWriter::new(temp);
    let mut removed_entries = 0;

    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| copy_error(path, &temp_path, e))?;
        if is_comic_info(entry.name()) {
            removed_entries += 1;
            continue;
        }
        writer
            .raw_copy_file(entry)
            .map_err(|e| copy_error(path, &temp_path, e))?;
    }

    if let Some(bytes) = comic_info {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer
            .start_file(COMIC_INFO_ENTRY, options)
            .map_err(|e| copy_error(path, &temp_path, e))?;
        writer
            .write_all(bytes)
            .map_err(|e| TagError::io_failure(&temp_path, e))?;
    }

    let temp = writer
        .finish()
        .map_err(|e| copy_error(path, &temp_path, e))?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| TagError::io_failure(&temp_path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| TagError::io_failure(&temp_path, e))?;

    debug!(
        path = %path.display(),
        temp = %temp_path.display(),
        removed_entries,
        "staged rewritten archive"
    );

    Ok(StagedArchive {
        temp,
        target: path.to_path_buf(),
        removed_entries,
    })
}

/// Reading the source fails as corrupt; writing the temp copy fails as I/O
fn copy_error(source: &Path, temp: &Path, err: ZipError) -> TagError {
    match err {
        ZipError::Io(e) => TagError::io_failure(temp, e),
        other => TagError::corrupt(source, other),
    }
}

/// Write a record into a CBZ, returning the record that was stored
///
/// In merge mode the existing entry is reconciled with `incoming`; an
/// existing entry that cannot be parsed is logged and treated as absent.
/// An empty record is stored as a bare `<ComicInfo>` element.
pub fn write_comic_info(path: &Path, incoming: ComicInfo, mode: WriteMode) -> Result<ComicInfo> {
    let existing = match mode {
        WriteMode::Overwrite => None,
        WriteMode::Merge => match read_comic_info(path) {
            Ok(existing) => existing,
            Err(TagError::ParseError { reason, .. }) => {
                warn!(
                    path = %path.display(),
                    %reason,
                    "existing ComicInfo.xml is unreadable, replacing it"
                );
                None
            }
            Err(e) => return Err(e),
        },
    };

    let merged = reconcile(existing, incoming, mode);
    let bytes = xml::encode(&merged)
        .map_err(|e| TagError::ValidationError(format!("cannot encode ComicInfo.xml: {}", e)))?;

    let staged = stage(path, Some(&bytes))?;
    debug!(temp = %staged.temp_path().display(), "committing staged archive");
    staged.commit()?;
    info!(path = %path.display(), mode = %mode, "wrote ComicInfo.xml");

    Ok(merged)
}

/// Remove the metadata entry from a CBZ
///
/// Returns `false` without touching the file when there is nothing to remove.
pub fn erase_comic_info(path: &Path) -> Result<bool> {
    let mut archive = open_archive(path)?;
    if comic_info_indices(&mut archive, path)?.is_empty() {
        debug!(path = %path.display(), "no ComicInfo.xml to erase");
        return Ok(false);
    }
    drop(archive);

    let staged = stage(path, None)?;
    let removed = staged.removed_entries();
    staged.commit()?;
    info!(path = %path.display(), removed, "erased ComicInfo.xml");
    Ok(true)
}
