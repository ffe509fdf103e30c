use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Archives found under the given paths, plus what was passed over
#[derive(Debug, Default)]
pub struct ScanResult {
    pub archives: Vec<PathBuf>,
    /// Explicitly named files without a .cbz extension
    pub skipped: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Expand files and directories into a sorted, de-duplicated list of CBZ files
///
/// Directories are walked recursively and only `.cbz` files are kept.
pub fn scan_paths(paths: &[PathBuf]) -> ScanResult {
    let mut result = ScanResult::default();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_cbz_file(entry_path) {
                    result.archives.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() {
            if is_cbz_file(path) {
                result.archives.push(path.clone());
            } else {
                result.skipped.push(path.clone());
            }
        } else {
            result.missing.push(path.clone());
        }
    }

    // Sort by path for consistent output
    result.archives.sort();
    result.archives.dedup();
    result
}

/// Check if a path is a .cbz file
fn is_cbz_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase() == "cbz")
        .unwrap_or(false)
}
