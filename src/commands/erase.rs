use crate::metadata::{erase_comic_info, has_comic_info};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::error;

pub fn run(files: &[PathBuf], no_dry_run: bool, quiet: bool) -> Result<()> {
    let mut failed = 0;

    for file in files {
        if let Err(e) = erase_file(file, no_dry_run) {
            failed += 1;
            error!(path = %file.display(), "erase failed: {}", e);
            eprintln!("{}: {}", "Error".red().bold(), e);
        }
    }

    if !no_dry_run && !quiet {
        println!();
        println!("(dry-run) No files were changed. Use --no-dry-run to apply.");
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, files.len());
    }
    Ok(())
}

fn erase_file(file: &Path, no_dry_run: bool) -> Result<()> {
    if !no_dry_run {
        if has_comic_info(file)? {
            println!("{}: would remove ComicInfo.xml", file.display());
        } else {
            println!("{}: no ComicInfo.xml, nothing to erase", file.display());
        }
        return Ok(());
    }

    if erase_comic_info(file)? {
        println!("{} {}: removed ComicInfo.xml", "✓".green(), file.display());
    } else {
        println!("{}: no ComicInfo.xml, nothing to erase", file.display());
    }
    Ok(())
}
