use crate::config::Config;
use crate::editor::{compute_changes, format_diff};
use crate::error::TagError;
use crate::lookup::api::fetch_issue_sync;
use crate::lookup::{map, reconcile, ComicVineClient, SourceRecord, WriteMode};
use crate::metadata::{read_comic_info, write_comic_info, ComicInfo, ScalarField};
use crate::organize::{plan_rename, RenamePlan};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Where the incoming metadata comes from
pub enum TagSource<'a> {
    ComicVine(u64),
    File(&'a Path),
}

pub fn run(
    files: &[PathBuf],
    source: TagSource,
    overwrite_all: bool,
    rename: bool,
    no_dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let mode = config.write_mode(overwrite_all)?;
    let rename = config.rename(rename);

    let mut incoming = load_incoming(&config, source)?;
    if incoming.language_iso.is_none() {
        incoming.set_scalar(ScalarField::LanguageIso, config.language());
    }
    if incoming.is_empty() {
        bail!("The metadata source produced no fields to write");
    }

    if !quiet {
        println!("Mode: {}", mode.as_str().cyan());
        println!();
    }

    let mut failed = 0;
    for file in files {
        if let Err(e) = tag_file(file, &incoming, mode, rename, no_dry_run) {
            failed += 1;
            error!(path = %file.display(), "tagging failed: {:#}", e);
            eprintln!("{}: {}: {:#}", "Error".red().bold(), file.display(), e);
        }
        println!();
    }

    if !no_dry_run && !quiet {
        println!("(dry-run) No files were changed. Use --no-dry-run to apply.");
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, files.len());
    }
    Ok(())
}

fn load_incoming(config: &Config, source: TagSource) -> Result<ComicInfo> {
    let record = match source {
        TagSource::ComicVine(id) => {
            let client = ComicVineClient::new(config.comicvine.clone())?;
            println!("Fetching ComicVine issue {}...", id);
            SourceRecord::ComicVine(fetch_issue_sync(&client, id)?)
        }
        TagSource::File(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            SourceRecord::from_local_json(&text)
                .with_context(|| format!("Failed to load metadata from {:?}", path))?
        }
    };
    Ok(map(record))
}

fn tag_file(
    file: &Path,
    incoming: &ComicInfo,
    mode: WriteMode,
    rename: bool,
    no_dry_run: bool,
) -> Result<()> {
    println!("{}", file.display().to_string().bold());

    let existing = match read_comic_info(file) {
        Ok(existing) => existing,
        Err(TagError::ParseError { reason, .. }) => {
            warn!(path = %file.display(), %reason, "existing ComicInfo.xml is unreadable");
            println!(
                "  {}: existing ComicInfo.xml is unreadable and will be replaced",
                "Warning".yellow()
            );
            None
        }
        Err(e) => return Err(e.into()),
    };

    let preview = reconcile(existing.clone(), incoming.clone(), mode);
    let changes = compute_changes(existing.as_ref(), &preview);
    println!("{}", format_diff(&file.display().to_string(), &changes));

    if !no_dry_run {
        if rename {
            describe_rename(file, &preview, false)?;
        }
        return Ok(());
    }

    let written = if changes.is_empty() {
        preview
    } else {
        let written = write_comic_info(file, incoming.clone(), mode)?;
        println!("  {} Wrote ComicInfo.xml", "✓".green());
        written
    };

    if rename {
        describe_rename(file, &written, true)?;
    }
    Ok(())
}

/// Print what renaming would do, performing it when `apply` is set
fn describe_rename(file: &Path, info: &ComicInfo, apply: bool) -> Result<()> {
    match plan_rename(file, info)? {
        RenamePlan::Unchanged => println!("  Filename already matches metadata"),
        RenamePlan::NoName => {
            println!("  {}: not enough metadata to derive a filename", "Note".yellow())
        }
        RenamePlan::Duplicate { dest } => println!(
            "  {}: identical file already exists at {}, not renaming",
            "Duplicate".yellow(),
            dest.display()
        ),
        RenamePlan::Rename { dest } => {
            if apply {
                std::fs::rename(file, &dest)
                    .with_context(|| format!("Failed to rename {:?} to {:?}", file, dest))?;
                println!("  {} Renamed to {}", "✓".green(), dest.display());
            } else {
                println!("  Would rename to {}", dest.display());
            }
        }
    }
    Ok(())
}
