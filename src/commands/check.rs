use crate::metadata::{read_comic_info, ComicInfo, Field, ScalarField, SCHEMA_ORDER};
use crate::organize::{derive_filename, scan_paths};
use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Serialize)]
struct CheckReport<'a> {
    path: &'a Path,
    comic_info: Option<&'a ComicInfo>,
    error: Option<String>,
}

pub fn run(paths: &[PathBuf], json: bool, quiet: bool) -> Result<()> {
    let scan = scan_paths(paths);

    for path in &scan.skipped {
        if !quiet {
            eprintln!("{}: skipping non-CBZ file {}", "Note".yellow(), path.display());
        }
    }
    for path in &scan.missing {
        eprintln!("{}: path not found: {}", "Error".red().bold(), path.display());
    }

    if scan.archives.is_empty() && scan.missing.is_empty() {
        bail!("No CBZ files found");
    }

    let mut failed = scan.missing.len();
    let mut tagged = 0;
    let mut untagged = 0;
    let mut results = Vec::new();

    for path in &scan.archives {
        match read_comic_info(path) {
            Ok(info) => {
                if info.is_some() {
                    tagged += 1;
                } else {
                    untagged += 1;
                }
                results.push((path, Ok(info)));
            }
            Err(e) => {
                error!(path = %path.display(), "check failed: {}", e);
                failed += 1;
                results.push((path, Err(e.to_string())));
            }
        }
    }

    if json {
        let reports: Vec<CheckReport> = results
            .iter()
            .map(|(path, result)| CheckReport {
                path,
                comic_info: result.as_ref().ok().and_then(|info| info.as_ref()),
                error: result.as_ref().err().cloned(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (path, result) in &results {
            match result {
                Ok(Some(info)) => print_pretty(info, path, quiet),
                Ok(None) => {
                    println!("{}", path.display().to_string().bold());
                    println!("  {}", "No ComicInfo.xml found".yellow());
                    println!();
                }
                Err(e) => eprintln!("{}: {}", "Error".red().bold(), e),
            }
        }

        if !quiet {
            println!(
                "Checked {} CBZ file(s): {} with ComicInfo.xml, {} without",
                scan.archives.len(),
                tagged,
                untagged
            );
        }
    }

    if failed > 0 {
        bail!("{} path(s) could not be checked", failed);
    }
    Ok(())
}

/// Print a record with one line per populated field; Summary and Notes are
/// wrapped below the table
pub fn print_pretty(info: &ComicInfo, path: &Path, quiet: bool) {
    if !quiet {
        println!("{}", path.display().to_string().bold());
        println!("{}", "─".repeat(40));
    }

    for field in SCHEMA_ORDER {
        if matches!(
            field,
            Field::Scalar(ScalarField::Summary) | Field::Scalar(ScalarField::Notes)
        ) {
            continue;
        }
        print_field(field.tag(), info.display_value(*field).as_deref());
    }

    if let Some(name) = derive_filename(info) {
        print_field("Filename", Some(&name));
    }

    for (label, text) in [("Summary:", &info.summary), ("Notes:", &info.notes)] {
        if let Some(text) = text {
            println!();
            println!("{}", label.cyan());
            for line in textwrap_simple(text, 80) {
                println!("  {}", line);
            }
        }
    }
    println!();
}

fn print_field(label: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("{:>12}: {}", label.cyan(), v);
    }
}

/// Simple text wrapping without external dependency
fn textwrap_simple(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();

        for word in paragraph.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }
    lines
}
