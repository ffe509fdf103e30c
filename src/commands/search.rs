//! Search command - query ComicVine volumes and issues

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::cmp::Ordering;
use std::path::Path;

use crate::commands::check::print_pretty;
use crate::config::Config;
use crate::lookup::api::{fetch_issue_sync, fetch_volume_sync, search_volumes_sync, CvIssueRef};
use crate::lookup::mapper::strip_html;
use crate::lookup::{map, ComicVineClient, CvVolume, SourceRecord, VolumeQuery};

/// Summary lines shown per volume in the result list
const DESCRIPTION_PREVIEW_CHARS: usize = 160;

/// What to look up
pub enum SearchTarget {
    Volumes(VolumeQuery),
    Volume(u64),
    Issue(u64),
}

/// Run the search command
pub fn run(target: SearchTarget, quiet: bool) -> Result<()> {
    if let SearchTarget::Volumes(query) = &target {
        if query.is_empty() {
            bail!("Provide at least one of --series, --author, --title, --publisher, --year, --num-issues, --volume or --issue");
        }
    }

    let config = Config::load().context("Failed to load config")?;
    let client = ComicVineClient::new(config.comicvine)?;

    match target {
        SearchTarget::Issue(id) => {
            let issue = fetch_issue_sync(&client, id)?;
            let info = map(SourceRecord::ComicVine(issue));
            print_pretty(&info, Path::new(&format!("ComicVine issue {}", id)), quiet);
        }
        SearchTarget::Volume(id) => {
            let volume = fetch_volume_sync(&client, id)?;
            print_volume_details(&volume);
        }
        SearchTarget::Volumes(query) => {
            let volumes = search_volumes_sync(&client, &query)?;
            if volumes.is_empty() {
                println!("No volumes found.");
                return Ok(());
            }
            if !quiet {
                println!("Found {} volume(s):", volumes.len());
                println!();
            }
            for volume in &volumes {
                print_volume_summary(volume);
            }
        }
    }

    Ok(())
}

fn print_volume_summary(volume: &CvVolume) {
    let id = volume.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
    println!(
        "{} {} {}",
        volume.name.as_deref().unwrap_or("Unknown").bold(),
        format!("({})", volume.start_year.as_deref().unwrap_or("?")).dimmed(),
        format!("[volume {}]", id).cyan()
    );

    let publisher = volume
        .publisher
        .as_ref()
        .and_then(|p| p.name.as_deref())
        .unwrap_or("Unknown publisher");
    let issues = volume.count_of_issues.as_deref().unwrap_or("?");
    println!("  {} - {} issue(s)", publisher, issues);

    if let Some(description) = volume.description.as_deref().map(strip_html) {
        if !description.is_empty() {
            println!("  {}", preview(&description, DESCRIPTION_PREVIEW_CHARS).dimmed());
        }
    }
    println!();
}

fn print_volume_details(volume: &CvVolume) {
    print_volume_summary(volume);

    if let Some(url) = &volume.site_detail_url {
        println!("  {}", url);
        println!();
    }

    if volume.issues.is_empty() {
        return;
    }

    println!("{}", "Issues:".cyan());
    let mut issues: Vec<&CvIssueRef> = volume.issues.iter().collect();
    issues.sort_by(|a, b| compare_issue_numbers(a.issue_number.as_deref(), b.issue_number.as_deref()));
    for issue in issues {
        println!(
            "  #{:<6} {:<40} {}",
            issue.issue_number.as_deref().unwrap_or("?"),
            issue.name.as_deref().unwrap_or(""),
            issue
                .id
                .map(|id| format!("[issue {}]", id))
                .unwrap_or_default()
                .dimmed()
        );
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let truncated: String = single_line.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

/// Natural order for issue numbers: numeric values first ("2" < "10" < "10.5"),
/// then anything else alphabetically
fn compare_issue_numbers(a: Option<&str>, b: Option<&str>) -> Ordering {
    let key = |n: Option<&str>| {
        let n = n.unwrap_or("").trim();
        (n.parse::<f64>().ok(), n.to_lowercase())
    };
    let (num_a, text_a) = key(a);
    let (num_b, text_b) = key(b);
    match (num_a, num_b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => text_a.cmp(&text_b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_issue_numbers() {
        let mut numbers = vec![Some("10"), Some("2"), Some("1.5"), Some("Annual"), None, Some("1")];
        numbers.sort_by(|a, b| compare_issue_numbers(*a, *b));
        assert_eq!(
            numbers,
            vec![Some("1"), Some("1.5"), Some("2"), Some("10"), None, Some("Annual")]
        );
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("a longer line of text", 10), "a longe...");
    }
}
