use crate::metadata::ComicInfo;
use regex::Regex;
use std::sync::LazyLock;

/// Filenames are capped at this many bytes, extension included
pub const MAX_FILENAME_BYTES: usize = 255;

/// Shown by the `fields` command
pub const FILENAME_TEMPLATE: &str = "{Series} V{Volume} #{Number} ({Year}) - {Title}.cbz";

const DEFAULT_EXTENSION: &str = "cbz";
const TITLE_SEPARATOR: &str = " - ";

static ISSUE_ONLY_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:issue\s*)?#\s*[\w.\-]+$").expect("valid regex")
});

/// Sanitized name segments, each `None` when absent
#[derive(Debug, Clone, Default)]
struct Segments {
    series: Option<String>,
    volume: Option<String>,
    number: Option<String>,
    year: Option<String>,
    title: Option<String>,
}

impl Segments {
    fn from_record(info: &ComicInfo) -> Self {
        let series = info.series.as_deref().and_then(sanitize_component);
        let title = info
            .title
            .as_deref()
            .and_then(sanitize_component)
            .filter(|title| !is_redundant_title(title, series.as_deref()));

        Self {
            volume: info.volume.as_deref().and_then(sanitize_component),
            number: info.number.as_deref().and_then(sanitize_component),
            year: info.year.as_deref().and_then(sanitize_component),
            series,
            title,
        }
    }

    /// `{Series} V{Volume} #{Number} ({Year})`, empty segments collapsed
    fn head(&self) -> String {
        let mut parts = Vec::new();
        if let Some(series) = &self.series {
            parts.push(series.clone());
        }
        if let Some(volume) = &self.volume {
            parts.push(format!("V{}", volume));
        }
        if let Some(number) = &self.number {
            parts.push(format!("#{}", number));
        }
        if let Some(year) = &self.year {
            parts.push(format!("({})", year));
        }
        parts.join(" ")
    }

    fn stem(&self) -> Option<String> {
        let head = self.head();
        let stem = match (&self.title, head.is_empty()) {
            (Some(title), true) => title.clone(),
            (Some(title), false) => format!("{}{}{}", head, TITLE_SEPARATOR, title),
            (None, _) => head,
        };
        if stem.is_empty() {
            None
        } else {
            Some(stem)
        }
    }

    fn render(&self, ext: &str) -> Option<String> {
        self.stem().map(|stem| format!("{}.{}", stem, ext))
    }
}

/// A title that only repeats the series or the issue number adds nothing
fn is_redundant_title(title: &str, series: Option<&str>) -> bool {
    if series.is_some_and(|s| s.to_lowercase() == title.to_lowercase()) {
        return true;
    }
    ISSUE_ONLY_TITLE.is_match(title)
}

/// Derive a `.cbz` filename from a record, or `None` if nothing usable is set
pub fn derive_filename(info: &ComicInfo) -> Option<String> {
    derive_filename_with_extension(info, DEFAULT_EXTENSION)
}

/// Derive a filename with the given extension (with or without a leading dot)
pub fn derive_filename_with_extension(info: &ComicInfo, ext: &str) -> Option<String> {
    derive_filename_within(info, ext, MAX_FILENAME_BYTES)
}

/// Like [`derive_filename_with_extension`], capped at `max_bytes` instead of
/// [`MAX_FILENAME_BYTES`] so a caller can reserve room for a suffix
pub fn derive_filename_within(info: &ComicInfo, ext: &str, max_bytes: usize) -> Option<String> {
    let ext = sanitize_component(ext).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    fit(Segments::from_record(info), &ext, max_bytes.min(MAX_FILENAME_BYTES))
}

/// Shrink the name until it fits: truncate the title, then drop the year
/// and volume, then shorten the series keeping the issue number
fn fit(mut segments: Segments, ext: &str, max: usize) -> Option<String> {
    let full = segments.render(ext)?;
    if full.len() <= max {
        return Some(full);
    }

    if let Some(title) = segments.title.take() {
        let overhead = match segments.render(ext) {
            Some(base) => base.len() + TITLE_SEPARATOR.len(),
            None => ext.len() + 1,
        };
        if overhead < max {
            let truncated = trim_edges(truncate_bytes(&title, max - overhead));
            if !truncated.is_empty() {
                segments.title = Some(truncated.to_string());
                return segments.render(ext);
            }
        }
    }

    segments.year = None;
    if let Some(name) = segments.render(ext).filter(|n| n.len() <= max) {
        return Some(name);
    }

    segments.volume = None;
    if let Some(name) = segments.render(ext).filter(|n| n.len() <= max) {
        return Some(name);
    }

    // Only series and number are left
    if let Some(series) = segments.series.take() {
        let rest = segments.render(ext).map_or(ext.len() + 1, |n| n.len() + 1);
        if rest < max {
            let cut = trim_edges(truncate_bytes(&series, max - rest));
            if !cut.is_empty() {
                segments.series = Some(cut.to_string());
                return segments.render(ext);
            }
        }
    }

    let stem = segments.stem()?;
    let budget = max.saturating_sub(ext.len() + 1);
    let stem = trim_edges(truncate_bytes(&stem, budget));
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}.{}", stem, ext))
}

/// Longest prefix of at most `max` bytes ending on a char boundary
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

/// Sanitize a string for use in a filename
///
/// Reserved punctuation becomes `_`, control characters are removed,
/// whitespace runs collapse and the edges lose whitespace and periods.
fn sanitize_component(s: &str) -> Option<String> {
    let replaced: String = s
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => ' ',
            c => c,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = trim_edges(&collapsed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
