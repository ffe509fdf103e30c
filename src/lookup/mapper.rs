//! Translating provider and local documents into a ComicInfo record

use crate::error::{Result, TagError};
use crate::lookup::api::{CvCredit, CvIssue, CvNamed};
use crate::metadata::{ComicInfo, Field, ListField, ScalarField};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// A metadata document from one of the supported sources
#[derive(Debug, Clone)]
pub enum SourceRecord {
    ComicVine(CvIssue),
    Local(Value),
}

impl SourceRecord {
    /// Parse a local JSON document
    ///
    /// A saved ComicVine response (an object with a `results` object) is
    /// read as a ComicVine issue; any other object is a free-form document.
    pub fn from_local_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TagError::ValidationError(format!("metadata file is not valid JSON: {}", e)))?;

        let Value::Object(object) = value else {
            return Err(TagError::ValidationError(
                "metadata file must contain a JSON object".to_string(),
            ));
        };

        if let Some(results @ Value::Object(_)) = object.get("results") {
            let issue: CvIssue = serde_json::from_value(results.clone()).map_err(|e| {
                TagError::ValidationError(format!("saved ComicVine response is malformed: {}", e))
            })?;
            return Ok(SourceRecord::ComicVine(issue));
        }

        Ok(SourceRecord::Local(Value::Object(object)))
    }
}

/// Build a record from a source document; absent data yields absent fields
pub fn map(source: SourceRecord) -> ComicInfo {
    match source {
        SourceRecord::ComicVine(issue) => map_comicvine(&issue),
        SourceRecord::Local(Value::Object(object)) => map_local(&object),
        SourceRecord::Local(other) => {
            warn!("ignoring non-object local document: {}", other);
            ComicInfo::default()
        }
    }
}

// ============================================================================
// Credits
// ============================================================================

const ROLE_SYNONYMS: &[(&str, ListField)] = &[
    ("writer", ListField::Writer),
    ("plotter", ListField::Writer),
    ("scripter", ListField::Writer),
    ("script", ListField::Writer),
    ("story", ListField::Writer),
    ("penciler", ListField::Penciller),
    ("penciller", ListField::Penciller),
    ("pencils", ListField::Penciller),
    ("pencil", ListField::Penciller),
    ("pencils artist", ListField::Penciller),
    ("artist", ListField::Penciller),
    ("art", ListField::Penciller),
    ("inker", ListField::Inker),
    ("inks", ListField::Inker),
    ("ink", ListField::Inker),
    ("colorist", ListField::Colorist),
    ("colourist", ListField::Colorist),
    ("colors", ListField::Colorist),
    ("colours", ListField::Colorist),
    ("color", ListField::Colorist),
    ("letterer", ListField::Letterer),
    ("letters", ListField::Letterer),
    ("lettering", ListField::Letterer),
    ("cover", ListField::CoverArtist),
    ("covers", ListField::CoverArtist),
    ("cover artist", ListField::CoverArtist),
    ("editor", ListField::Editor),
    ("editor in chief", ListField::Editor),
    ("assistant editor", ListField::Editor),
];

/// Buckets a role string maps to, e.g. "writer, cover" -> [Writer, CoverArtist]
fn role_buckets(role: &str) -> Vec<ListField> {
    let mut buckets = Vec::new();
    for token in role.split([',', '/', ';']) {
        let token = token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if let Some((_, field)) = ROLE_SYNONYMS.iter().find(|(synonym, _)| *synonym == token) {
            if !buckets.contains(field) {
                buckets.push(*field);
            }
        }
    }
    buckets
}

fn apply_credits<'a>(info: &mut ComicInfo, credits: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let mut unassigned = Vec::new();

    for (name, role) in credits {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let buckets = role_buckets(role);
        if buckets.is_empty() {
            let role = role.trim();
            if role.is_empty() {
                unassigned.push(name.to_string());
            } else {
                unassigned.push(format!("{} ({})", name, role));
            }
            continue;
        }
        for field in buckets {
            info.push_list(field, name);
        }
    }

    if !unassigned.is_empty() {
        info.add_note(&format!("Other credits: {}", unassigned.join(", ")));
    }
}

// ============================================================================
// ComicVine
// ============================================================================

fn map_comicvine(issue: &CvIssue) -> ComicInfo {
    let mut info = ComicInfo::default();

    info.set_scalar(ScalarField::Title, issue.name.as_deref());
    info.set_scalar(ScalarField::Number, issue.issue_number.as_deref());
    info.set_scalar(ScalarField::Web, issue.site_detail_url.as_deref());

    if let Some(description) = issue.description.as_deref() {
        info.set_scalar(ScalarField::Summary, Some(&strip_html(description)));
    }
    if let Some(deck) = issue.deck.as_deref().map(strip_html).filter(|d| !d.is_empty()) {
        info.add_note(&format!("Deck: {}", deck));
    }
    if let Some(aliases) = issue.aliases.as_deref() {
        let aliases: Vec<&str> = aliases.lines().map(str::trim).filter(|a| !a.is_empty()).collect();
        if !aliases.is_empty() {
            info.add_note(&format!("Aliases: {}", aliases.join(", ")));
        }
    }

    if let Some(cover_date) = issue.cover_date.as_deref() {
        apply_cover_date(&mut info, cover_date);
    }
    if let Some(store_date) = issue.store_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        if issue.cover_date.as_deref().map(str::trim) != Some(store_date) {
            info.add_note(&format!("Store Date: {}", store_date));
        }
    }

    if let Some(volume) = &issue.volume {
        info.set_scalar(ScalarField::Series, volume.name.as_deref());
        info.set_scalar(
            ScalarField::Publisher,
            volume.publisher.as_ref().and_then(|p| p.name.as_deref()),
        );
        info.set_scalar(ScalarField::Count, volume.count_of_issues.as_deref());
        if info.year.is_none() {
            info.set_scalar(ScalarField::Year, volume.start_year.as_deref());
        }
    }

    apply_credits(
        &mut info,
        issue.person_credits.iter().map(|CvCredit { name, role }| {
            (name.as_deref().unwrap_or(""), role.as_deref().unwrap_or(""))
        }),
    );

    info.set_list(ListField::Characters, names(&issue.character_credits));
    info.set_list(ListField::Teams, names(&issue.team_credits));
    info.set_list(ListField::Locations, names(&issue.location_credits));
    info.set_list(ListField::StoryArc, names(&issue.story_arc_credits));
    info.set_list(ListField::Genre, names(&issue.concept_credits));

    let objects = names(&issue.object_credits);
    if !objects.is_empty() {
        info.add_note(&format!("Objects: {}", objects.join(", ")));
    }

    debug!(id = ?issue.id, "mapped ComicVine issue");
    info
}

fn names(items: &[CvNamed]) -> Vec<&str> {
    items
        .iter()
        .filter_map(|item| item.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect()
}

/// Split a `YYYY-MM-DD`, `YYYY-MM` or `YYYY` date into Year/Month/Day
///
/// The parts are copied as written once chrono accepts the date.
fn apply_cover_date(info: &mut ComicInfo, raw: &str) {
    let date = raw.split_whitespace().next().unwrap_or("");
    let parts: Vec<&str> = date.split('-').collect();

    let valid = match parts.as_slice() {
        [_, _, _] => NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok(),
        [_, _] => NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d").is_ok(),
        [year] => year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };

    if !valid {
        warn!("skipping unparseable cover date '{}'", raw);
        return;
    }

    let fields = [ScalarField::Year, ScalarField::Month, ScalarField::Day];
    for (field, part) in fields.iter().zip(parts) {
        info.set_scalar(*field, Some(part));
    }
}

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(br|/p|/div|/h[1-6]|/li|/tr)\s*/?>").expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Reduce provider HTML to plain text, one paragraph per line
pub(crate) fn strip_html(html: &str) -> String {
    let text = BLOCK_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Local documents
// ============================================================================

const LOCAL_ALIASES: &[(&str, Field)] = &[
    ("issue", Field::Scalar(ScalarField::Number)),
    ("issue_number", Field::Scalar(ScalarField::Number)),
    ("count_of_issues", Field::Scalar(ScalarField::Count)),
    ("issue_count", Field::Scalar(ScalarField::Count)),
    ("description", Field::Scalar(ScalarField::Summary)),
    ("language", Field::Scalar(ScalarField::LanguageIso)),
    ("language_iso", Field::Scalar(ScalarField::LanguageIso)),
    ("url", Field::Scalar(ScalarField::Web)),
    ("web_link", Field::Scalar(ScalarField::Web)),
    ("site_detail_url", Field::Scalar(ScalarField::Web)),
    ("page_count", Field::Scalar(ScalarField::PageCount)),
    ("pages", Field::Scalar(ScalarField::PageCount)),
    ("writers", Field::List(ListField::Writer)),
    ("penciler", Field::List(ListField::Penciller)),
    ("pencillers", Field::List(ListField::Penciller)),
    ("inkers", Field::List(ListField::Inker)),
    ("colorists", Field::List(ListField::Colorist)),
    ("letterers", Field::List(ListField::Letterer)),
    ("cover_artist", Field::List(ListField::CoverArtist)),
    ("cover_artists", Field::List(ListField::CoverArtist)),
    ("editors", Field::List(ListField::Editor)),
    ("genres", Field::List(ListField::Genre)),
    ("team", Field::List(ListField::Teams)),
    ("location", Field::List(ListField::Locations)),
    ("story_arc", Field::List(ListField::StoryArc)),
    ("story_arcs", Field::List(ListField::StoryArc)),
];

const CREDIT_KEYS: &[&str] = &["credits", "person_credits"];

fn local_field(key: &str) -> Option<Field> {
    Field::from_tag(key).or_else(|| {
        LOCAL_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
            .map(|(_, field)| *field)
    })
}

fn map_local(object: &Map<String, Value>) -> ComicInfo {
    let mut info = ComicInfo::default();
    let mut extra = Vec::new();

    for (key, value) in object {
        if CREDIT_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            let credits = local_credits(value);
            apply_credits(
                &mut info,
                credits.iter().map(|(name, role)| (name.as_str(), role.as_str())),
            );
            continue;
        }

        match local_field(key) {
            Some(Field::Scalar(ScalarField::Notes)) => {
                if let Some(text) = value_text(value) {
                    info.add_note(&text);
                }
            }
            Some(Field::Scalar(field)) => {
                if let Some(text) = value_text(value) {
                    info.set_scalar(field, Some(&text));
                }
            }
            Some(Field::List(field)) => {
                for item in value_items(value) {
                    info.push_list(field, &item);
                }
            }
            None => {
                if let Some(text) = value_text(value) {
                    extra.push(format!("{}: {}", key, text));
                }
            }
        }
    }

    for line in extra {
        info.add_note(&line);
    }

    info
}

/// Stringify a JSON value; arrays join with ", ", objects use their `name`
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(object) => return object.get("name").and_then(value_text),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Items for a list field; a plain string is split on commas
fn value_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        Value::String(s) => s.split(',').map(|s| s.trim().to_string()).collect(),
        other => value_text(other).into_iter().collect(),
    }
}

fn local_credits(value: &Value) -> Vec<(String, String)> {
    let Value::Array(items) = value else {
        warn!("ignoring credits that are not an array");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(value_text)?;
            let role = item.get("role").and_then(value_text).unwrap_or_default();
            Some((name, role))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::api::CvVolumeRef;

    fn credit(name: &str, role: &str) -> CvCredit {
        CvCredit {
            name: Some(name.to_string()),
            role: Some(role.to_string()),
        }
    }

    fn named(name: &str) -> CvNamed {
        CvNamed {
            name: Some(name.to_string()),
        }
    }

    fn sandman_issue() -> CvIssue {
        CvIssue {
            id: Some(42),
            name: Some("Sleep of the Just".to_string()),
            issue_number: Some("1".to_string()),
            site_detail_url: Some("https://comicvine.gamespot.com/sandman-1/4000-42/".to_string()),
            cover_date: Some("1989-01-01".to_string()),
            store_date: Some("1988-11-29".to_string()),
            description: Some("<p>Morpheus is <b>captured</b>.</p><p>Tom &amp; Jerry</p>".to_string()),
            deck: Some("The first issue".to_string()),
            volume: Some(CvVolumeRef {
                name: Some("The Sandman".to_string()),
                publisher: Some(named("DC Comics")),
                count_of_issues: Some("75".to_string()),
                start_year: Some("1989".to_string()),
            }),
            person_credits: vec![
                credit("Neil Gaiman", "writer"),
                credit("Sam Kieth", "penciler"),
                credit("Mike Dringenberg", "inker, penciler"),
                credit("Dave McKean", "cover"),
                credit("Karen Berger", "editor"),
                credit("Todd Klein", "letterer"),
                credit("Someone", "production"),
            ],
            character_credits: vec![named("Morpheus"), named("Death")],
            concept_credits: vec![named("Horror")],
            object_credits: vec![named("Helm"), named("Ruby")],
            ..CvIssue::default()
        }
    }

    #[test]
    fn test_map_comicvine_issue() {
        let info = map(SourceRecord::ComicVine(sandman_issue()));

        assert_eq!(info.title.as_deref(), Some("Sleep of the Just"));
        assert_eq!(info.series.as_deref(), Some("The Sandman"));
        assert_eq!(info.number.as_deref(), Some("1"));
        assert_eq!(info.count.as_deref(), Some("75"));
        assert_eq!(info.publisher.as_deref(), Some("DC Comics"));
        assert_eq!(info.year.as_deref(), Some("1989"));
        assert_eq!(info.month.as_deref(), Some("01"));
        assert_eq!(info.day.as_deref(), Some("01"));
        assert_eq!(
            info.summary.as_deref(),
            Some("Morpheus is captured.\nTom & Jerry")
        );
        assert_eq!(info.writer, vec!["Neil Gaiman"]);
        assert_eq!(info.penciller, vec!["Sam Kieth", "Mike Dringenberg"]);
        assert_eq!(info.inker, vec!["Mike Dringenberg"]);
        assert_eq!(info.cover_artist, vec!["Dave McKean"]);
        assert_eq!(info.editor, vec!["Karen Berger"]);
        assert_eq!(info.letterer, vec!["Todd Klein"]);
        assert_eq!(info.characters, vec!["Morpheus", "Death"]);
        assert_eq!(info.genre, vec!["Horror"]);

        let notes = info.notes.unwrap();
        assert!(notes.contains("Deck: The first issue"));
        assert!(notes.contains("Store Date: 1988-11-29"));
        assert!(notes.contains("Other credits: Someone (production)"));
        assert!(notes.contains("Objects: Helm, Ruby"));
    }

    #[test]
    fn test_map_sparse_issue() {
        let issue = CvIssue {
            issue_number: Some("3".to_string()),
            ..CvIssue::default()
        };
        let info = map(SourceRecord::ComicVine(issue));
        assert_eq!(info.number.as_deref(), Some("3"));
        assert!(info.series.is_none());
        assert!(info.notes.is_none());
        assert!(info.writer.is_empty());
    }

    #[test]
    fn test_year_falls_back_to_volume_start() {
        let issue = CvIssue {
            cover_date: Some("sometime".to_string()),
            volume: Some(CvVolumeRef {
                start_year: Some("2012".to_string()),
                ..CvVolumeRef::default()
            }),
            ..CvIssue::default()
        };
        let info = map(SourceRecord::ComicVine(issue));
        assert_eq!(info.year.as_deref(), Some("2012"));
        assert!(info.month.is_none());
    }

    #[test]
    fn test_partial_cover_dates() {
        let mut info = ComicInfo::default();
        apply_cover_date(&mut info, "2012-03");
        assert_eq!(info.year.as_deref(), Some("2012"));
        assert_eq!(info.month.as_deref(), Some("03"));
        assert!(info.day.is_none());

        let mut info = ComicInfo::default();
        apply_cover_date(&mut info, "1989-02-30");
        assert!(info.year.is_none());
    }

    #[test]
    fn test_same_store_date_is_not_noted() {
        let issue = CvIssue {
            cover_date: Some("2012-03-14".to_string()),
            store_date: Some("2012-03-14".to_string()),
            ..CvIssue::default()
        };
        let info = map(SourceRecord::ComicVine(issue));
        assert!(info.notes.is_none());
    }

    #[test]
    fn test_role_buckets() {
        assert_eq!(role_buckets("Writer"), vec![ListField::Writer]);
        assert_eq!(
            role_buckets("pencils / inks; Colours"),
            vec![ListField::Penciller, ListField::Inker, ListField::Colorist]
        );
        assert_eq!(role_buckets("Cover  Artist"), vec![ListField::CoverArtist]);
        assert_eq!(role_buckets("editor in chief"), vec![ListField::Editor]);
        assert!(role_buckets("translator").is_empty());
        assert!(role_buckets("").is_empty());
    }

    #[test]
    fn test_map_local_document() {
        let source = SourceRecord::from_local_json(
            r#"{
                "Series": "Saga",
                "issue": 1,
                "language": "en",
                "url": "https://example.com/saga-1",
                "characters": ["Alana", "Marko"],
                "Genre": "Sci-Fi, Fantasy",
                "credits": [
                    {"name": "Brian K. Vaughan", "role": "Writer"},
                    {"name": "Fiona Staples", "role": "Artist/Cover"},
                    {"name": "Eric Stephenson", "role": "Publisher"}
                ],
                "rating": 5,
                "nothing": null
            }"#,
        )
        .unwrap();

        let info = map(source);
        assert_eq!(info.series.as_deref(), Some("Saga"));
        assert_eq!(info.number.as_deref(), Some("1"));
        assert_eq!(info.language_iso.as_deref(), Some("en"));
        assert_eq!(info.web.as_deref(), Some("https://example.com/saga-1"));
        assert_eq!(info.characters, vec!["Alana", "Marko"]);
        assert_eq!(info.genre, vec!["Sci-Fi", "Fantasy"]);
        assert_eq!(info.writer, vec!["Brian K. Vaughan"]);
        assert_eq!(info.penciller, vec!["Fiona Staples"]);
        assert_eq!(info.cover_artist, vec!["Fiona Staples"]);

        let notes = info.notes.unwrap();
        assert!(notes.contains("Other credits: Eric Stephenson (Publisher)"));
        assert!(notes.contains("rating: 5"));
        assert!(!notes.contains("nothing"));
    }

    #[test]
    fn test_saved_comicvine_response_is_comicvine() {
        let source = SourceRecord::from_local_json(
            r#"{"error": "OK", "status_code": 1, "results": {"name": "Pilot", "issue_number": "1"}}"#,
        )
        .unwrap();
        assert!(matches!(source, SourceRecord::ComicVine(_)));
        assert_eq!(map(source).title.as_deref(), Some("Pilot"));
    }

    #[test]
    fn test_local_document_keeps_key_order() {
        let source = SourceRecord::from_local_json(
            r#"{"zeta": "last letter", "writers": ["Brian K. Vaughan"], "alpha": 1, "writer": "Fiona Staples"}"#,
        )
        .unwrap();
        let info = map(source);

        assert_eq!(info.writer, vec!["Brian K. Vaughan", "Fiona Staples"]);
        assert_eq!(info.notes.as_deref(), Some("zeta: last letter\nalpha: 1"));
    }

    #[test]
    fn test_local_document_must_be_object() {
        assert!(matches!(
            SourceRecord::from_local_json("[1, 2, 3]"),
            Err(TagError::ValidationError(_))
        ));
        assert!(matches!(
            SourceRecord::from_local_json("not json"),
            Err(TagError::ValidationError(_))
        ));
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<h2>Intro</h2><p>A&nbsp;line<br/>next  line</p>"),
            "Intro\nA line\nnext line"
        );
        assert_eq!(strip_html("plain"), "plain");
    }
}
