use serde::Serialize;

/// Single-valued ComicInfo elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Title,
    Series,
    Number,
    Count,
    Volume,
    Summary,
    Notes,
    Year,
    Month,
    Day,
    Publisher,
    Web,
    PageCount,
    LanguageIso,
}

/// Comma-separated ComicInfo elements, held in memory as ordered lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListField {
    Writer,
    Penciller,
    Inker,
    Colorist,
    Letterer,
    CoverArtist,
    Editor,
    Genre,
    Characters,
    Teams,
    Locations,
    StoryArc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Scalar(ScalarField),
    List(ListField),
}

/// Element order used when writing ComicInfo.xml and when displaying a record
pub const SCHEMA_ORDER: &[Field] = &[
    Field::Scalar(ScalarField::Title),
    Field::Scalar(ScalarField::Series),
    Field::Scalar(ScalarField::Number),
    Field::Scalar(ScalarField::Count),
    Field::Scalar(ScalarField::Volume),
    Field::Scalar(ScalarField::Summary),
    Field::Scalar(ScalarField::Notes),
    Field::Scalar(ScalarField::Year),
    Field::Scalar(ScalarField::Month),
    Field::Scalar(ScalarField::Day),
    Field::List(ListField::Writer),
    Field::List(ListField::Penciller),
    Field::List(ListField::Inker),
    Field::List(ListField::Colorist),
    Field::List(ListField::Letterer),
    Field::List(ListField::CoverArtist),
    Field::List(ListField::Editor),
    Field::Scalar(ScalarField::Publisher),
    Field::List(ListField::Genre),
    Field::Scalar(ScalarField::Web),
    Field::Scalar(ScalarField::PageCount),
    Field::Scalar(ScalarField::LanguageIso),
    Field::List(ListField::Characters),
    Field::List(ListField::Teams),
    Field::List(ListField::Locations),
    Field::List(ListField::StoryArc),
];

impl ScalarField {
    pub const ALL: [ScalarField; 14] = [
        ScalarField::Title,
        ScalarField::Series,
        ScalarField::Number,
        ScalarField::Count,
        ScalarField::Volume,
        ScalarField::Summary,
        ScalarField::Notes,
        ScalarField::Year,
        ScalarField::Month,
        ScalarField::Day,
        ScalarField::Publisher,
        ScalarField::Web,
        ScalarField::PageCount,
        ScalarField::LanguageIso,
    ];

    /// Element name inside ComicInfo.xml
    pub fn tag(self) -> &'static str {
        match self {
            ScalarField::Title => "Title",
            ScalarField::Series => "Series",
            ScalarField::Number => "Number",
            ScalarField::Count => "Count",
            ScalarField::Volume => "Volume",
            ScalarField::Summary => "Summary",
            ScalarField::Notes => "Notes",
            ScalarField::Year => "Year",
            ScalarField::Month => "Month",
            ScalarField::Day => "Day",
            ScalarField::Publisher => "Publisher",
            ScalarField::Web => "Web",
            ScalarField::PageCount => "PageCount",
            ScalarField::LanguageIso => "LanguageISO",
        }
    }
}

impl ListField {
    pub const ALL: [ListField; 12] = [
        ListField::Writer,
        ListField::Penciller,
        ListField::Inker,
        ListField::Colorist,
        ListField::Letterer,
        ListField::CoverArtist,
        ListField::Editor,
        ListField::Genre,
        ListField::Characters,
        ListField::Teams,
        ListField::Locations,
        ListField::StoryArc,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ListField::Writer => "Writer",
            ListField::Penciller => "Penciller",
            ListField::Inker => "Inker",
            ListField::Colorist => "Colorist",
            ListField::Letterer => "Letterer",
            ListField::CoverArtist => "CoverArtist",
            ListField::Editor => "Editor",
            ListField::Genre => "Genre",
            ListField::Characters => "Characters",
            ListField::Teams => "Teams",
            ListField::Locations => "Locations",
            ListField::StoryArc => "StoryArc",
        }
    }
}

impl Field {
    pub fn tag(self) -> &'static str {
        match self {
            Field::Scalar(f) => f.tag(),
            Field::List(f) => f.tag(),
        }
    }

    /// Look up a field by its element name (case-insensitive)
    pub fn from_tag(tag: &str) -> Option<Field> {
        SCHEMA_ORDER
            .iter()
            .copied()
            .find(|f| f.tag().eq_ignore_ascii_case(tag))
    }
}

/// Comic issue metadata as stored in an archive's ComicInfo.xml
///
/// The field set is closed: anything not representable here is never written.
/// Scalars are kept as strings so issue numbers like "001" or "½" survive
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ComicInfo {
    pub title: Option<String>,
    pub series: Option<String>,
    pub number: Option<String>,
    /// Number of issues in the volume
    pub count: Option<String>,
    pub volume: Option<String>,
    pub summary: Option<String>,
    /// Free-form notes, also the landing spot for source data with no field of its own
    pub notes: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub publisher: Option<String>,
    pub web: Option<String>,
    pub page_count: Option<String>,
    pub language_iso: Option<String>,

    pub writer: Vec<String>,
    pub penciller: Vec<String>,
    pub inker: Vec<String>,
    pub colorist: Vec<String>,
    pub letterer: Vec<String>,
    pub cover_artist: Vec<String>,
    pub editor: Vec<String>,
    pub genre: Vec<String>,
    pub characters: Vec<String>,
    pub teams: Vec<String>,
    pub locations: Vec<String>,
    pub story_arc: Vec<String>,
}

impl ComicInfo {
    pub fn scalar(&self, field: ScalarField) -> Option<&str> {
        let value = match field {
            ScalarField::Title => &self.title,
            ScalarField::Series => &self.series,
            ScalarField::Number => &self.number,
            ScalarField::Count => &self.count,
            ScalarField::Volume => &self.volume,
            ScalarField::Summary => &self.summary,
            ScalarField::Notes => &self.notes,
            ScalarField::Year => &self.year,
            ScalarField::Month => &self.month,
            ScalarField::Day => &self.day,
            ScalarField::Publisher => &self.publisher,
            ScalarField::Web => &self.web,
            ScalarField::PageCount => &self.page_count,
            ScalarField::LanguageIso => &self.language_iso,
        };
        value.as_deref()
    }

    fn scalar_slot(&mut self, field: ScalarField) -> &mut Option<String> {
        match field {
            ScalarField::Title => &mut self.title,
            ScalarField::Series => &mut self.series,
            ScalarField::Number => &mut self.number,
            ScalarField::Count => &mut self.count,
            ScalarField::Volume => &mut self.volume,
            ScalarField::Summary => &mut self.summary,
            ScalarField::Notes => &mut self.notes,
            ScalarField::Year => &mut self.year,
            ScalarField::Month => &mut self.month,
            ScalarField::Day => &mut self.day,
            ScalarField::Publisher => &mut self.publisher,
            ScalarField::Web => &mut self.web,
            ScalarField::PageCount => &mut self.page_count,
            ScalarField::LanguageIso => &mut self.language_iso,
        }
    }

    /// Set a scalar, trimming it. Blank values clear the field.
    pub fn set_scalar(&mut self, field: ScalarField, value: Option<&str>) {
        *self.scalar_slot(field) = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Writer => &self.writer,
            ListField::Penciller => &self.penciller,
            ListField::Inker => &self.inker,
            ListField::Colorist => &self.colorist,
            ListField::Letterer => &self.letterer,
            ListField::CoverArtist => &self.cover_artist,
            ListField::Editor => &self.editor,
            ListField::Genre => &self.genre,
            ListField::Characters => &self.characters,
            ListField::Teams => &self.teams,
            ListField::Locations => &self.locations,
            ListField::StoryArc => &self.story_arc,
        }
    }

    fn list_slot(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Writer => &mut self.writer,
            ListField::Penciller => &mut self.penciller,
            ListField::Inker => &mut self.inker,
            ListField::Colorist => &mut self.colorist,
            ListField::Letterer => &mut self.letterer,
            ListField::CoverArtist => &mut self.cover_artist,
            ListField::Editor => &mut self.editor,
            ListField::Genre => &mut self.genre,
            ListField::Characters => &mut self.characters,
            ListField::Teams => &mut self.teams,
            ListField::Locations => &mut self.locations,
            ListField::StoryArc => &mut self.story_arc,
        }
    }

    /// Append to a list field unless an equal entry (ignoring case) is already there
    pub fn push_list(&mut self, field: ListField, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let list = self.list_slot(field);
        if !list.iter().any(|v| v.to_lowercase() == value.to_lowercase()) {
            list.push(value.to_string());
        }
    }

    /// Replace a list field, keeping first-seen order and dropping duplicates
    pub fn set_list<I, S>(&mut self, field: ListField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.list_slot(field).clear();
        for value in values {
            self.push_list(field, value.as_ref());
        }
    }

    /// Append a line to Notes
    pub fn add_note(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let notes = match self.notes.take() {
            Some(existing) => format!("{}\n{}", existing, line),
            None => line.to_string(),
        };
        self.notes = Some(notes);
    }

    /// Display value of any field; list fields are joined the way they are stored
    pub fn display_value(&self, field: Field) -> Option<String> {
        match field {
            Field::Scalar(f) => self.scalar(f).map(String::from),
            Field::List(f) => {
                let list = self.list(f);
                if list.is_empty() {
                    None
                } else {
                    Some(list.join(", "))
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        ScalarField::ALL.iter().all(|f| self.scalar(*f).is_none())
            && ListField::ALL.iter().all(|f| self.list(*f).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_covers_every_field_once() {
        assert_eq!(
            SCHEMA_ORDER.len(),
            ScalarField::ALL.len() + ListField::ALL.len()
        );
        for f in ScalarField::ALL {
            assert_eq!(
                SCHEMA_ORDER.iter().filter(|s| **s == Field::Scalar(f)).count(),
                1
            );
        }
        for f in ListField::ALL {
            assert_eq!(
                SCHEMA_ORDER.iter().filter(|s| **s == Field::List(f)).count(),
                1
            );
        }
    }

    #[test]
    fn test_from_tag_is_case_insensitive() {
        assert_eq!(
            Field::from_tag("languageiso"),
            Some(Field::Scalar(ScalarField::LanguageIso))
        );
        assert_eq!(
            Field::from_tag("COVERARTIST"),
            Some(Field::List(ListField::CoverArtist))
        );
        assert_eq!(Field::from_tag("Imprint"), None);
    }

    #[test]
    fn test_set_scalar_trims_and_clears_blank() {
        let mut info = ComicInfo::default();
        info.set_scalar(ScalarField::Number, Some("  001 "));
        assert_eq!(info.number.as_deref(), Some("001"));

        info.set_scalar(ScalarField::Number, Some("   "));
        assert_eq!(info.number, None);
    }

    #[test]
    fn test_push_list_dedups_ignoring_case() {
        let mut info = ComicInfo::default();
        info.push_list(ListField::Writer, "Neil Gaiman");
        info.push_list(ListField::Writer, "neil gaiman");
        info.push_list(ListField::Writer, "Sam Kieth");
        info.push_list(ListField::Writer, "  ");
        assert_eq!(info.writer, vec!["Neil Gaiman", "Sam Kieth"]);
    }

    #[test]
    fn test_set_list_preserves_source_order() {
        let mut info = ComicInfo::default();
        info.set_list(ListField::Characters, ["Morpheus", "Death", "Cain", "Abel"]);
        assert_eq!(info.characters, vec!["Morpheus", "Death", "Cain", "Abel"]);
    }

    #[test]
    fn test_add_note_appends_lines() {
        let mut info = ComicInfo::default();
        info.add_note("Store Date: 1988-11-29");
        info.add_note("Objects: Helm");
        assert_eq!(
            info.notes.as_deref(),
            Some("Store Date: 1988-11-29\nObjects: Helm")
        );
    }

    #[test]
    fn test_is_empty() {
        let mut info = ComicInfo::default();
        assert!(info.is_empty());
        info.push_list(ListField::Genre, "Horror");
        assert!(!info.is_empty());
    }
}
