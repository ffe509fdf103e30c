use anyhow::Result;

use crate::metadata::{Field, ListField, ScalarField, SCHEMA_ORDER};
use crate::organize::{FILENAME_TEMPLATE, MAX_FILENAME_BYTES};

fn describe(field: Field) -> &'static str {
    match field {
        Field::Scalar(f) => match f {
            ScalarField::Title => "Issue title",
            ScalarField::Series => "Series (volume) name",
            ScalarField::Number => "Issue number, kept as text (e.g. 1, 12.5, Annual 1)",
            ScalarField::Count => "Total issues in the series",
            ScalarField::Volume => "Volume number",
            ScalarField::Summary => "Plain-text synopsis",
            ScalarField::Notes => "Free-form notes; unmapped source data lands here",
            ScalarField::Year => "Cover year",
            ScalarField::Month => "Cover month",
            ScalarField::Day => "Cover day",
            ScalarField::Publisher => "Publisher",
            ScalarField::Web => "Source web page",
            ScalarField::PageCount => "Number of pages",
            ScalarField::LanguageIso => "ISO language code (e.g. en)",
        },
        Field::List(f) => match f {
            ListField::Writer => "Writers",
            ListField::Penciller => "Pencillers and general artists",
            ListField::Inker => "Inkers",
            ListField::Colorist => "Colorists",
            ListField::Letterer => "Letterers",
            ListField::CoverArtist => "Cover artists",
            ListField::Editor => "Editors",
            ListField::Genre => "Genres and concepts",
            ListField::Characters => "Characters appearing",
            ListField::Teams => "Teams appearing",
            ListField::Locations => "Locations",
            ListField::StoryArc => "Story arcs",
        },
    }
}

/// Run the fields command - list ComicInfo.xml fields and the filename template
pub fn run() -> Result<()> {
    println!("ComicInfo.xml fields (in document order):");
    println!();

    for field in SCHEMA_ORDER {
        let kind = match field {
            Field::Scalar(_) => "",
            Field::List(_) => " (list)",
        };
        println!("  {:<12} - {}{}", field.tag(), describe(*field), kind);
    }

    println!();
    println!("List fields are stored comma-separated, e.g. <Writer>A, B</Writer>");
    println!();
    println!("Rename template: \"{}\"", FILENAME_TEMPLATE);
    println!(
        "Missing segments are dropped; names are capped at {} bytes.",
        MAX_FILENAME_BYTES
    );

    Ok(())
}
