use crate::metadata::{ComicInfo, SCHEMA_ORDER};

/// A single field change
#[derive(Debug, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

const EMPTY: &str = "(empty)";

/// Compute changes between the stored record (if any) and the one to be written,
/// in schema order
pub fn compute_changes(old: Option<&ComicInfo>, new: &ComicInfo) -> Vec<FieldChange> {
    let blank = ComicInfo::default();
    let old = old.unwrap_or(&blank);

    SCHEMA_ORDER
        .iter()
        .filter_map(|field| {
            let old_val = old.display_value(*field);
            let new_val = new.display_value(*field);
            if old_val == new_val {
                return None;
            }
            Some(FieldChange {
                field: field.tag().to_string(),
                old_value: old_val.unwrap_or_else(|| EMPTY.to_string()),
                new_value: new_val.unwrap_or_else(|| EMPTY.to_string()),
            })
        })
        .collect()
}

/// Format changes as a side-by-side diff table
pub fn format_diff(file_path: &str, changes: &[FieldChange]) -> String {
    if changes.is_empty() {
        return "No changes detected.".to_string();
    }

    let field_width = changes
        .iter()
        .map(|c| c.field.len())
        .max()
        .unwrap_or(10)
        .max(10);
    let value_width = 32;

    let mut output = format!("Changes to {}:\n\n", file_path);

    output.push_str(&format!(
        "  {:width$} | {:vw$} | {:vw$}\n",
        "Field",
        "Current",
        "New",
        width = field_width,
        vw = value_width
    ));
    output.push_str(&format!(
        " {:->width$}-+-{:->vw$}-+-{:->vw$}\n",
        "",
        "",
        "",
        width = field_width + 1,
        vw = value_width
    ));

    for change in changes {
        output.push_str(&format!(
            "  {:width$} | {:vw$} | {:vw$}\n",
            change.field,
            truncate_value(&change.old_value, value_width),
            truncate_value(&change.new_value, value_width),
            width = field_width,
            vw = value_width
        ));
    }

    output
}

/// Truncate a value to fit in the column width
fn truncate_value(value: &str, max_width: usize) -> String {
    let single_line = value.replace('\n', " ");

    if single_line.chars().count() <= max_width {
        single_line
    } else {
        let truncated: String = single_line.chars().take(max_width - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ListField, ScalarField};

    #[test]
    fn test_compute_changes_no_changes() {
        let info = ComicInfo::default();
        assert!(compute_changes(Some(&info), &info).is_empty());
        assert!(compute_changes(None, &info).is_empty());
    }

    #[test]
    fn test_compute_changes_with_changes() {
        let mut old = ComicInfo::default();
        old.set_scalar(ScalarField::Series, Some("Sandman"));
        old.set_scalar(ScalarField::Title, Some("Old Title"));

        let mut new = old.clone();
        new.set_scalar(ScalarField::Title, Some("New Title"));
        new.set_list(ListField::Writer, ["Neil Gaiman", "Someone"]);

        let changes = compute_changes(Some(&old), &new);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "Title");
        assert_eq!(changes[0].old_value, "Old Title");
        assert_eq!(changes[0].new_value, "New Title");
        assert_eq!(changes[1].field, "Writer");
        assert_eq!(changes[1].old_value, "(empty)");
        assert_eq!(changes[1].new_value, "Neil Gaiman, Someone");
    }

    #[test]
    fn test_compute_changes_against_missing_record() {
        let mut new = ComicInfo::default();
        new.set_scalar(ScalarField::LanguageIso, Some("en"));

        let changes = compute_changes(None, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "LanguageISO");
    }

    #[test]
    fn test_format_diff_empty() {
        let output = format_diff("saga-001.cbz", &[]);
        assert_eq!(output, "No changes detected.");
    }

    #[test]
    fn test_format_diff_with_changes() {
        let changes = vec![FieldChange {
            field: "Title".to_string(),
            old_value: "Old".to_string(),
            new_value: "New".to_string(),
        }];

        let output = format_diff("saga-001.cbz", &changes);
        assert!(output.contains("Changes to saga-001.cbz:"));
        assert!(output.contains("Title"));
        assert!(output.contains("Old"));
        assert!(output.contains("New"));
    }

    #[test]
    fn test_truncate_value_with_multibyte_utf8() {
        let value = "Le Petit Prince • Édition spéciale illustrée en couleurs";

        let result = super::truncate_value(value, 24);
        assert!(result.ends_with("..."));
        assert_eq!(result.chars().count(), 24);
    }
}
