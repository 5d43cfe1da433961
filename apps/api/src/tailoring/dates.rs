//! Date patching for generated documents.
//!
//! This is best-effort surgery on semi-structured YAML: anything that cannot
//! be patched (unparseable text, missing sections, non-list sections) is left
//! as the model produced it. Validation runs afterwards and decides whether
//! the document is usable.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{NoExpand, Regex};
use serde_yaml::Value;
use tracing::{debug, warn};

pub const DATE_PLACEHOLDER: &str = "[Date]";

/// How many leading entries of the letter's opening section are searched for
/// an existing date.
const DATE_SEARCH_LINES: usize = 5;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)\b(?:{MONTH}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}|\d{{1,2}}(?:st|nd|rd|th)?\s+{MONTH},?\s+\d{{4}}|\d{{4}}-\d{{2}}-\d{{2}}|\d{{1,2}}[/.]\d{{1,2}}[/.]\d{{4}})\b"
    );
    Regex::new(&pattern).expect("date pattern is valid")
});

/// `2025-03-05`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `March 5, 2025`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Overwrites `settings.current_date` in the résumé.
pub fn patch_cv_date(yaml: &str, date: NaiveDate) -> String {
    let Some(mut doc) = parse(yaml, "CV") else {
        return yaml.to_string();
    };
    if !set_current_date(&mut doc, date) {
        return yaml.to_string();
    }
    serialize(&doc).unwrap_or_else(|| yaml.to_string())
}

/// Overwrites `settings.current_date` and stamps the long-form date into the
/// letter body.
///
/// Every `[Date]` placeholder under `cv` is replaced. Without a placeholder,
/// the first date-shaped text in the opening lines of the unnamed section is
/// replaced instead, and failing that the date becomes the section's first
/// line.
pub fn patch_cover_letter_date(yaml: &str, date: NaiveDate) -> String {
    let Some(mut doc) = parse(yaml, "cover letter") else {
        return yaml.to_string();
    };

    set_current_date(&mut doc, date);

    let long = long_date(date);
    if let Some(cv) = doc.get_mut("cv") {
        if !replace_placeholder(cv, &long) && stamp_opening_section(cv, &long).is_none() {
            debug!("Cover letter has no section to date; leaving body unchanged");
        }
    }

    serialize(&doc).unwrap_or_else(|| yaml.to_string())
}

fn parse(yaml: &str, document: &str) -> Option<Value> {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Skipping date patch for {document}: {e}");
            None
        }
    }
}

fn serialize(doc: &Value) -> Option<String> {
    serde_yaml::to_string(doc)
        .map_err(|e| warn!("Failed to re-serialize patched YAML: {e}"))
        .ok()
}

/// Returns false when the document has no mapping to hold the field.
fn set_current_date(doc: &mut Value, date: NaiveDate) -> bool {
    let Some(root) = doc.as_mapping_mut() else {
        return false;
    };
    let settings = root
        .entry(Value::from("settings"))
        .or_insert_with(|| Value::Mapping(Default::default()));
    match settings.as_mapping_mut() {
        Some(settings) => {
            settings.insert(Value::from("current_date"), Value::from(iso_date(date)));
            true
        }
        None => false,
    }
}

fn replace_placeholder(value: &mut Value, long: &str) -> bool {
    match value {
        Value::String(s) if s.contains(DATE_PLACEHOLDER) => {
            *s = s.replace(DATE_PLACEHOLDER, long);
            true
        }
        Value::Sequence(items) => items
            .iter_mut()
            .fold(false, |found, item| replace_placeholder(item, long) || found),
        Value::Mapping(map) => map
            .values_mut()
            .fold(false, |found, item| replace_placeholder(item, long) || found),
        _ => false,
    }
}

/// The letter's opening section is the one with a blank name, else the first.
fn stamp_opening_section(cv: &mut Value, long: &str) -> Option<()> {
    let sections = cv.get_mut("sections")?.as_mapping_mut()?;
    let key = sections
        .keys()
        .find(|k| k.as_str().is_some_and(|s| s.trim().is_empty()))
        .or_else(|| sections.keys().next())
        .cloned()?;
    let lines = sections.get_mut(&key)?.as_sequence_mut()?;

    for line in lines.iter_mut().take(DATE_SEARCH_LINES) {
        if let Value::String(s) = line {
            if DATE_RE.is_match(s) {
                *s = DATE_RE.replace(s, NoExpand(long)).into_owned();
                return Some(());
            }
        }
    }

    lines.insert(0, Value::from(long));
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn opening(yaml: &str) -> Vec<String> {
        let doc: Value = serde_yaml::from_str(yaml).unwrap();
        doc["cv"]["sections"][""]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect()
    }

    const CV: &str = r#"
cv:
  name: Jane Doe
  sections:
    summary:
      - Backend engineer
    experience:
      - company: Acme
settings:
  current_date: "2020-01-01"
"#;

    #[test]
    fn test_formats() {
        assert_eq!(iso_date(march_5()), "2025-03-05");
        assert_eq!(long_date(march_5()), "March 5, 2025");
    }

    #[test]
    fn test_cv_date_overwritten_and_order_kept() {
        let patched = patch_cv_date(CV, march_5());
        let doc: Value = serde_yaml::from_str(&patched).unwrap();
        assert_eq!(doc["settings"]["current_date"].as_str(), Some("2025-03-05"));
        let names: Vec<_> = doc["cv"]["sections"]
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(names, vec!["summary", "experience"]);
    }

    #[test]
    fn test_cv_date_patch_is_idempotent() {
        let once = patch_cv_date(CV, march_5());
        let twice = patch_cv_date(&once, march_5());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cv_without_settings_gains_them() {
        let patched = patch_cv_date("cv:\n  name: Jane\n", march_5());
        let doc: Value = serde_yaml::from_str(&patched).unwrap();
        assert_eq!(doc["settings"]["current_date"].as_str(), Some("2025-03-05"));
    }

    #[test]
    fn test_unparseable_text_is_returned_unchanged() {
        let broken = "cv: {name: Jane";
        assert_eq!(patch_cv_date(broken, march_5()), broken);
        assert_eq!(patch_cover_letter_date(broken, march_5()), broken);
    }

    #[test]
    fn test_placeholder_replaced_with_long_date() {
        let yaml = "cv:\n  sections:\n    '':\n      - '[Date]'\n      - Dear Hiring Manager,\nsettings:\n  current_date: '2020-01-01'\n";
        let patched = patch_cover_letter_date(yaml, march_5());
        assert_eq!(opening(&patched), vec!["March 5, 2025", "Dear Hiring Manager,"]);
        let doc: Value = serde_yaml::from_str(&patched).unwrap();
        assert_eq!(doc["settings"]["current_date"].as_str(), Some("2025-03-05"));
    }

    #[test]
    fn test_placeholder_replaced_anywhere_under_cv() {
        let yaml = "cv:\n  sections:\n    body:\n      - 'Sent on [Date] to Acme'\n";
        let patched = patch_cover_letter_date(yaml, march_5());
        let doc: Value = serde_yaml::from_str(&patched).unwrap();
        assert_eq!(
            doc["cv"]["sections"]["body"][0].as_str(),
            Some("Sent on March 5, 2025 to Acme")
        );
        assert_eq!(doc["cv"]["sections"]["body"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_existing_date_in_opening_lines_is_replaced() {
        let yaml = "cv:\n  sections:\n    '':\n      - Jane Doe\n      - 12 January 2024\n      - Dear Hiring Manager,\n";
        let patched = patch_cover_letter_date(yaml, march_5());
        assert_eq!(
            opening(&patched),
            vec!["Jane Doe", "March 5, 2025", "Dear Hiring Manager,"]
        );
    }

    #[test]
    fn test_abbreviated_and_numeric_dates_are_recognised() {
        for date in ["Jan. 3, 2024", "2024-01-03", "03/01/2024", "3rd Jan 2024"] {
            assert!(DATE_RE.is_match(date), "{date} should look like a date");
        }
        assert!(!DATE_RE.is_match("Dear Hiring Manager,"));
    }

    #[test]
    fn test_date_inserted_when_none_found() {
        let yaml = "cv:\n  sections:\n    '':\n      - Dear Hiring Manager,\n      - I am writing to apply.\n";
        let patched = patch_cover_letter_date(yaml, march_5());
        assert_eq!(
            opening(&patched),
            vec!["March 5, 2025", "Dear Hiring Manager,", "I am writing to apply."]
        );
    }

    #[test]
    fn test_inserted_date_is_not_duplicated_on_repeat() {
        let yaml = "cv:\n  sections:\n    '':\n      - Dear Hiring Manager,\n";
        let once = patch_cover_letter_date(yaml, march_5());
        let twice = patch_cover_letter_date(&once, march_5());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_first_section_used_when_none_unnamed() {
        let yaml = "cv:\n  sections:\n    letter:\n      - Dear Hiring Manager,\n    closing:\n      - Regards\n";
        let patched = patch_cover_letter_date(yaml, march_5());
        let doc: Value = serde_yaml::from_str(&patched).unwrap();
        assert_eq!(doc["cv"]["sections"]["letter"][0].as_str(), Some("March 5, 2025"));
        assert_eq!(doc["cv"]["sections"]["closing"][0].as_str(), Some("Regards"));
    }

    #[test]
    fn test_letter_without_sections_still_gets_settings_date() {
        let yaml = "cv:\n  name: Jane\n";
        let patched = patch_cover_letter_date(yaml, march_5());
        let doc: Value = serde_yaml::from_str(&patched).unwrap();
        assert_eq!(doc["settings"]["current_date"].as_str(), Some("2025-03-05"));
        assert!(doc["cv"].get("sections").is_none());
    }
}
