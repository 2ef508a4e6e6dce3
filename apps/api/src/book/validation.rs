//! Structural checks over a book document, typed or not.
//!
//! Works on `serde_json::Value` so that hand-edited or truncated files can still be
//! diagnosed instead of failing deserialization.

use serde::Serialize;
use serde_json::Value;

use crate::book::{INTRO_KEY, TITLE_KEY};
use crate::generation::handlers::MAX_SECTIONS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub title: String,
    pub declared_sections: usize,
    pub actual_sections: usize,
    pub has_title: bool,
    pub has_intro: bool,
    pub issues: Vec<String>,
    pub is_valid: bool,
}

pub fn validate_book(book: &Value) -> ValidationReport {
    let title = book
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Titre inconnu")
        .to_string();
    let declared = book
        .get("total_sections")
        .and_then(Value::as_u64)
        .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
    let empty = serde_json::Map::new();
    let content = book
        .get("content")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut issues = Vec::new();

    let has_title = content.contains_key(TITLE_KEY);
    let has_intro = content.contains_key(INTRO_KEY);
    if !has_title {
        issues.push(format!("Section '{TITLE_KEY}' manquante"));
    }
    if !has_intro {
        issues.push(format!("Section '{INTRO_KEY}' manquante"));
    }

    let actual = content.keys().filter(|k| is_section_key(k)).count();
    if actual != declared {
        issues.push(format!(
            "Sections réelles ({actual}) != déclarées ({declared})"
        ));
    }
    if declared > MAX_SECTIONS {
        issues.push(format!(
            "Sections déclarées ({declared}) > maximum ({MAX_SECTIONS})"
        ));
    } else {
        for number in 1..=declared {
            if !content.contains_key(&number.to_string()) {
                issues.push(format!("Section {number} manquante"));
            }
        }
    }

    if let Some(intro) = content.get(INTRO_KEY) {
        check_destinations(INTRO_KEY, intro, content, &mut issues);
    }

    let mut numbered: Vec<(usize, &Value)> = content
        .iter()
        .filter(|(k, _)| is_section_key(k))
        .filter_map(|(k, v)| k.parse().ok().map(|n| (n, v)))
        .collect();
    numbered.sort_by_key(|(n, _)| *n);

    for (number, entry) in numbered {
        let label = number.to_string();
        if entry.get("text").and_then(Value::as_str).is_none() {
            issues.push(format!("Section {number}: texte manquant"));
        }
        let Some(choices) = entry.get("choices").and_then(Value::as_array) else {
            issues.push(format!("Section {number}: choix manquants"));
            continue;
        };

        if number == declared && !choices.is_empty() {
            issues.push(format!("Section {number}: la section finale propose des choix"));
        } else if number < declared && choices.is_empty() {
            issues.push(format!("Section {number}: aucun choix (impasse)"));
        }
        check_destinations(&label, entry, content, &mut issues);
    }

    ValidationReport {
        title,
        declared_sections: declared,
        actual_sections: actual,
        has_title,
        has_intro,
        is_valid: issues.is_empty(),
        issues,
    }
}

fn is_section_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn check_destinations(
    label: &str,
    entry: &Value,
    content: &serde_json::Map<String, Value>,
    issues: &mut Vec<String>,
) {
    let Some(choices) = entry.get("choices").and_then(Value::as_array) else {
        return;
    };
    for choice in choices {
        match choice.get("destination").and_then(Value::as_u64) {
            Some(dest) if content.contains_key(&dest.to_string()) => {}
            Some(dest) => issues.push(format!("Section {label}: destination #{dest} inexistante")),
            None => issues.push(format!("Section {label}: choix sans destination")),
        }
    }
}
