//! Markdown rendering: front matter, linked table of contents, anchored entries.

use std::sync::LazyLock;

use regex::Regex;

use crate::book::{Book, BookEntry, Choice, INTRO_KEY, TITLE_KEY};

/// Title used when no title line can be found in a section's text.
pub const UNKNOWN_TITLE: &str = "Section inconnue";

const TITLE_ANCHOR: &str = "titre";
const INTRO_ANCHOR: &str = "introduction";
const MAX_UNBOLDED_TITLE_CHARS: usize = 100;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));
static NON_ANCHOR_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\-àáâãäåçèéêëìíîïñòóôõöùúûüÿ]").expect("anchor pattern must compile")
});
static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("hyphen pattern must compile"));
static TOC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^- \[\*\*(.+)\*\*\]\(#([^)]*)\) \(`([^`]+)`\)$").expect("toc pattern must compile")
});

// ────────────────────────────────────────────────────────────────────────────
// Anchors and titles
// ────────────────────────────────────────────────────────────────────────────

/// URL-fragment form of `text`.
///
/// Lower-cases, turns whitespace runs into `-`, drops anything that is not a word
/// character, `-`, or an accented Latin letter, then collapses and trims hyphens.
pub fn create_anchor(text: &str) -> String {
    let anchor = text.to_lowercase();
    let anchor = WHITESPACE_RUN.replace_all(&anchor, "-");
    let anchor = NON_ANCHOR_CHAR.replace_all(&anchor, "");
    let anchor = HYPHEN_RUN.replace_all(&anchor, "-");
    anchor.trim_matches('-').to_string()
}

pub fn section_anchor(number: usize, title: &str) -> String {
    create_anchor(&format!("section-{number}-{title}"))
}

/// Recovers a section title from its text.
///
/// Order: the line right after a `#NN` marker (bold, or short and plain), then the
/// first standalone bold line that is not a choices label.
pub fn extract_title(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if !is_number_marker(line.trim()) {
            continue;
        }
        let Some(next) = lines.get(i + 1).map(|l| l.trim()) else {
            continue;
        };
        if is_bold_line(next) {
            return Some(strip_bold(next));
        }
        if !next.is_empty()
            && !next.starts_with('#')
            && next.chars().count() < MAX_UNBOLDED_TITLE_CHARS
        {
            return Some(next.to_string());
        }
    }

    lines
        .iter()
        .map(|l| l.trim())
        .find(|l| is_bold_line(l) && !l.starts_with("**Choices"))
        .map(strip_bold)
}

pub fn title_or_default(text: &str) -> String {
    extract_title(text).unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// `#` followed by one to three digits and nothing else.
fn is_number_marker(line: &str) -> bool {
    line.strip_prefix('#')
        .is_some_and(|digits| (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn is_bold_line(line: &str) -> bool {
    line.starts_with("**") && line.ends_with("**")
}

fn strip_bold(line: &str) -> String {
    line.trim_matches('*').trim().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders a complete book. Pure: same book, same bytes.
pub fn render_markdown(book: &Book) -> String {
    let mut lines: Vec<String> = Vec::new();
    let meta = &book.metadata;

    lines.push("---".to_string());
    lines.push(format!("title: {}", yaml_string(&book.title)));
    lines.push(format!("author: {}", yaml_string(&meta.author)));
    lines.push(format!(
        "generation_method: {}",
        yaml_string(meta.generation_method.label())
    ));
    if !meta.agents_used.is_empty() {
        lines.push(format!("agents_used: {}", yaml_list(&meta.agents_used)));
    }
    if !meta.tools_used.is_empty() {
        lines.push(format!("tools_used: {}", yaml_list(&meta.tools_used)));
    }
    lines.push(format!("sections_found: {}", meta.sections_found));
    lines.push("---".to_string());
    lines.extend(
        [
            "",
            "# Story Content (Spine Order)",
            "",
            "## Table of Contents",
            "",
        ]
        .map(String::from),
    );

    // Table of contents
    if book.entry(TITLE_KEY).is_some() {
        lines.push(format!(
            "- [**{}**](#{TITLE_ANCHOR}) (`{TITLE_KEY}`)",
            book.title
        ));
    }
    if book.entry(INTRO_KEY).is_some() {
        lines.push(format!(
            "- [**Introduction**](#{INTRO_ANCHOR}) (`{INTRO_KEY}`)"
        ));
    }
    for number in 1..=book.total_sections {
        if let Some(entry) = book.section(number) {
            let title = title_or_default(&entry.text);
            lines.push(format!(
                "- [**Section {number}: {title}**](#{}) (`{number}`)",
                section_anchor(number, &title)
            ));
        }
    }
    lines.extend(["", "---", ""].map(String::from));

    // Entries
    if let Some(entry) = book.entry(TITLE_KEY) {
        lines.extend(["## Titre".to_string(), String::new(), entry.text.clone()]);
        lines.extend(["", "---", ""].map(String::from));
    }

    if let Some(entry) = book.entry(INTRO_KEY) {
        lines.extend([
            "## Introduction".to_string(),
            String::new(),
            entry.text.clone(),
        ]);
        render_choices(book, entry, &mut lines);
    }

    for number in 1..=book.total_sections {
        let Some(entry) = book.section(number) else {
            continue;
        };
        let title = title_or_default(&entry.text);
        lines.extend([
            format!("## Section {number}: {title}"),
            String::new(),
            entry.text.clone(),
        ]);
        render_validation(entry, &mut lines);
        render_choices(book, entry, &mut lines);
    }

    lines.join("\n")
}

fn render_validation(entry: &BookEntry, lines: &mut Vec<String>) {
    let Some(report) = entry.validation.as_ref().filter(|r| !r.warnings.is_empty()) else {
        return;
    };
    lines.push(String::new());
    lines.push("**Validation Warnings:**".to_string());
    lines.extend(report.warnings.iter().map(|w| format!("- {w}")));
}

fn render_choices(book: &Book, entry: &BookEntry, lines: &mut Vec<String>) {
    lines.extend(["", "**Choices:**", ""].map(String::from));
    if entry.choices.is_empty() {
        lines.push("*Fin de l'aventure*".to_string());
    } else {
        lines.extend(entry.choices.iter().map(|choice| render_choice(book, choice)));
    }
    lines.extend(["", "---", ""].map(String::from));
}

/// A link when the destination exists, a plain bullet otherwise.
fn render_choice(book: &Book, choice: &Choice) -> String {
    match book.section(choice.destination) {
        Some(dest) => {
            let anchor = section_anchor(choice.destination, &title_or_default(&dest.text));
            format!("- [{}](#{anchor})", choice.label)
        }
        None => format!("- {}", choice.label),
    }
}

/// Double-quoted scalar; JSON string escaping is valid YAML.
fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

fn yaml_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Table of contents read-back
// ────────────────────────────────────────────────────────────────────────────

/// One line of a rendered table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub label: String,
    pub anchor: String,
    pub key: String,
}

/// Reads the table of contents back out of rendered Markdown.
pub fn table_of_contents(markdown: &str) -> Vec<TocEntry> {
    markdown
        .lines()
        .skip_while(|line| *line != "## Table of Contents")
        .skip(1)
        .take_while(|line| *line != "---")
        .filter_map(|line| TOC_LINE.captures(line))
        .map(|caps| TocEntry {
            label: caps[1].to_string(),
            anchor: caps[2].to_string(),
            key: caps[3].to_string(),
        })
        .collect()
}
