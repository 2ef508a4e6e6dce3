//! Book domain: sections, choices, and the assembled gamebook document.
//!
//! Flow: raw LLM text → extractor → assembler (+ review) → markdown renderer.
//! Everything in this module is pure and synchronous; LLM calls live in `generation`.

pub mod assembler;
pub mod extractor;
pub mod handlers;
pub mod markdown;
pub mod review;
pub mod validation;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::extractor::PatternKind;
use crate::book::review::ReviewReport;
use crate::generation::tools::{FormatReport, ToolReports};

/// Content key of the title page.
pub const TITLE_KEY: &str = "title";
/// Content key of the introduction.
pub const INTRO_KEY: &str = "intro";

pub const BOOK_ID_PREFIX: &str = "lachasseautresor";
pub const BOOK_TITLE_PREFIX: &str = "La Chasse au Trésor";
pub const START_LABEL: &str = "Commencer l'aventure";

// ────────────────────────────────────────────────────────────────────────────
// Sections and choices
// ────────────────────────────────────────────────────────────────────────────

/// A directed edge from one entry to a numbered section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub destination: usize,
}

impl Choice {
    pub fn new(label: impl Into<String>, destination: usize) -> Self {
        Self {
            label: label.into(),
            destination,
        }
    }
}

/// Where a section's content came from, richest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionOrigin {
    Parsed { pattern: PatternKind },
    Paragraph,
    Placeholder,
}

/// One numbered narrative unit. Built once by the extractor, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub number: usize,
    pub title: String,
    pub body: String,
    /// Canonical rendering: `#NN`, bold title, blank line, body.
    pub text: String,
    pub choices: Vec<Choice>,
    pub origin: SectionOrigin,
}

impl Section {
    pub fn new(
        number: usize,
        title: &str,
        body: &str,
        total: usize,
        origin: SectionOrigin,
    ) -> Self {
        Self {
            number,
            title: title.to_string(),
            body: body.to_string(),
            text: canonical_text(number, title, body),
            choices: extractor::section_choices(number, total),
            origin,
        }
    }

    pub fn placeholder(number: usize, total: usize) -> Self {
        Self::new(
            number,
            &generic_title(number),
            extractor::PLACEHOLDER_BODY,
            total,
            SectionOrigin::Placeholder,
        )
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.origin, SectionOrigin::Parsed { .. })
    }
}

/// `Section <n>`, used whenever no real title could be recovered.
pub fn generic_title(number: usize) -> String {
    format!("Section {number}")
}

pub fn canonical_text(number: usize, title: &str, body: &str) -> String {
    format!("#{number:02}\n**{title}**\n\n{body}")
}

// ────────────────────────────────────────────────────────────────────────────
// Book document
// ────────────────────────────────────────────────────────────────────────────

/// Paragraph number as stored in the content map: `"title"`, `"intro"`, or a section number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParagraphNumber {
    Section(usize),
    Label(String),
}

/// A section-shaped record in `Book::content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub paragraph_number: ParagraphNumber,
    pub text: String,
    pub choices: Vec<Choice>,
    /// Advisory format warnings (crew books only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FormatReport>,
}

impl From<Section> for BookEntry {
    fn from(section: Section) -> Self {
        Self {
            paragraph_number: ParagraphNumber::Section(section.number),
            text: section.text,
            choices: section.choices,
            validation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    #[default]
    Simple,
    Crew,
}

impl GenerationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationMethod::Simple => "Générateur simple",
            GenerationMethod::Crew => "Équipe multi-agents",
        }
    }

    /// Short tag used in file names.
    pub fn file_tag(&self) -> &'static str {
        match self {
            GenerationMethod::Simple => "simple",
            GenerationMethod::Crew => "crew",
        }
    }

    pub fn author(&self) -> &'static str {
        match self {
            GenerationMethod::Simple => "Générateur Chasse au Trésor",
            GenerationMethod::Crew => "Équipe Chasse au Trésor (multi-agents)",
        }
    }
}

/// Informational metadata. Nothing structural depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub author: String,
    pub generation_method: GenerationMethod,
    pub created_at: DateTime<Utc>,
    pub original_filename: String,
    pub review_status: String,
    /// Numbered sections plus title and intro.
    pub sections_found: usize,
    #[serde(default)]
    pub agents_used: Vec<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_reports: Option<ToolReports>,
}

/// The assembled gamebook.
///
/// Once assembled, `content` holds `"title"`, `"intro"` and every key `"1"..="N"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub total_sections: usize,
    pub content: BTreeMap<String, BookEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewReport>,
    pub metadata: BookMetadata,
}

impl Book {
    /// Creates a book holding only its title page.
    /// Whitespace runs in `theme` (newlines included) collapse to one space, so the
    /// title stays on one rendered line.
    pub fn new(theme: &str, total_sections: usize, method: GenerationMethod) -> Self {
        let theme = theme.split_whitespace().collect::<Vec<_>>().join(" ");
        let id = book_id(&theme);
        let mut content = BTreeMap::new();
        content.insert(
            TITLE_KEY.to_string(),
            BookEntry {
                paragraph_number: ParagraphNumber::Label(TITLE_KEY.to_string()),
                text: format!(
                    "{theme}\nUn livre dont vous êtes le Héros\nGénéré par {}",
                    method.label()
                ),
                choices: Vec::new(),
                validation: None,
            },
        );

        Self {
            title: format!("{BOOK_TITLE_PREFIX}: {theme}"),
            theme,
            total_sections,
            content,
            review: None,
            metadata: BookMetadata {
                author: method.author().to_string(),
                generation_method: method,
                created_at: Utc::now(),
                original_filename: format!("{id}_{}.md", method.file_tag()),
                review_status: "pending".to_string(),
                sections_found: total_sections + 2,
                agents_used: Vec::new(),
                tools_used: Vec::new(),
                tool_reports: None,
            },
            id,
        }
    }

    pub fn entry(&self, key: &str) -> Option<&BookEntry> {
        self.content.get(key)
    }

    pub fn section(&self, number: usize) -> Option<&BookEntry> {
        self.content.get(&number.to_string())
    }

    pub fn section_mut(&mut self, number: usize) -> Option<&mut BookEntry> {
        self.content.get_mut(&number.to_string())
    }
}

/// `lachasseautresor_<theme>`: lower-cased, spaces → `_`, apostrophes stripped.
pub fn book_id(theme: &str) -> String {
    let slug: String = theme
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .collect();
    format!("{BOOK_ID_PREFIX}_{slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_strips_apostrophes_and_spaces() {
        assert_eq!(
            book_id("Les Mystères d'Égypte"),
            "lachasseautresor_les_mystères_dégypte"
        );
    }

    #[test]
    fn test_book_id_is_deterministic() {
        assert_eq!(book_id("Le Trésor Inca"), book_id("Le Trésor Inca"));
    }

    #[test]
    fn test_new_book_holds_only_title_page() {
        let book = Book::new("Le Trésor Inca", 5, GenerationMethod::Simple);
        assert_eq!(book.title, "La Chasse au Trésor: Le Trésor Inca");
        assert_eq!(book.content.len(), 1);
        let title = book.entry(TITLE_KEY).unwrap();
        assert!(title.text.starts_with("Le Trésor Inca\n"));
        assert!(title.choices.is_empty());
        assert_eq!(book.metadata.sections_found, 7);
    }

    #[test]
    fn test_canonical_text_zero_pads_number() {
        assert_eq!(
            canonical_text(3, "Le Puits", "Il fait sombre."),
            "#03\n**Le Puits**\n\nIl fait sombre."
        );
    }

    #[test]
    fn test_paragraph_number_serializes_untagged() {
        let number = serde_json::to_value(ParagraphNumber::Section(4)).unwrap();
        let label = serde_json::to_value(ParagraphNumber::Label("intro".into())).unwrap();
        assert_eq!(number, serde_json::json!(4));
        assert_eq!(label, serde_json::json!("intro"));
    }

    #[test]
    fn test_generation_method_deserializes_snake_case() {
        let method: GenerationMethod = serde_json::from_str(r#""crew""#).unwrap();
        assert_eq!(method, GenerationMethod::Crew);
        assert_eq!(GenerationMethod::default(), GenerationMethod::Simple);
    }
}
