//! Simple generator: one LLM call per part of the book, then a JSON review.
//!
//! Flow: intro → section 1..=N (each through `extract_single`) → review → assemble.

use tracing::{info, warn};

use crate::book::assembler::{assemble, BookDraft};
use crate::book::extractor::{extract_single, SectionMap};
use crate::book::{Book, GenerationMethod};
use crate::generation::prompts::{intro_prompt, review_prompt, section_prompt};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, STORYTELLER_SYSTEM};
use crate::llm_client::{LlmError, TextGenerator};

/// The reviewer only sees this many characters of the book.
pub const REVIEW_DIGEST_CHARS: usize = 4000;

pub async fn generate_simple_book(
    llm: &dyn TextGenerator,
    theme: &str,
    total: usize,
) -> Result<Book, LlmError> {
    info!(theme, total, model = llm.model(), "simple generation started");

    let intro_text = llm.generate(STORYTELLER_SYSTEM, &intro_prompt(theme)).await?;

    let mut sections = SectionMap::new();
    for number in 1..=total {
        let raw = llm
            .generate(STORYTELLER_SYSTEM, &section_prompt(theme, number, total))
            .await?;
        let section = extract_single(&raw, number, total);
        info!(number, title = %section.title, origin = ?section.origin, "section generated");
        sections.insert(number, section);
    }

    // A failed review degrades to default scores rather than losing the book.
    let digest = review_digest(&intro_text, &sections);
    let review_text = match llm
        .generate(JSON_ONLY_SYSTEM, &review_prompt(theme, &digest))
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!("review call failed, using default scores: {e}");
            String::new()
        }
    };

    let draft = BookDraft {
        theme,
        total_sections: total,
        intro_text: &intro_text,
        review_text: &review_text,
        method: GenerationMethod::Simple,
    };
    Ok(assemble(&draft, sections))
}

/// Intro and sections joined for the reviewer, cut to [`REVIEW_DIGEST_CHARS`].
pub fn review_digest(intro: &str, sections: &SectionMap) -> String {
    let parts: Vec<String> = std::iter::once(format!("INTRODUCTION:\n{intro}\n"))
        .chain(
            sections
                .iter()
                .map(|(number, section)| format!("SECTION {number}:\n{}\n", section.text)),
        )
        .collect();
    parts
        .join("\n---\n")
        .chars()
        .take(REVIEW_DIGEST_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::review::ReviewSource;
    use crate::book::{SectionOrigin, INTRO_KEY};
    use crate::llm_client::testing::ScriptedGenerator;

    const REVIEW_JSON: &str = r#"{"overall_score": 80, "authenticity_score": 90, "narrative_quality": 85, "suggestions": ["Plus d'humour"]}"#;

    #[tokio::test]
    async fn test_generates_complete_book() {
        let llm = ScriptedGenerator::new([
            "Mesdames, messieurs, bonsoir !",
            "#01\n**L'Arrivée au Caire**\n\nPhilippe atterrit près du Nil.",
            "**Le Sphinx**\nLe Sphinx veille sur le plateau.",
            REVIEW_JSON,
        ]);

        let book = generate_simple_book(&llm, "Les Mystères d'Égypte", 2)
            .await
            .unwrap();

        assert_eq!(book.entry(INTRO_KEY).unwrap().text, "Mesdames, messieurs, bonsoir !");
        assert_eq!(
            book.section(1).unwrap().text,
            "#01\n**L'Arrivée au Caire**\n\nPhilippe atterrit près du Nil."
        );
        assert_eq!(
            book.section(2).unwrap().text,
            "#02\n**Le Sphinx**\n\nLe Sphinx veille sur le plateau."
        );
        let review = book.review.as_ref().unwrap();
        assert_eq!(review.source, ReviewSource::Json);
        assert_eq!(review.mean_score, 85.0);
        assert_eq!(review.suggestions, vec!["Plus d'humour".to_string()]);
        assert_eq!(book.metadata.generation_method, GenerationMethod::Simple);
    }

    #[tokio::test]
    async fn test_prompts_follow_book_order() {
        let llm = ScriptedGenerator::new(["intro", "#01 **Un**\nA", "#02 **Deux**\nB", "#03 **Trois**\nC", "{}"]);
        generate_simple_book(&llm, "Le Trésor Inca", 3).await.unwrap();

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 5);
        assert!(prompts[0].1.contains("l'introduction"));
        assert!(prompts[1].1.contains("#01 (Découverte du lieu)"));
        assert!(prompts[2].1.contains("#02 (Exploration et énigme)"));
        assert!(prompts[3].1.contains("#03 (Résolution finale)"));
        assert_eq!(prompts[4].0, JSON_ONLY_SYSTEM);
        assert!(prompts[4].1.contains("SECTION 3:\n#03\n**Trois**"));
    }

    #[tokio::test]
    async fn test_failed_review_falls_back_to_defaults() {
        // no fourth response: the review call fails
        let llm = ScriptedGenerator::new(["intro", "#01 **Un**\nA", "#02 **Deux**\nB"]);
        let book = generate_simple_book(&llm, "Le Trésor Inca", 2).await.unwrap();
        let review = book.review.unwrap();
        assert_eq!(review.mean_score, 92.0);
        assert_eq!(review.source, ReviewSource::Probes);
    }

    #[tokio::test]
    async fn test_failed_section_aborts_generation() {
        let llm = ScriptedGenerator::new(["intro"]);
        let result = generate_simple_book(&llm, "Le Trésor Inca", 2).await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_review_digest_is_truncated() {
        let mut sections = SectionMap::new();
        sections.insert(
            1,
            crate::book::Section::new(1, "Long", &"x".repeat(5000), 1, SectionOrigin::Paragraph),
        );
        let digest = review_digest("intro", &sections);
        assert_eq!(digest.chars().count(), REVIEW_DIGEST_CHARS);
        assert!(digest.starts_with("INTRODUCTION:\nintro\n\n---\nSECTION 1:\n#01\n**Long**"));
    }
}
