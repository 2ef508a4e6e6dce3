use tracing::info;

use crate::book::extractor::{complete, SectionMap};
use crate::book::review::synthesize_review;
use crate::book::{
    Book, BookEntry, Choice, GenerationMethod, ParagraphNumber, INTRO_KEY, START_LABEL,
};

/// Raw generator output for one book, before assembly.
#[derive(Debug, Clone, Copy)]
pub struct BookDraft<'a> {
    pub theme: &'a str,
    pub total_sections: usize,
    pub intro_text: &'a str,
    pub review_text: &'a str,
    pub method: GenerationMethod,
}

/// Builds the book document: title page, intro, every section `1..=N`, review.
///
/// Missing sections are filled with placeholders; out-of-range keys are dropped.
pub fn assemble(draft: &BookDraft<'_>, mut sections: SectionMap) -> Book {
    let total = draft.total_sections;
    let mut book = Book::new(draft.theme, total, draft.method);

    book.content.insert(
        INTRO_KEY.to_string(),
        BookEntry {
            paragraph_number: ParagraphNumber::Label(INTRO_KEY.to_string()),
            text: draft.intro_text.to_string(),
            choices: vec![Choice::new(START_LABEL, 1)],
            validation: None,
        },
    );

    complete(&mut sections, total);
    let parsed = sections.values().filter(|s| s.is_parsed()).count();
    for (number, section) in sections {
        if (1..=total).contains(&number) {
            book.content
                .insert(number.to_string(), BookEntry::from(section));
        }
    }

    let review = synthesize_review(draft.review_text);
    book.metadata.review_status = if review.needs_improvement {
        "needs_improvement"
    } else {
        "reviewed"
    }
    .to_string();

    info!(
        book_id = %book.id,
        sections = total,
        parsed,
        mean_score = review.mean_score,
        needs_improvement = review.needs_improvement,
        "book assembled"
    );
    book.review = Some(review);
    book
}
