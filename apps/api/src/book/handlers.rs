//! Axum route handlers for the Book API (no LLM involved).

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::book::assembler::{assemble, BookDraft};
use crate::book::extractor::extract;
use crate::book::markdown::render_markdown;
use crate::book::validation::{validate_book, ValidationReport};
use crate::book::{Book, GenerationMethod};
use crate::errors::AppError;
use crate::generation::handlers::MAX_SECTIONS;
use crate::state::AppState;
use crate::storage::{SavedFiles, StoredFile};

const DEFAULT_RETENTION_DAYS: u64 = 30;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A book, its Markdown rendering, and where it was saved (if it was).
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<SavedFiles>,
}

#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    pub theme: String,
    pub sections: usize,
    pub intro_text: String,
    /// Raw text holding every numbered section.
    pub sections_text: String,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub mode: GenerationMethod,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub total: usize,
    pub files: Vec<StoredFile>,
}

#[derive(Debug, Deserialize)]
pub struct CleanQuery {
    pub older_than_days: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CleanResponse {
    pub deleted: usize,
    pub older_than_days: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/books/assemble
///
/// Runs extraction, assembly and rendering over caller-supplied texts.
pub async fn handle_assemble(
    State(state): State<AppState>,
    Json(request): Json<AssembleRequest>,
) -> Result<Json<BookResponse>, AppError> {
    if request.theme.trim().is_empty() {
        return Err(AppError::Validation("theme cannot be empty".to_string()));
    }
    if !(1..=MAX_SECTIONS).contains(&request.sections) {
        return Err(AppError::Validation(format!(
            "sections must be between 1 and {MAX_SECTIONS}"
        )));
    }

    let draft = BookDraft {
        theme: request.theme.trim(),
        total_sections: request.sections,
        intro_text: &request.intro_text,
        review_text: &request.review_text,
        method: request.mode,
    };
    let book = assemble(&draft, extract(&request.sections_text, request.sections));
    let markdown = render_markdown(&book);

    let saved = if request.save {
        Some(state.store.save(&book, &markdown).await?)
    } else {
        None
    };

    Ok(Json(BookResponse {
        book,
        markdown,
        saved,
    }))
}

/// POST /api/v1/books/validate
pub async fn handle_validate(Json(book): Json<Value>) -> Json<ValidationReport> {
    Json(validate_book(&book))
}

/// GET /api/v1/books
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<ListResponse>, AppError> {
    let files = state.store.list().await?;
    Ok(Json(ListResponse {
        total: files.len(),
        files,
    }))
}

/// DELETE /api/v1/books?older_than_days=N
pub async fn handle_clean(
    State(state): State<AppState>,
    Query(query): Query<CleanQuery>,
) -> Result<Json<CleanResponse>, AppError> {
    let older_than_days = query.older_than_days.unwrap_or(DEFAULT_RETENTION_DAYS);
    let deleted = state.store.clean_older_than(older_than_days).await?;
    Ok(Json(CleanResponse {
        deleted,
        older_than_days,
    }))
}
