//! Axum route handler for the Generation API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::book::handlers::BookResponse;
use crate::book::markdown::render_markdown;
use crate::book::GenerationMethod;
use crate::errors::AppError;
use crate::generation::generate_book;
use crate::state::AppState;

pub const DEFAULT_THEME: &str = "Les Mystères d'Égypte";
pub const DEFAULT_SECTIONS: usize = 3;
pub const MAX_SECTIONS: usize = 99;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateBookRequest {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_sections")]
    pub sections: usize,
    #[serde(default)]
    pub mode: GenerationMethod,
    #[serde(default = "default_save")]
    pub save: bool,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_sections() -> usize {
    DEFAULT_SECTIONS
}

fn default_save() -> bool {
    true
}

impl GenerateBookRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.theme.trim().is_empty() {
            return Err(AppError::Validation("theme cannot be empty".to_string()));
        }
        if !(1..=MAX_SECTIONS).contains(&self.sections) {
            return Err(AppError::Validation(format!(
                "sections must be between 1 and {MAX_SECTIONS}"
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/books
///
/// Generates a book with the requested method, renders it, and saves both files
/// unless `save` is false.
pub async fn handle_generate_book(
    State(state): State<AppState>,
    Json(request): Json<GenerateBookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    request.validate()?;
    let llm = state.llm()?;
    let theme = request.theme.trim();

    let book = generate_book(llm, theme, request.sections, request.mode).await?;
    let markdown = render_markdown(&book);

    let saved = if request.save {
        Some(state.store.save(&book, &markdown).await?)
    } else {
        None
    };
    info!(book_id = %book.id, method = ?request.mode, saved = saved.is_some(), "book generated");

    Ok(Json(BookResponse {
        book,
        markdown,
        saved,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> GenerateBookRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request("{}");
        assert_eq!(req.theme, DEFAULT_THEME);
        assert_eq!(req.sections, DEFAULT_SECTIONS);
        assert_eq!(req.mode, GenerationMethod::Simple);
        assert!(req.save);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_section_bounds() {
        assert!(request(r#"{"sections": 0}"#).validate().is_err());
        assert!(request(r#"{"sections": 99, "mode": "crew"}"#).validate().is_ok());
        assert!(request(r#"{"sections": 100}"#).validate().is_err());
    }

    #[test]
    fn test_blank_theme_is_rejected() {
        assert!(matches!(
            request(r#"{"theme": "   "}"#).validate(),
            Err(AppError::Validation(_))
        ));
    }
}
