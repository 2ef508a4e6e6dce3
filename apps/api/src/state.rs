use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::storage::BookStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured; generation then answers 503.
    pub llm: Option<Arc<dyn TextGenerator>>,
    pub store: BookStore,
    pub config: Config,
}

impl AppState {
    pub fn llm(&self) -> Result<&dyn TextGenerator, AppError> {
        self.llm.as_deref().ok_or(AppError::LlmUnavailable)
    }
}
