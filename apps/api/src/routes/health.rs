use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "chasse-api"
    }))
}

/// GET /api/v1/info
/// Model parameters and storage location. Never exposes the API key itself.
pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "model": config.model_name,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
        "output_dir": config.output_dir,
        "api_key_configured": config.openai_api_key.is_some(),
        "generation_available": state.llm.is_some(),
    }))
}
