pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::book::handlers as books;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/info", get(health::info_handler))
        // Books
        .route(
            "/api/v1/books",
            post(generation::handle_generate_book)
                .get(books::handle_list)
                .delete(books::handle_clean),
        )
        .route("/api/v1/books/assemble", post(books::handle_assemble))
        .route("/api/v1/books/validate", post(books::handle_validate))
        .with_state(state)
}
