// Book generation: prompts, personas, the two generators and the advisory tools.
// All LLM calls go through llm_client::TextGenerator.

pub mod crew;
pub mod handlers;
pub mod personas;
pub mod prompts;
pub mod simple;
pub mod tools;

use crate::book::{Book, GenerationMethod};
use crate::llm_client::{LlmError, TextGenerator};

/// Generates a whole book with the requested method.
pub async fn generate_book(
    llm: &dyn TextGenerator,
    theme: &str,
    total: usize,
    method: GenerationMethod,
) -> Result<Book, LlmError> {
    match method {
        GenerationMethod::Simple => simple::generate_simple_book(llm, theme, total).await,
        GenerationMethod::Crew => crew::generate_crew_book(llm, theme, total).await,
    }
}
