/// LLM Client: the single point of entry for all chat-completion calls.
///
/// No other module talks to the OpenAI API. Generators depend on the
/// [`TextGenerator`] trait so they can run against scripted output in tests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
}

/// Model parameters shared by every call.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it is non-blank.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Anything that can turn a system + user prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs and metadata.
    fn model(&self) -> &str;
}

/// OpenAI chat-completions client with retry and JSON helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            settings,
            backoff: BASE_BACKOFF,
        })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// One chat completion. Retries 429, 5xx and transport errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        let url = format!(
            "{}{CHAT_COMPLETIONS_PATH}",
            self.settings.base_url.trim_end_matches('/')
        );

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1x, 2x, 4x the base delay
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.settings.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        info!(model = %self.settings.model, chars = text.len(), "completion received");
        Ok(text.to_string())
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    stripped
        .trim_start()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped.trim_start())
}

/// Deserializes the outermost `{...}` span of `text`, fences or surrounding prose allowed.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    let object = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };
    serde_json::from_str(object).map_err(LlmError::Parse)
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order and records every prompt it was given.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGenerator {
        pub fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// `(system, prompt)` pairs, in call order.
        pub fn prompts(&self) -> Vec<(String, String)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyContent)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_object_ignores_surrounding_prose() {
        let value: Value =
            parse_json_object("Voici le rapport : {\"score\": {\"a\": 1}} Merci !").unwrap();
        assert_eq!(value, json!({"score": {"a": 1}}));
    }

    #[test]
    fn test_parse_json_object_without_object_fails() {
        assert!(matches!(
            parse_json_object::<Value>("pas de json ici"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let settings = settings("http://localhost", "  ");
        assert!(matches!(
            LlmClient::new(settings),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let rendered = format!("{:?}", settings("http://localhost", "sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    fn settings(base_url: &str, api_key: &str) -> LlmSettings {
        LlmSettings {
            api_key: api_key.to_string(),
            model: "gpt-4".to_string(),
            base_url: base_url.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    /// Serves `/chat/completions` locally; fails with `status` for the first `failures` calls.
    async fn fake_openai(status: StatusCode, failures: u32) -> (String, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < failures {
                        return (status, Json(json!({"error": {"message": "boom"}})));
                    }
                    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
                    (
                        StatusCode::OK,
                        Json(json!({
                            "choices": [{"message": {"role": "assistant", "content": format!("écho: {prompt}")}}],
                            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
                        })),
                    )
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), calls)
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let (base_url, calls) = fake_openai(StatusCode::OK, 0).await;
        let client = LlmClient::new(settings(&base_url, "sk-test")).unwrap();

        let text = client.generate("système", "bonjour").await.unwrap();
        assert_eq!(text, "écho: bonjour");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.model(), "gpt-4");
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let (base_url, calls) = fake_openai(StatusCode::SERVICE_UNAVAILABLE, 2).await;
        let client = LlmClient::new(settings(&base_url, "sk-test"))
            .unwrap()
            .with_backoff(Duration::from_millis(5));

        let text = client.generate("s", "encore").await.unwrap();
        assert_eq!(text, "écho: encore");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (base_url, calls) = fake_openai(StatusCode::TOO_MANY_REQUESTS, 10).await;
        let client = LlmClient::new(settings(&base_url, "sk-test"))
            .unwrap()
            .with_backoff(Duration::from_millis(5));

        let err = client.generate("s", "p").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let (base_url, calls) = fake_openai(StatusCode::UNAUTHORIZED, 10).await;
        let client = LlmClient::new(settings(&base_url, "sk-test")).unwrap();

        match client.generate("s", "p").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let scripted = testing::ScriptedGenerator::new(["un", "deux"]);
        assert_eq!(scripted.generate("s", "p1").await.unwrap(), "un");
        assert_eq!(scripted.generate("s", "p2").await.unwrap(), "deux");
        assert!(matches!(
            scripted.generate("s", "p3").await,
            Err(LlmError::EmptyContent)
        ));
        assert_eq!(scripted.prompts().len(), 3);
    }
}
