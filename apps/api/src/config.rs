use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;

/// Application configuration loaded from environment variables.
/// Fails at startup when a numeric variable does not parse.
#[derive(Clone)]
pub struct Config {
    /// Generation endpoints answer 503 without it.
    pub openai_api_key: Option<String>,
    pub model_name: String,
    pub openai_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub output_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model_name: get("OPENAI_MODEL_NAME", "gpt-4"),
            openai_base_url: get("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            temperature: parse_var(&lookup, "TEMPERATURE", "0.7")?,
            max_tokens: parse_var(&lookup, "MAX_TOKENS", "2000")?,
            output_dir: PathBuf::from(get("OUTPUT_DIR", "output")),
            port: parse_var(&lookup, "PORT", "8080")?,
            rust_log: get("RUST_LOG", "info"),
        })
    }

    /// LLM parameters, when an API key is configured.
    pub fn llm_settings(&self) -> Option<LlmSettings> {
        let api_key = self.openai_api_key.clone()?;
        Some(LlmSettings {
            api_key,
            model: self.model_name.clone(),
            base_url: self.openai_base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model_name", &self.model_name)
            .field("openai_base_url", &self.openai_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("output_dir", &self.output_dir)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
