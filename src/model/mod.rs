//! Model client subsystem.
//!
//! One OpenAI-compatible HTTP implementation behind the [`ModelClient`]
//! trait. Request parameters are resolved from the configured model name
//! once, at construction (see [`params`]).

pub mod compatible;
#[cfg(test)]
pub mod mock;
pub mod params;

pub use compatible::OpenAiCompatibleClient;
pub use params::{params_for_model, ModelFamily, ModelParams};

use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;

/// Maximum characters of upstream error body surfaced to callers.
const MAX_API_ERROR_CHARS: usize = 200;

/// A chat completion backend. One round trip per call, no streaming.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Backend name used in logs and error messages.
    fn name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Issue one completion with a system and a user message, returning the
    /// first choice's content.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String>;
}

/// Build the model client from configuration.
///
/// The configured `max_tokens` overrides the family default when set.
pub fn create_model_client(config: &Config) -> Arc<dyn ModelClient> {
    let mut params = params_for_model(&config.model.name);
    if let Some(max_tokens) = config.model.max_tokens {
        params.max_tokens = max_tokens;
    }
    Arc::new(OpenAiCompatibleClient::new(
        &config.model.name,
        &config.model.api_url,
        config.model.api_key.as_deref(),
        params,
    ))
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

/// Redact `sk-` style API tokens from upstream error text.
fn scrub_secret_patterns(input: &str) -> String {
    const PREFIX: &str = "sk-";
    let mut scrubbed = input.to_string();
    let mut search_from = 0;

    while let Some(offset) = scrubbed[search_from..].find(PREFIX) {
        let start = search_from + offset;
        let token_start = start + PREFIX.len();
        let token_len: usize = scrubbed[token_start..]
            .chars()
            .take_while(|c| is_token_char(*c))
            .map(char::len_utf8)
            .sum();

        if token_len == 0 {
            search_from = token_start;
            continue;
        }
        scrubbed.replace_range(start..token_start + token_len, "[REDACTED]");
        search_from = start + "[REDACTED]".len();
    }
    scrubbed
}

/// Scrub secrets from an upstream error body and truncate it to a bounded,
/// char-boundary-safe length.
fn sanitize_api_error(body: &str) -> String {
    let scrubbed = scrub_secret_patterns(body);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }
    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Convert a non-2xx response into a bounded, secret-free error.
pub(crate) async fn api_error(client_name: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{client_name} API error ({status}): {sanitized}")
}
