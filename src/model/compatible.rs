//! OpenAI-compatible chat completions client.
//!
//! DashScope's compatible mode, DeepSeek, and the OpenAI API itself all
//! speak the same `/chat/completions` shape, so one implementation covers
//! every endpoint this service talks to.

use super::{api_error, ModelClient, ModelParams};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for one OpenAI-compatible endpoint.
pub struct OpenAiCompatibleClient {
    name: String,
    model: String,
    base_url: String,
    api_key: Option<String>,
    params: ModelParams,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(model: &str, base_url: &str, api_key: Option<&str>, params: ModelParams) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            name: params.family.label().to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
            params,
            client,
        }
    }

    /// Parameters this client sends with every request.
    pub fn params(&self) -> ModelParams {
        self.params
    }

    /// Endpoint URL: append `/chat/completions` unless the configured base
    /// URL already ends with it.
    fn chat_completions_url(&self) -> String {
        let already_full = reqwest::Url::parse(&self.base_url)
            .map(|url| url.path().trim_end_matches('/').ends_with("/chat/completions"))
            .unwrap_or_else(|_| self.base_url.ends_with("/chat/completions"));

        if already_full {
            self.base_url.clone()
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "{} API key not set. Add model.api_key to config.toml or set POLICYGEN_API_KEY.",
                self.name
            )
        })?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message { role: "system".to_string(), content: system_prompt.to_string() },
                Message { role: "user".to_string(), content: user_message.to_string() },
            ],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(self.chat_completions_url())
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }

        let chat_response: ApiChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("No response from {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params_for_model;

    fn make_client(model: &str, url: &str, key: Option<&str>) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(model, url, key, params_for_model(model))
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = make_client("qwen-turbo", "https://api.example.com/v1/", Some("sk-test"));
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn client_name_follows_model_family() {
        assert_eq!(make_client("gpt-4o", "https://x.test/v1", None).name(), "gpt");
        assert_eq!(make_client("deepseek-chat", "https://x.test/v1", None).name(), "qwen-deepseek");
    }

    #[test]
    fn url_appends_chat_completions() {
        let client = make_client("qwen-turbo", "https://api.example.com/v1", Some("sk-test"));
        assert_eq!(client.chat_completions_url(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn url_respects_full_endpoint() {
        let client = make_client(
            "qwen-turbo",
            "https://api.example.com/v1/chat/completions",
            Some("sk-test"),
        );
        assert_eq!(client.chat_completions_url(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn url_handles_dashscope_compatible_mode() {
        let client = make_client(
            "qwen-turbo",
            "https://dashscope.aliyuncs.com/compatible-mode/v1",
            Some("sk-test"),
        );
        assert_eq!(
            client.chat_completions_url(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn complete_fails_without_api_key() {
        let client = make_client("qwen-turbo", "https://api.example.com/v1", None);
        let error = client.complete("system", "hello").await.unwrap_err();
        assert!(error.to_string().contains("API key not set"));
    }

    #[test]
    fn request_serializes_with_resolved_params() {
        let request = ChatRequest {
            model: "qwen-turbo".to_string(),
            messages: vec![
                Message { role: "system".to_string(), content: "be brief".to_string() },
                Message { role: "user".to_string(), content: "hi".to_string() },
            ],
            temperature: 0.1,
            max_tokens: 16000,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 16000);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_deserializes_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}]}"#;
        let response: ApiChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Hello!"));
    }

    #[test]
    fn response_tolerates_empty_choices() {
        let response: ApiChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(response.choices.is_empty());
    }
}
