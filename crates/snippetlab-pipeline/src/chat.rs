//! OpenAI-compatible chat completions client.
//!
//! Each task is sent as a system prompt selected by [`TaskKind`] followed by
//! a user message carrying the request payload as JSON.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::{LlmConfig, Provider};
use crate::error::GatewayError;
use crate::gateway::{GatewayRequest, LanguageModel, TaskKind};

/// A [`LanguageModel`] backed by a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionModel {
    client: reqwest::Client,
    endpoint: String,
    config: LlmConfig,
}

impl ChatCompletionModel {
    pub fn new(config: LlmConfig) -> Result<Self, GatewayError> {
        let base_url = config.base_url()?;
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GatewayError::Config(format!("http client setup failed: {}", err)))?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionModel {
    async fn generate(&self, request: &GatewayRequest) -> Result<String, GatewayError> {
        let messages = vec![
            json!({ "role": "system", "content": system_prompt(request.kind) }),
            json!({ "role": "user", "content": request.payload.to_string() }),
        ];
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });
        if request.kind == TaskKind::DetectLanguage {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let mut req = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.as_deref().unwrap_or_default()),
            )
            .json(&body);
        if self.config.provider == Provider::OpenRouter {
            req = req
                .header("HTTP-Referer", "https://localhost:3000")
                .header("X-Title", "snippetlab");
        }

        tracing::debug!("sending {} request to {}", request.kind, self.endpoint);
        let response = req.send().await.map_err(transport_error)?;
        let status = response.status();
        let body_text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body_text)
            .map_err(|err| GatewayError::Malformed(format!("response parse failed: {}", err)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GatewayError::Malformed("response missing assistant content".to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

fn system_prompt(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Code => {
            "You write code. The user message is JSON with a `description` field. \
             Reply with only the source code that implements the description, \
             without explanations or Markdown fences."
        }
        TaskKind::Title => {
            "You name code snippets. The user message is JSON with `description` \
             and `code` fields. Reply with a short title of at most eight words, \
             on one line, without quotes."
        }
        TaskKind::DetectLanguage => {
            "You identify programming languages. The user message is JSON with \
             `description` and `code` fields. Reply with a JSON object of the form \
             {\"language\": \"<lowercase language name>\"}, or {\"language\": null} \
             when the language cannot be determined."
        }
        TaskKind::Tests => {
            "You write unit tests. The user message is JSON with `description`, \
             `language`, `code` and `code_feedback` fields. Reply with only assertion \
             statements that exercise the code and run without a test framework. Do \
             not repeat the code and do not use Markdown fences."
        }
        TaskKind::CodeFromFeedback => {
            "You revise code. The user message is JSON with `description`, \
             `language`, `code` and `feedback` fields. Apply the feedback and reply \
             with only the complete revised code, without Markdown fences."
        }
        TaskKind::TestsFromFeedback => {
            "You revise unit tests. The user message is JSON with `description`, \
             `language`, `code`, `code_feedback`, `test_code` and `feedback` fields. \
             Apply `feedback` to the tests and reply with only the complete revised \
             assertion statements, without Markdown fences."
        }
        TaskKind::Regenerate => {
            "You fix code. The user message is JSON with `description`, `language`, \
             `code`, `code_feedback`, `test_code`, `test_feedback` and `error_message` \
             fields. The tests failed with the given error. Reply with only the \
             complete corrected code, without Markdown fences."
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let model = ChatCompletionModel::new(LlmConfig {
            provider: Provider::OpenAiCompatible,
            api_base_url: Some("http://localhost:8080/v1/".into()),
            ..LlmConfig::default()
        })
        .unwrap();
        assert_eq!(model.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn offline_provider_has_no_endpoint() {
        assert!(ChatCompletionModel::new(LlmConfig::default()).is_err());
    }

    #[test]
    fn response_content_is_optional() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
