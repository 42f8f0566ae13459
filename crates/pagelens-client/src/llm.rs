use std::fmt;
use std::time::Duration;

use pagelens_core::error::AppError;
use pagelens_core::models::AnalysisRequest;
use pagelens_core::traits::{ModelClient, ModelClientFactory};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Upstream error bodies are cut to this many characters before they reach
/// the caller. Gateways like to answer with whole HTML pages.
const MAX_ERROR_DETAIL_CHARS: usize = 300;

/// OpenAI-compatible chat-completion client.
///
/// Works with any OpenAI-compatible API, including:
/// - OpenAI directly (`https://api.openai.com/v1`)
/// - Gemini via compatibility layer (`https://generativelanguage.googleapis.com/v1beta/openai`)
/// - Local servers such as Ollama (`http://localhost:11434/v1`)
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        Self::with_timeout(api_key, model, base_url, DEFAULT_LLM_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ModelClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("Request to {url} timed out")
                } else if e.is_connect() {
                    format!("Connection failed: {e}")
                } else {
                    e.to_string()
                };
                AppError::UpstreamError {
                    message,
                    status_code: None,
                    retryable: true,
                }
            })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), model = %self.model, "POST {}", url);
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();

            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.trim().to_string());
            let detail = truncate_detail(&detail);

            let message = match status_code {
                401 | 403 => format!("authentication rejected (HTTP {status_code}): {detail}"),
                429 => format!("rate limited (HTTP 429): {detail}"),
                _ => format!("HTTP {status_code}: {detail}"),
            };

            return Err(AppError::UpstreamError {
                message,
                status_code: Some(status_code),
                retryable: status_code == 429 || status_code >= 500,
            });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| AppError::UpstreamError {
                message: format!("Failed to decode chat completion: {e}"),
                status_code: Some(status.as_u16()),
                retryable: false,
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::UpstreamError {
                message: "Empty response from model".into(),
                status_code: Some(status.as_u16()),
                retryable: false,
            })
    }
}

fn truncate_detail(detail: &str) -> String {
    match detail.char_indices().nth(MAX_ERROR_DETAIL_CHARS) {
        Some((idx, _)) => format!("{}...", &detail[..idx]),
        None => detail.to_string(),
    }
}

/// Factory that creates an [`OpenAiClient`] from each request's credentials.
///
/// Holds no credentials itself; only the shared timeout.
#[derive(Debug, Clone)]
pub struct OpenAiClientFactory {
    timeout: Duration,
}

impl OpenAiClientFactory {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OpenAiClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelClientFactory for OpenAiClientFactory {
    type Client = OpenAiClient;

    fn create(&self, request: &AnalysisRequest) -> Result<OpenAiClient, AppError> {
        OpenAiClient::with_timeout(
            request.api_key(),
            request.model(),
            request.base_url(),
            self.timeout,
        )
    }
}
