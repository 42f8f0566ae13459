use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::ValidationError;

/// Chat-completion endpoint used when the caller does not name one.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model identifier used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Title substituted when a page has no usable `<title>`.
pub const UNTITLED: &str = "Untitled";

/// Upper bound on the body text handed to the model, in characters.
pub const MAX_BODY_CHARS: usize = 8000;

/// One caller's request to analyze one page.
///
/// Built only through [`AnalysisRequest::new`], so a value of this type always
/// carries a non-empty http(s) URL and a non-empty API key. The key is
/// redacted from the `Debug` output.
#[derive(Clone)]
pub struct AnalysisRequest {
    url: String,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnalysisRequest {
    /// Validate the mandatory inputs. The URL is checked before the key.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }

        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }

        let parsed = Url::parse(&url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidUrl(format!(
                "scheme '{}' is not allowed (only http/https)",
                parsed.scheme()
            )));
        }

        Ok(Self {
            url,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the chat-completion endpoint. Blank values keep the default.
    pub fn with_base_url(mut self, base_url: Option<impl AsRef<str>>) -> Self {
        if let Some(base_url) = non_blank(base_url) {
            self.base_url = base_url;
        }
        self
    }

    /// Override the model identifier. Blank values keep the default.
    pub fn with_model(mut self, model: Option<impl AsRef<str>>) -> Self {
        if let Some(model) = non_blank(model) {
            self.model = model;
        }
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

fn non_blank(value: Option<impl AsRef<str>>) -> Option<String> {
    value
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub html: String,
    pub status_code: u16,
}

/// Title and bounded, whitespace-normalized body text of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedContent {
    pub title: String,
    pub body_text: String,
}

/// The structured analysis returned to the caller.
///
/// Every field is required when deserializing; see
/// [`ResponseValidator`](crate::validate::ResponseValidator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub keywords: Vec<String>,
    pub seo_analysis: String,
    /// Markdown table of any tabular data on the page, or `"none"`.
    pub structured_data: String,
    pub page_title: String,
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
