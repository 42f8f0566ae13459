use thiserror::Error;

use crate::stage::PipelineStage;

/// Caller mistakes detected before any I/O happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a valid URL")]
    MissingUrl,

    #[error("Please provide an API key")]
    MissingApiKey,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Application-wide error types for PageLens.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required input missing or malformed.
    #[error("{0}")]
    ValidationError(#[from] ValidationError),

    /// The target page could not be retrieved.
    #[error("Failed to fetch page: {message}")]
    FetchError {
        message: String,
        /// `None` when the failure happened below HTTP (DNS, connect, body read).
        status_code: Option<u16>,
    },

    /// The target URL was refused before any request was sent (SSRF guard,
    /// unsupported scheme). Never retried.
    #[error("Failed to fetch page: {0}")]
    FetchRejected(String),

    /// The chat-completion endpoint failed or rejected the call.
    #[error("Model endpoint error: {message}")]
    UpstreamError {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    /// The model answered with something that is not JSON.
    #[error("Model returned a response that is not valid JSON")]
    ParseError(String),

    /// The model answered with JSON of the wrong shape.
    #[error("Model response does not match the analysis schema: {0}")]
    SchemaError(String),

    /// A pipeline stage exceeded its deadline.
    #[error("Timed out after {secs} seconds while {stage}")]
    Timeout { stage: PipelineStage, secs: u64 },

    /// The run was cancelled before it could finish.
    #[error("Analysis cancelled while {0}")]
    Cancelled(PipelineStage),

    /// Invalid process configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::FetchError { status_code, .. } => match status_code {
                None => true,
                Some(code) => *code == 408 || *code == 429 || *code >= 500,
            },
            AppError::UpstreamError { retryable, .. } => *retryable,
            AppError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// The pipeline stage this error originated from, if it came from one.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            AppError::ValidationError(_) => Some(PipelineStage::Idle),
            AppError::FetchError { .. } | AppError::FetchRejected(_) => {
                Some(PipelineStage::Fetching)
            }
            AppError::UpstreamError { .. } => Some(PipelineStage::Calling),
            AppError::ParseError(_) | AppError::SchemaError(_) => Some(PipelineStage::Parsing),
            AppError::Timeout { stage, .. } => Some(*stage),
            AppError::Cancelled(stage) => Some(*stage),
            AppError::ConfigError(_) => None,
        }
    }
}
