use std::future::Future;

use crate::error::AppError;
use crate::models::{AnalysisRequest, CleanedContent, RawDocument};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawDocument, AppError>> + Send;
}

/// Reduces raw HTML to a title and bounded plain text.
///
/// Implementations must be pure: no I/O, and the same input always yields
/// the same output. Malformed markup is never an error.
pub trait Sanitizer: Send + Sync + Clone {
    fn sanitize(&self, html: &str) -> CleanedContent;
}

/// Sends a prompt to a chat-completion endpoint and returns the raw reply text.
pub trait ModelClient: Send + Sync + Clone {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Builds a [`ModelClient`] from the credentials carried by one request.
///
/// Endpoint, model and API key are per request; nothing about them is kept
/// after the client is dropped.
pub trait ModelClientFactory: Send + Sync + Clone {
    type Client: ModelClient;

    fn create(&self, request: &AnalysisRequest) -> Result<Self::Client, AppError>;
}
