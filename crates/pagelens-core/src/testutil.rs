//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::{AnalysisRequest, CleanedContent, RawDocument};
use crate::traits::{Fetcher, ModelClient, ModelClientFactory, Sanitizer};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    calls: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    /// Sleep for `delay` before answering, to exercise timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<RawDocument, AppError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok("<html><body>default</body></html>".to_string())
            } else {
                responses.remove(0)
            }
        };
        next.map(|html| RawDocument {
            html,
            status_code: 200,
        })
    }
}

// ---------------------------------------------------------------------------
// MockSanitizer
// ---------------------------------------------------------------------------

/// Mock sanitizer that hands the HTML through untouched as body text.
#[derive(Clone)]
pub struct MockSanitizer {
    title: String,
}

impl MockSanitizer {
    pub fn passthrough() -> Self {
        Self {
            title: "Mock Page".to_string(),
        }
    }
}

impl Sanitizer for MockSanitizer {
    fn sanitize(&self, html: &str) -> CleanedContent {
        CleanedContent {
            title: self.title.clone(),
            body_text: html.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// MockModelClient
// ---------------------------------------------------------------------------

/// Mock model client that replies with queued raw text.
#[derive(Clone)]
pub struct MockModelClient {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ModelClient for MockModelClient {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("{}".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockModelClientFactory
// ---------------------------------------------------------------------------

/// Mock factory whose clients share one response queue and one prompt log.
#[derive(Clone)]
pub struct MockModelClientFactory {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    /// Every prompt sent by any created client, in order.
    pub prompts: Arc<Mutex<Vec<String>>>,
    /// `(base_url, model)` of every created client.
    pub created: Arc<Mutex<Vec<(String, String)>>>,
    create_error: Arc<Mutex<Option<AppError>>>,
}

impl MockModelClientFactory {
    pub fn new(reply: &str) -> Self {
        Self::with_responses(vec![Ok(reply.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            create_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_create_error(error: AppError) -> Self {
        let factory = Self::with_responses(Vec::new());
        *factory.create_error.lock().unwrap() = Some(error);
        factory
    }

    /// Number of completion calls made through any created client.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ModelClientFactory for MockModelClientFactory {
    type Client = MockModelClient;

    fn create(&self, request: &AnalysisRequest) -> Result<MockModelClient, AppError> {
        if let Some(e) = self.create_error.lock().unwrap().take() {
            return Err(e);
        }
        self.created
            .lock()
            .unwrap()
            .push((request.base_url().to_string(), request.model().to_string()));
        Ok(MockModelClient {
            responses: Arc::clone(&self.responses),
            prompts: Arc::clone(&self.prompts),
        })
    }
}
