use pagelens_client::{OpenAiClientFactory, ReqwestFetcher, ScraperSanitizer};
use pagelens_core::{AnalysisService, AppError, PipelineOptions, RetryPolicy};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

pub type Analyzer = AnalysisService<ReqwestFetcher, ScraperSanitizer, OpenAiClientFactory>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub analyzer: Analyzer,
    /// Cancelled on shutdown; each request runs under a child token.
    pub shutdown: CancellationToken,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Result<Self, AppError> {
        let fetcher = ReqwestFetcher::with_timeout(config.fetch_timeout)?;
        let fetcher = if config.allow_private_urls {
            fetcher.allow_private_urls()
        } else {
            fetcher
        };
        let models = OpenAiClientFactory::new().with_timeout(config.model_timeout);

        let options = PipelineOptions {
            fetch_timeout: config.fetch_timeout,
            model_timeout: config.model_timeout,
            retry: RetryPolicy::default().with_max_retries(config.max_retries),
        };

        Ok(Self {
            analyzer: AnalysisService::new(fetcher, ScraperSanitizer::new(), models)
                .with_options(options),
            shutdown: CancellationToken::new(),
            max_body_bytes: config.max_body_bytes,
        })
    }
}
