use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::models::{AnalysisRequest, AnalysisResult, compute_hash};
use crate::prompt::PromptBuilder;
use crate::retry::RetryPolicy;
use crate::stage::PipelineStage;
use crate::traits::{Fetcher, ModelClient, ModelClientFactory, Sanitizer};
use crate::validate::ResponseValidator;

/// Deadlines and retry behaviour for the two I/O stages.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub fetch_timeout: Duration,
    pub model_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            model_timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }
}

/// Orchestrates the analysis pipeline: fetch → sanitize → prompt → call → parse.
///
/// Generic over the I/O collaborators via traits, enabling dependency injection
/// and testability without real HTTP or LLM calls. The service holds no
/// per-request state and can be shared across concurrent requests.
pub struct AnalysisService<F, S, M>
where
    F: Fetcher,
    S: Sanitizer,
    M: ModelClientFactory,
{
    fetcher: F,
    sanitizer: S,
    models: M,
    prompts: PromptBuilder,
    validator: ResponseValidator,
    options: PipelineOptions,
}

impl<F, S, M> AnalysisService<F, S, M>
where
    F: Fetcher,
    S: Sanitizer,
    M: ModelClientFactory,
{
    pub fn new(fetcher: F, sanitizer: S, models: M) -> Self {
        Self {
            fetcher,
            sanitizer,
            models,
            prompts: PromptBuilder::new(),
            validator: ResponseValidator::new(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the full pipeline for one request.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AppError> {
        self.analyze_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run the full pipeline, aborting with [`AppError::Cancelled`] as soon as
    /// `cancel` fires.
    ///
    /// 1. Fetch HTML from the URL
    /// 2. Sanitize it to title + bounded text
    /// 3. Render the prompt
    /// 4. Call the model with the request's credentials
    /// 5. Validate the reply into an [`AnalysisResult`]
    pub async fn analyze_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AppError> {
        match self.run(request, cancel).await {
            Ok(result) => {
                tracing::debug!(stage = %PipelineStage::Done, "Pipeline finished");
                Ok(result)
            }
            Err(e) => {
                let failed_at = e.stage().unwrap_or(PipelineStage::Failed);
                tracing::warn!(
                    stage = %failed_at,
                    error = %e,
                    "Analysis failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AppError> {
        let url = request.url();
        let opts = &self.options;

        // 1. Fetch
        let stage = PipelineStage::Idle.next();
        tracing::info!(%stage, "Fetching {}", url);
        let document = opts
            .retry
            .run(stage, cancel, || {
                guarded(stage, opts.fetch_timeout, cancel, self.fetcher.fetch(url))
            })
            .await?;
        tracing::info!(
            status = document.status_code,
            "Fetched {} bytes of HTML",
            document.html.len()
        );

        // 2. Sanitize
        let stage = checkpoint(stage.next(), cancel)?;
        let content = self.sanitizer.sanitize(&document.html);
        let content_hash = compute_hash(&content.body_text);
        tracing::info!(
            %stage,
            content_hash = %&content_hash[..8],
            title = %content.title,
            "Sanitized to {} characters of text",
            content.body_text.chars().count()
        );

        // 3. Prompt
        let stage = checkpoint(stage.next(), cancel)?;
        let prompt = self.prompts.build(&content);
        tracing::debug!(%stage, prompt_len = prompt.as_str().len(), "Prompt rendered");

        // 4. Call
        let stage = checkpoint(stage.next(), cancel)?;
        let client = self.models.create(request)?;
        tracing::info!(%stage, "Calling model {} ...", request.model());
        let raw = opts
            .retry
            .run(stage, cancel, || {
                guarded(stage, opts.model_timeout, cancel, client.complete(prompt.as_str()))
            })
            .await?;
        tracing::info!("Model replied with {} bytes", raw.len());

        // 5. Parse
        let stage = checkpoint(stage.next(), cancel)?;
        let result = self.validator.validate(&raw)?;
        tracing::info!(%stage, keywords = result.keywords.len(), "Analysis complete");

        Ok(result)
    }
}

/// Fail with [`AppError::Cancelled`] if cancellation was requested before
/// entering `stage`.
fn checkpoint(stage: PipelineStage, cancel: &CancellationToken) -> Result<PipelineStage, AppError> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled(stage));
    }
    Ok(stage)
}

/// Bound one I/O attempt by a deadline and the cancellation token.
async fn guarded<T, Fut>(
    stage: PipelineStage,
    timeout: Duration,
    cancel: &CancellationToken,
    fut: Fut,
) -> Result<T, AppError>
where
    Fut: Future<Output = Result<T, AppError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(AppError::Cancelled(stage)),
        outcome = tokio::time::timeout(timeout, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout {
                stage,
                secs: timeout.as_secs(),
            }),
        },
    }
}
