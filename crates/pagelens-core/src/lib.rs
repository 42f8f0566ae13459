pub mod analyze;
pub mod error;
pub mod models;
pub mod prompt;
pub mod retry;
pub mod stage;
pub mod traits;
pub mod validate;

#[cfg(test)]
mod testutil;

pub use analyze::{AnalysisService, PipelineOptions};
pub use error::{AppError, ValidationError};
pub use models::{AnalysisRequest, AnalysisResult, CleanedContent, RawDocument, compute_hash};
pub use prompt::{AnalysisPrompt, PromptBuilder};
pub use retry::RetryPolicy;
pub use stage::PipelineStage;
pub use traits::{Fetcher, ModelClient, ModelClientFactory, Sanitizer};
pub use validate::ResponseValidator;
