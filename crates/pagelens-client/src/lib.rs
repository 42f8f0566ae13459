pub mod fetcher;
pub mod llm;
pub mod sanitizer;

pub use fetcher::ReqwestFetcher;
pub use llm::{OpenAiClient, OpenAiClientFactory};
pub use sanitizer::ScraperSanitizer;
