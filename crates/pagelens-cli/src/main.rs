use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pagelens_client::{OpenAiClientFactory, ReqwestFetcher, ScraperSanitizer};
use pagelens_core::models::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use pagelens_core::traits::{Fetcher, Sanitizer};
use pagelens_core::{AnalysisRequest, AnalysisService, PipelineOptions, PromptBuilder, RetryPolicy};

#[derive(Parser)]
#[command(name = "pagelens", version, about = "Summarize and SEO-audit a web page with an LLM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a web page and print the result as JSON
    Analyze {
        /// Target URL to analyze
        #[arg(short, long)]
        url: String,

        /// API key for the chat-completion endpoint
        #[arg(short, long, env = "PAGELENS_API_KEY", hide_env_values = true)]
        api_key: String,

        /// OpenAI-compatible API base URL
        #[arg(short, long, env = "PAGELENS_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// LLM model to use (e.g., "gpt-4o-mini", "gemini-2.5-flash")
        #[arg(short, long, env = "PAGELENS_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        /// Seconds to wait for the page
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        fetch_timeout: u64,

        /// Seconds to wait for the model
        #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
        model_timeout: u64,

        /// Retries for transient fetch/model failures
        #[arg(long, default_value_t = 2)]
        retries: u32,
    },

    /// Fetch and sanitize a page, then print the cleaned content and prompt without calling a model
    Inspect {
        /// Target URL to inspect
        #[arg(short, long)]
        url: String,

        /// Print the rendered prompt instead of the cleaned content
        #[arg(long, default_value_t = false)]
        prompt: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pagelens=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            url,
            api_key,
            base_url,
            model,
            fetch_timeout,
            model_timeout,
            retries,
        } => {
            let request = AnalysisRequest::new(url, api_key)?
                .with_base_url(Some(base_url))
                .with_model(Some(model));
            let options = PipelineOptions {
                fetch_timeout: Duration::from_secs(fetch_timeout),
                model_timeout: Duration::from_secs(model_timeout),
                retry: RetryPolicy::default().with_max_retries(retries),
            };
            cmd_analyze(&request, options).await?;
        }
        Commands::Inspect { url, prompt } => {
            cmd_inspect(&url, prompt).await?;
        }
    }

    Ok(())
}

async fn cmd_analyze(request: &AnalysisRequest, options: PipelineOptions) -> Result<()> {
    let fetcher = ReqwestFetcher::with_timeout(options.fetch_timeout)
        .context("Failed to create HTTP client")?
        .allow_private_urls();
    let models = OpenAiClientFactory::new().with_timeout(options.model_timeout);
    let service =
        AnalysisService::new(fetcher, ScraperSanitizer::new(), models).with_options(options);

    let result = service.analyze(request).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_inspect(url: &str, show_prompt: bool) -> Result<()> {
    let fetcher = ReqwestFetcher::new()
        .context("Failed to create HTTP client")?
        .allow_private_urls();

    tracing::info!("Fetching {}", url);
    let document = fetcher.fetch(url).await?;
    let content = ScraperSanitizer::new().sanitize(&document.html);

    tracing::info!(
        "Cleaned {} bytes of HTML to {} characters of text",
        document.html.len(),
        content.body_text.chars().count()
    );

    if show_prompt {
        println!("{}", PromptBuilder::new().build(&content));
    } else {
        println!("{}", serde_json::to_string_pretty(&content)?);
    }
    Ok(())
}
