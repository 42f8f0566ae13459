use serde::{Deserialize, Serialize};

use pagelens_core::AnalysisResult;

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

/// Body of `POST /api/analyze`.
///
/// Every field is optional at the wire level so that missing values surface
/// as 400/401 with a readable message instead of a deserialization failure.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Page to analyze
    pub url: Option<String>,
    /// Key for the chat-completion endpoint; used for this call only
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL (default `https://api.openai.com/v1`)
    pub base_url: Option<String>,
    /// Model identifier (default `gpt-4o-mini`)
    pub model: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: AnalysisData,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AnalysisData {
    pub summary: String,
    pub keywords: Vec<String>,
    pub seo_analysis: String,
    /// Markdown table, or `"none"`
    pub structured_data: String,
    pub page_title: String,
}

impl From<AnalysisResult> for AnalysisData {
    fn from(r: AnalysisResult) -> Self {
        Self {
            summary: r.summary,
            keywords: r.keywords,
            seo_analysis: r.seo_analysis,
            structured_data: r.structured_data,
            page_title: r.page_title,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
