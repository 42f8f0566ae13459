use std::fmt;

use crate::models::CleanedContent;

/// Sentinel the model must use when the page has no tabular data.
pub const NO_STRUCTURED_DATA: &str = "none";

/// A rendered model instruction. Opaque to everything except the model client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt(String);

impl AnalysisPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders [`CleanedContent`] into the analysis instruction.
///
/// The output contract (field names, the `"none"` sentinel, JSON only) must
/// stay in sync with [`AnalysisResult`](crate::models::AnalysisResult).
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    summary_max_chars: usize,
    min_keywords: usize,
    max_keywords: usize,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            summary_max_chars: 200,
            min_keywords: 5,
            max_keywords: 8,
        }
    }

    pub fn build(&self, content: &CleanedContent) -> AnalysisPrompt {
        AnalysisPrompt(format!(
            "You are a web page analyst. Analyze the following page content and return JSON.\n\
             \n\
             Page title: {title}\n\
             Body excerpt: {body}\n\
             \n\
             Tasks:\n\
             1. Write a summary of at most {summary} characters (summary)\n\
             2. Extract {min_kw} to {max_kw} keywords (keywords)\n\
             3. Assess the page's SEO quality (seo_analysis)\n\
             4. If the page contains tabular data, render it as a Markdown table; otherwise use \"{none}\" (structured_data)\n\
             \n\
             Respond strictly with a single JSON object and nothing else, no prose and no code fences, \
             with exactly these fields: \
             {{\"summary\": \"...\", \"keywords\": [], \"seo_analysis\": \"...\", \"structured_data\": \"...\", \"page_title\": \"...\"}}",
            title = content.title,
            body = content.body_text,
            summary = self.summary_max_chars,
            min_kw = self.min_keywords,
            max_kw = self.max_keywords,
            none = NO_STRUCTURED_DATA,
        ))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
