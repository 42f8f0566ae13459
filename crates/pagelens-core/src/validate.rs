use serde_json::Value;

use crate::error::AppError;
use crate::models::AnalysisResult;

const REQUIRED_FIELDS: [&str; 5] = [
    "summary",
    "keywords",
    "seo_analysis",
    "structured_data",
    "page_title",
];

/// Turns raw model output into an [`AnalysisResult`].
///
/// All-or-nothing: either every field is present with the right type, or the
/// call fails. Unknown extra fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw: &str) -> Result<AnalysisResult, AppError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| AppError::ParseError(e.to_string()))?;

        let Value::Object(map) = &value else {
            return Err(AppError::SchemaError(format!(
                "expected a JSON object, got {}",
                json_type(&value)
            )));
        };

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !map.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::SchemaError(format!(
                "missing field(s): {}",
                missing.join(", ")
            )));
        }

        serde_json::from_value(value).map_err(|e| AppError::SchemaError(e.to_string()))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
