use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tracing::Instrument;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use pagelens_core::AnalysisRequest;

use crate::dto::{AnalysisData, AnalyzeRequest, AnalyzeResponse, HealthResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
///
/// Oversized bodies fail JSON extraction with 413 and go through [`ApiError`]
/// like any other bad body.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/api/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis result", body = AnalyzeResponse),
        (status = 400, description = "Missing or malformed URL", body = crate::dto::ErrorResponse),
        (status = 401, description = "Missing API key", body = crate::dto::ErrorResponse),
        (status = 500, description = "Fetch, model or parse failure", body = crate::dto::ErrorResponse),
    ),
    tag = "analyze"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<axum::Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let axum::Json(body) = body?;

    // Validation happens before any I/O.
    let request = AnalysisRequest::new(
        body.url.unwrap_or_default(),
        body.api_key.unwrap_or_default(),
    )?
    .with_base_url(body.base_url.as_deref())
    .with_model(body.model.as_deref());

    let cancel = state.shutdown.child_token();
    let span = tracing::info_span!(
        "analyze",
        request_id = %Uuid::new_v4(),
        url = %request.url(),
        model = %request.model(),
    );

    let result = state
        .analyzer
        .analyze_with_cancel(&request, &cancel)
        .instrument(span)
        .await?;

    Ok(axum::Json(AnalyzeResponse {
        success: true,
        data: AnalysisData::from(result),
    }))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "healthy" })
}
