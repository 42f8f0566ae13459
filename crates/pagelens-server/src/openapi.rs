use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PageLens API",
        version = "0.1.0",
        description = "Fetches a web page and returns an LLM-generated summary, keywords, SEO assessment and tabular data."
    ),
    paths(crate::routes::analyze, crate::routes::health),
    components(schemas(
        crate::dto::AnalyzeRequest,
        crate::dto::AnalyzeResponse,
        crate::dto::AnalysisData,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "analyze", description = "Web page analysis"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
