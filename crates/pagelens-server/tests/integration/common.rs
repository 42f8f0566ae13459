use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::MockServer;

use pagelens_server::config::ServerConfig;
use pagelens_server::routes;
use pagelens_server::state::AppState;

pub const TEST_API_KEY: &str = "sk-test";

pub const EXAMPLE_HTML: &str = r#"<!doctype html>
<html>
<head><title>Example Domain</title><script>var tracker = "do-not-leak";</script></head>
<body>
  <nav><a href="/">Home</a></nav>
  <h1>Example Domain</h1>
  <p>This domain is for use in illustrative examples in documents.</p>
  <footer>Footer links</footer>
</body>
</html>"#;

/// The router plus stand-ins for the target site and the model endpoint.
pub struct TestApp {
    pub router: Router,
    pub site: MockServer,
    pub llm: MockServer,
}

impl TestApp {
    /// Base URL the app should use for chat completions.
    pub fn llm_base_url(&self) -> String {
        format!("{}/v1", self.llm.uri())
    }
}

/// Build the real router against two local mock servers.
///
/// Private URLs are allowed (the mocks listen on 127.0.0.1) and retries are
/// off so failure tests see exactly one upstream call.
pub async fn setup_test_app() -> TestApp {
    let config = ServerConfig {
        fetch_timeout: Duration::from_secs(5),
        model_timeout: Duration::from_secs(5),
        max_retries: 0,
        allow_private_urls: true,
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::from_config(&config).expect("Failed to build app state"));

    TestApp {
        router: routes::router(state),
        site: MockServer::start().await,
        llm: MockServer::start().await,
    }
}

/// Chat-completion response body whose first choice carries `content`.
pub fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// POST a JSON body to `/api/analyze` and return status + decoded body.
pub async fn post_analyze(router: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::post("/api/analyze")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
