use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::integration::common::{
    EXAMPLE_HTML, TEST_API_KEY, TestApp, completion, post_analyze, setup_test_app,
};

const VALID_REPLY: &str = r#"{"summary":"s","keywords":["a"],"seo_analysis":"ok","structured_data":"none","page_title":"Example"}"#;

async fn mount_site(app: &TestApp) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(EXAMPLE_HTML)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&app.site)
        .await;
}

async fn mount_llm(app: &TestApp, template: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(template)
        .expect(expected_calls)
        .mount(&app.llm)
        .await;
}

fn analyze_body(app: &TestApp) -> serde_json::Value {
    json!({
        "url": app.site.uri(),
        "apiKey": TEST_API_KEY,
        "baseUrl": app.llm_base_url(),
        "model": "test-model",
    })
}

#[tokio::test]
async fn analyze_returns_model_result() {
    let app = setup_test_app().await;
    mount_site(&app).await;
    mount_llm(
        &app,
        ResponseTemplate::new(200).set_body_json(completion(VALID_REPLY)),
        1,
    )
    .await;

    let (status, body) = post_analyze(app.router.clone(), analyze_body(&app)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"],
        serde_json::from_str::<serde_json::Value>(VALID_REPLY).unwrap()
    );
}

#[tokio::test]
async fn model_receives_sanitized_page() {
    let app = setup_test_app().await;
    mount_site(&app).await;
    mount_llm(
        &app,
        ResponseTemplate::new(200).set_body_json(completion(VALID_REPLY)),
        1,
    )
    .await;

    let (status, _) = post_analyze(app.router.clone(), analyze_body(&app)).await;
    assert_eq!(status, StatusCode::OK);

    let requests = app.llm.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "test-model");
    assert_eq!(sent["messages"].as_array().unwrap().len(), 1);
    assert_eq!(sent["messages"][0]["role"], "user");

    let prompt = sent["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Page title: Example Domain"));
    assert!(prompt.contains("This domain is for use in illustrative examples"));
    assert!(!prompt.contains("do-not-leak"));
    assert!(!prompt.contains("Footer links"));

    let auth = requests[0].headers.get("authorization").unwrap();
    assert_eq!(auth.to_str().unwrap(), format!("Bearer {TEST_API_KEY}"));
}

#[tokio::test]
async fn missing_url_returns_400() {
    let app = setup_test_app().await;
    mount_llm(&app, ResponseTemplate::new(200), 0).await;

    let (status, body) = post_analyze(
        app.router.clone(),
        json!({"url": "", "apiKey": TEST_API_KEY}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide a valid URL");

    let (status, _) = post_analyze(app.router.clone(), json!({"apiKey": TEST_API_KEY})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_api_key_returns_401() {
    let app = setup_test_app().await;
    mount_llm(&app, ResponseTemplate::new(200), 0).await;

    let (status, body) =
        post_analyze(app.router.clone(), json!({"url": "https://example.com"})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Please provide an API key");
}

#[tokio::test]
async fn malformed_url_returns_400() {
    let app = setup_test_app().await;

    let (status, body) = post_analyze(
        app.router.clone(),
        json!({"url": "example dot com", "apiKey": TEST_API_KEY}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid URL"));
}

#[tokio::test]
async fn site_404_returns_500_without_model_call() {
    let app = setup_test_app().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.site)
        .await;
    mount_llm(&app, ResponseTemplate::new(200), 0).await;

    let (status, body) = post_analyze(app.router.clone(), analyze_body(&app)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("404"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn non_json_model_output_returns_500() {
    let app = setup_test_app().await;
    mount_site(&app).await;
    mount_llm(
        &app,
        ResponseTemplate::new(200).set_body_json(completion("not json")),
        1,
    )
    .await;

    let (status, body) = post_analyze(app.router.clone(), analyze_body(&app)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Model returned a response that is not valid JSON"})
    );
}

#[tokio::test]
async fn incomplete_model_output_returns_500() {
    let app = setup_test_app().await;
    mount_site(&app).await;
    mount_llm(
        &app,
        ResponseTemplate::new(200).set_body_json(completion(
            r#"{"summary":"s","keywords":[],"seo_analysis":"ok","structured_data":"none"}"#,
        )),
        1,
    )
    .await;

    let (status, body) = post_analyze(app.router.clone(), analyze_body(&app)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("page_title"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn rejected_api_key_returns_500_with_cause() {
    let app = setup_test_app().await;
    mount_site(&app).await;
    mount_llm(
        &app,
        ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })),
        1,
    )
    .await;

    let (status, body) = post_analyze(app.router.clone(), analyze_body(&app)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Incorrect API key provided"));
    assert!(!error.contains(TEST_API_KEY));
}

#[tokio::test]
async fn invalid_json_body_returns_400() {
    let app = setup_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/api/analyze")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let app = setup_test_app().await;
    mount_llm(&app, ResponseTemplate::new(200), 0).await;

    let padding = "a".repeat(128 * 1024);
    let (status, body) = post_analyze(
        app.router.clone(),
        json!({"url": format!("https://example.com/?q={padding}"), "apiKey": TEST_API_KEY}),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["paths"]["/api/analyze"].is_object());
}
