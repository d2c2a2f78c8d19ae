use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use waypoint_gateway::{App, AppState};
use waypoint_identity::testing::ScriptedFetch;
use waypoint_identity::{AgentManager, IdentitySettings};
use waypoint_links::{LinkService, LinkServiceSettings};

const DID: &str = "did:plc:gateway";
const MINI_DOC: &str = r#"{"did":"did:plc:gateway","pds":"https://pds.test"}"#;
const BOARD: &str = r#"{
    "uri": "at://did:plc:gateway/blue.linkat.board/self",
    "value": {
        "cards": [
            {"text": "GitHub", "url": "https://github.com/octocat", "emoji": "🐙"},
            {"text": "Blog", "url": "https://blog.example.com/"}
        ]
    }
}"#;

fn link_service(fetch: &ScriptedFetch) -> Arc<LinkService<ScriptedFetch>> {
    let manager = AgentManager::new(
        Arc::new(fetch.clone()),
        IdentitySettings::builder()
            .resolver_endpoint("https://resolver.test")
            .public_endpoint("https://public.test")
            .build(),
    );
    Arc::new(LinkService::new(
        Arc::new(manager),
        LinkServiceSettings::builder().did(DID).build(),
    ))
}

fn healthy_fetch() -> ScriptedFetch {
    ScriptedFetch::new()
        .json("resolver.test", 200, MINI_DOC)
        .json("pds.test", 200, BOARD)
}

fn broken_fetch() -> ScriptedFetch {
    ScriptedFetch::new()
        .json("resolver.test", 200, MINI_DOC)
        .json("pds.test", 500, "{}")
        .json("public.test", 500, "{}")
}

async fn get(state: AppState, uri: &str) -> Response {
    App::router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health() {
    let response = get(AppState::unconfigured(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn favicon_has_no_content() {
    let response = get(AppState::unconfigured(), "/favicon.ico").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn index_lists_links_without_targets() {
    let service = link_service(&healthy_fetch());
    let response = get(AppState::new(service), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["did"], DID);
    assert_eq!(body["link_count"], 2);
    assert_eq!(body["links"][0]["title"], "GitHub");
    assert_eq!(body["links"][0]["emoji"], "🐙");
    assert!(body["links"][0].get("url").is_none());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn index_reports_missing_configuration() {
    let response = get(AppState::unconfigured(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["did"], "NOT_CONFIGURED");
    assert_eq!(body["link_count"], 0);
    assert!(body["error"].as_str().unwrap().contains("ATPROTO_DID"));
}

#[tokio::test]
async fn index_reports_fetch_failure() {
    let service = link_service(&broken_fetch());
    let body = json_body(get(AppState::new(service), "/").await).await;
    assert_eq!(body["did"], DID);
    assert_eq!(body["link_count"], 0);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn api_links() {
    let service = link_service(&healthy_fetch());
    let response = get(AppState::new(service.clone()), "/api/links").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let code = service
        .encode_url("https://github.com/octocat", 6)
        .code
        .to_string();
    assert_eq!(body["links"][0]["shortcode"], code.as_str());
    assert_eq!(body["links"][0]["url"], "https://github.com/octocat");
    assert_eq!(body["links"][0]["short_url"], format!("/{}", code));
    assert!(body["links"][1].get("emoji").is_none());
}

#[tokio::test]
async fn api_links_failure_is_500() {
    let service = link_service(&broken_fetch());
    let response = get(AppState::new(service), "/api/links").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "failed to fetch links");
}

#[tokio::test]
async fn api_links_unconfigured_is_500() {
    let response = get(AppState::unconfigured(), "/api/links").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn known_shortcode_redirects_permanently() {
    let service = link_service(&healthy_fetch());
    let code = service.encode_url("https://blog.example.com/", 6).code;

    let response = get(AppState::new(service), &format!("/{}", code)).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://blog.example.com/"
    );
}

#[tokio::test]
async fn unknown_shortcode_is_404() {
    let service = link_service(&healthy_fetch());
    let response = get(AppState::new(service), "/nope42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["shortcode"], "nope42");
}

#[tokio::test]
async fn invalid_shortcode_skips_the_lookup() {
    let fetch = healthy_fetch();
    let service = link_service(&fetch);
    let response = get(AppState::new(service), "/not-a-code").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fetch.count("getRecord"), 0);
}

#[tokio::test]
async fn shortcode_without_configuration_is_404() {
    let response = get(AppState::unconfigured(), "/abc123").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
