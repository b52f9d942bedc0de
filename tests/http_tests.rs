//! Router-level tests for the HTTP surface.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use oauth2_server::http::{router, AppState, ErrorResponse};
use oauth2_server::jwks::{Jwks, JwksPublisher};
use oauth2_server::jwt::{Introspection, IssuedToken, Role};
use oauth2_server::{Config, KeyManager};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

static KEYS: Lazy<Arc<KeyManager>> = Lazy::new(|| Arc::new(KeyManager::initialize().unwrap()));

fn state() -> AppState {
    AppState::new(Arc::clone(&KEYS), &Config::default())
}

fn app() -> Router {
    router(Arc::new(state()))
}

fn basic(id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

async fn obtain_token() -> String {
    let request = Request::get("/token")
        .header(header::AUTHORIZATION, basic("testid", "testsecret"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    json::<IssuedToken>(&body).access_token
}

#[tokio::test]
async fn test_token_with_valid_credentials() {
    let request = Request::post("/token")
        .header(header::AUTHORIZATION, basic("testid", "testsecret"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let issued: IssuedToken = json(&body);
    assert_eq!(issued.token_type, "Bearer");
    assert_eq!(issued.expires_in, 3600);
    assert_eq!(issued.access_token.split('.').count(), 3);
}

#[tokio::test]
async fn test_token_with_wrong_secret() {
    let request = Request::get("/token")
        .header(header::AUTHORIZATION, basic("testid", "wrong"))
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));
    let error: ErrorResponse = json(&body);
    assert_eq!(error.error, "INVALID_CLIENT");
}

#[tokio::test]
async fn test_token_with_unknown_client() {
    let request = Request::get("/token")
        .header(header::AUTHORIZATION, basic("someone", "testsecret"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_without_credentials() {
    let request = Request::get("/token").body(Body::empty()).unwrap();
    let (status, headers, _) = send(app(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_token_with_malformed_basic() {
    let request = Request::get("/token")
        .header(header::AUTHORIZATION, "Basic !!!not-base64")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_introspect_valid_token_via_bearer() {
    let token = obtain_token().await;
    let request = Request::get("/introspect")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let result: Introspection = json(&body);
    assert!(result.active);
    assert_eq!(result.sub.as_deref(), Some("testid"));
    assert_eq!(result.role, Some(Role::User));
    assert_eq!(result.iss.as_deref(), Some("oauth2-server"));
}

#[tokio::test]
async fn test_introspect_valid_token_via_query() {
    let token = obtain_token().await;
    let request = Request::get(format!("/introspect?token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json::<Introspection>(&body).active);
}

#[tokio::test]
async fn test_introspect_invalid_token_is_inactive() {
    let request = Request::get("/introspect?token=not.a.token")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = json(&body);
    assert_eq!(value, serde_json::json!({"active": false}));
}

#[tokio::test]
async fn test_introspect_without_token() {
    let request = Request::get("/introspect").body(Body::empty()).unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json::<ErrorResponse>(&body).error, "TOKEN_MISSING");
}

#[tokio::test]
async fn test_introspect_empty_query_token() {
    let request = Request::get("/introspect?token=")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json::<ErrorResponse>(&body).error, "TOKEN_MISSING");
}

#[tokio::test]
async fn test_introspect_empty_bearer_token() {
    let request = Request::get("/introspect")
        .header(header::AUTHORIZATION, "Bearer ")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json::<ErrorResponse>(&body).error, "TOKEN_MISSING");
}

#[tokio::test]
async fn test_introspect_non_bearer_scheme() {
    let request = Request::get("/introspect")
        .header(header::AUTHORIZATION, basic("testid", "testsecret"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: serde_json::Value = json(&body);
    assert!(value.get("active").is_none());
}

#[tokio::test]
async fn test_keys_endpoints() {
    for path in ["/keys", "/.well-known/jwks.json"] {
        let request = Request::get(path).body(Body::empty()).unwrap();
        let (status, _, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        let jwks: Jwks = json(&body);
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid, KEYS.key_id());
    }
}

#[tokio::test]
async fn test_keys_unavailable() {
    let mut state = state();
    state.publisher = JwksPublisher::unavailable();
    let request = Request::get("/keys").body(Body::empty()).unwrap();
    let (status, _, body) = send(router(Arc::new(state)), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json::<ErrorResponse>(&body).error, "KEYS_UNAVAILABLE");
}

#[tokio::test]
async fn test_health() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Server is up");
}

#[tokio::test]
async fn test_metrics_exposition() {
    obtain_token().await;
    let request = Request::get("/metrics").body(Body::empty()).unwrap();
    let (status, _, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("tokens_issued_total"));
}
