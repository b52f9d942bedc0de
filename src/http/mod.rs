//! HTTP surface: token issuance, introspection, key publication.

pub mod error;
pub mod handlers;

use crate::auth::{Client, ClientRegistry};
use crate::config::Config;
use crate::jwks::JwksPublisher;
use crate::jwt::{TokenIssuer, TokenVerifier};
use crate::keys::KeyManager;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ErrorResponse;

/// Shared request state.
pub struct AppState {
    /// Signs access tokens
    pub issuer: TokenIssuer,
    /// Checks presented tokens
    pub verifier: TokenVerifier,
    /// Serves the JWK set
    pub publisher: JwksPublisher,
    /// Registered clients
    pub clients: ClientRegistry,
}

impl AppState {
    /// Wire every component to the same key manager.
    pub fn new(keys: Arc<KeyManager>, config: &Config) -> Self {
        Self {
            issuer: TokenIssuer::new(Arc::clone(&keys), config.jwt_issuer.clone())
                .with_ttl_seconds(config.access_token_ttl),
            verifier: TokenVerifier::new(Arc::clone(&keys))
                .with_expiry_policy(config.expiry_policy),
            publisher: JwksPublisher::new(keys),
            clients: ClientRegistry::new(Client::new(
                config.client_id.clone(),
                config.client_secret.as_str(),
                config.client_role,
            )),
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/token",
            get(handlers::issue_token).post(handlers::issue_token),
        )
        .route("/introspect", get(handlers::introspect))
        .route("/keys", get(handlers::keys))
        .route("/.well-known/jwks.json", get(handlers::keys))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
