//! Request handlers.

use crate::auth::extract_basic_credentials;
use crate::error::TokenError;
use crate::http::AppState;
use crate::jwks::Jwks;
use crate::jwt::{Introspection, IssuedToken};
use crate::metrics;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const BEARER_PREFIX: &str = "Bearer ";

/// Issue an access token to a client authenticated with HTTP Basic.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<IssuedToken>, TokenError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        metrics::record_auth_failure("missing_header");
        return Err(TokenError::InvalidCredentials);
    };

    let credentials = header
        .to_str()
        .map_err(|_| TokenError::malformed_authorization("header is not visible ASCII"))
        .and_then(extract_basic_credentials)
        .map_err(|e| {
            metrics::record_auth_failure("malformed_header");
            warn!(error = %e, "Malformed Basic authorization");
            TokenError::InvalidCredentials
        })?;

    let client = state.clients.validate(&credentials).map_err(|e| {
        metrics::record_auth_failure("invalid_credentials");
        warn!(client_id = %credentials.client_id, "Client authentication failed");
        e
    })?;

    let issued = state.issuer.issue(&client.id, client.role)?;
    info!(client_id = %client.id, role = %client.role, "Issued access token");

    Ok(Json(issued))
}

/// Query parameters accepted by `/introspect`.
#[derive(Debug, Deserialize)]
pub struct IntrospectParams {
    /// Token to introspect when no Bearer header is sent
    pub token: Option<String>,
}

/// Report whether a token is active and, if so, its claims.
pub async fn introspect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<IntrospectParams>,
) -> Result<Json<Introspection>, TokenError> {
    let token = presented_token(&headers, params.token)?;
    Ok(Json(state.verifier.introspect(&token)?))
}

/// Token from `Authorization: Bearer`, falling back to the `token` query
/// parameter.
fn presented_token(headers: &HeaderMap, query: Option<String>) -> Result<String, TokenError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| TokenError::malformed_authorization("header is not visible ASCII"))?;
        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| TokenError::malformed_authorization("expected Bearer scheme"))?;
        return Ok(token.to_string());
    }

    query.ok_or(TokenError::TokenMissing)
}

/// Publish the verification key set.
pub async fn keys(State(state): State<Arc<AppState>>) -> Result<Json<Jwks>, TokenError> {
    match state.publisher.get_verification_keys() {
        Ok(jwks) => {
            metrics::record_jwks_request("ok");
            Ok(Json(jwks))
        }
        Err(e) => {
            metrics::record_jwks_request("error");
            Err(e)
        }
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "Server is up"
}

/// Prometheus text exposition.
pub async fn render_metrics() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
