//! Access token issuance.

use crate::error::TokenError;
use crate::jwt::builder::{ClaimsBuilder, DEFAULT_TTL_SECONDS};
use crate::jwt::claims::{Claims, Role};
use crate::jwt::serializer::{JwtSerializer, SIGNING_ALGORITHM_NAME};
use crate::keys::KeyManager;
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Default `iss` claim.
pub const DEFAULT_ISSUER: &str = "oauth2-server";

/// Token response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Signs access tokens with the key manager's private key.
pub struct TokenIssuer {
    keys: Arc<KeyManager>,
    serializer: JwtSerializer,
    issuer: String,
    ttl_seconds: i64,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyManager>, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            serializer: JwtSerializer::new(),
            issuer: issuer.into(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for an already authenticated `subject`.
    ///
    /// # Errors
    ///
    /// `ClaimsInvalid` if the claims cannot be built (nothing is signed),
    /// `SigningFailed` if RSA signing fails.
    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, TokenError> {
        let claims = ClaimsBuilder::new(self.issuer.as_str())
            .subject(subject)
            .role(role)
            .ttl_seconds(self.ttl_seconds)
            .build()?;

        let access_token = self.sign(&claims)?;
        metrics::record_token_issued(role.as_str());
        debug!(subject, %role, exp = claims.exp, "Issued access token");

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: claims.lifetime(),
        })
    }

    /// Issue a token for a role given by name.
    ///
    /// # Errors
    ///
    /// `ClaimsInvalid` for a role outside the closed set, otherwise as
    /// [`TokenIssuer::issue`].
    pub fn issue_named(&self, subject: &str, role_name: &str) -> Result<IssuedToken, TokenError> {
        let role: Role = role_name.parse()?;
        self.issue(subject, role)
    }

    /// Validate and sign prepared claims.
    ///
    /// # Errors
    ///
    /// `ClaimsInvalid` or `SigningFailed`.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        claims.validate()?;

        self.serializer
            .serialize(claims, self.keys.encoding_key(), self.keys.key_id())
            .map_err(|e| {
                error!(error = %e, algorithm = SIGNING_ALGORITHM_NAME, "Token signing failed");
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use once_cell::sync::Lazy;

    static KEYS: Lazy<Arc<KeyManager>> =
        Lazy::new(|| Arc::new(KeyManager::initialize().unwrap()));

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(Arc::clone(&KEYS), DEFAULT_ISSUER)
    }

    #[test]
    fn test_issue_returns_bearer_token() {
        let issued = issuer().issue("alice", Role::User).unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 3600);
        assert_eq!(issued.access_token.split('.').count(), 3);
    }

    #[test]
    fn test_header_pins_algorithm_and_kid() {
        let issued = issuer().issue("alice", Role::Admin).unwrap();
        let header = issued.access_token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();

        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["kid"], KEYS.key_id());
    }

    #[test]
    fn test_issue_named_rejects_unknown_role() {
        let result = issuer().issue_named("alice", "superuser");
        assert!(matches!(result, Err(TokenError::ClaimsInvalid(_))));
    }

    #[test]
    fn test_issue_rejects_empty_subject() {
        let result = issuer().issue("", Role::User);
        assert!(matches!(result, Err(TokenError::ClaimsInvalid(_))));
    }

    #[test]
    fn test_custom_ttl() {
        let issuer = issuer().with_ttl_seconds(60);
        assert_eq!(issuer.issuer(), DEFAULT_ISSUER);
        assert_eq!(issuer.ttl_seconds(), 60);

        let issued = issuer.issue("bob", Role::User).unwrap();
        assert_eq!(issued.expires_in, 60);
    }

    #[test]
    fn test_overflowing_ttl_is_refused() {
        let result = issuer().with_ttl_seconds(i64::MAX).issue("alice", Role::User);
        assert!(matches!(result, Err(TokenError::ClaimsInvalid(_))));
    }

    #[test]
    fn test_sign_refuses_invalid_claims() {
        let claims = Claims {
            iss: DEFAULT_ISSUER.to_string(),
            sub: "alice".to_string(),
            iat: 100,
            exp: 100,
            role: Role::User,
        };
        assert!(matches!(
            issuer().sign(&claims),
            Err(TokenError::ClaimsInvalid(_))
        ));
    }
}
