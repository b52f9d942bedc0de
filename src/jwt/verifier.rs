//! Token verification and introspection.
//!
//! Verification is pinned to RS256 and to the key manager's key id. The
//! token header is inspected only to reject it; it never selects the key or
//! the algorithm.

use crate::error::{Rejection, TokenError};
use crate::jwt::claims::Claims;
use crate::jwt::introspection::Introspection;
use crate::jwt::serializer::{CompactToken, SIGNING_ALGORITHM, SIGNING_ALGORITHM_NAME};
use crate::keys::thumbprint::key_ids_match;
use crate::keys::KeyManager;
use crate::metrics;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Whether verification rejects expired tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Report `exp` and leave staleness to the caller
    #[default]
    Report,
    /// Reject tokens whose `exp` has passed
    Enforce,
}

impl ExpiryPolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Enforce => "enforce",
        }
    }
}

impl FromStr for ExpiryPolicy {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "enforce" => Ok(Self::Enforce),
            _ => Err(TokenError::config(format!("Invalid expiry policy: {s}"))),
        }
    }
}

pub struct TokenVerifier {
    keys: Arc<KeyManager>,
    expiry_policy: ExpiryPolicy,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self {
            keys,
            expiry_policy: ExpiryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry_policy
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// The [`Rejection`] of the first check that failed.
    pub fn verify(&self, token: &str) -> Result<Claims, Rejection> {
        let compact = CompactToken::parse(token)?;

        if compact.header.alg != SIGNING_ALGORITHM_NAME {
            return Err(Rejection::UnsupportedAlgorithm);
        }
        match compact.header.kid.as_deref() {
            Some(kid) if key_ids_match(kid, self.keys.key_id()) => {}
            _ => return Err(Rejection::UnknownKey),
        }

        let verified = jsonwebtoken::crypto::verify(
            compact.signature(),
            compact.signing_input().as_bytes(),
            self.keys.decoding_key(),
            SIGNING_ALGORITHM,
        )
        .map_err(|_| Rejection::SignatureInvalid)?;
        if !verified {
            return Err(Rejection::SignatureInvalid);
        }

        let claims = compact.claims()?;

        if self.expiry_policy == ExpiryPolicy::Enforce && claims.is_expired() {
            return Err(Rejection::Expired);
        }

        Ok(claims)
    }

    /// Introspect `token`, folding every rejection into an inactive result.
    ///
    /// # Errors
    ///
    /// `TokenMissing` when the token is empty. That is a caller error, not
    /// an introspection outcome.
    pub fn introspect(&self, token: &str) -> Result<Introspection, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::TokenMissing);
        }

        match self.verify(token) {
            Ok(claims) => {
                metrics::record_introspection("active");
                Ok(Introspection::active(claims))
            }
            Err(rejection) => {
                debug!(reason = rejection.as_str(), "Token rejected during introspection");
                metrics::record_introspection(rejection.as_str());
                Ok(Introspection::inactive())
            }
        }
    }
}
