//! Error types for the token service.
//!
//! `TokenError` covers startup, caller and internal failures and propagates
//! to the HTTP boundary. `Rejection` classifies untrusted tokens that fail
//! verification; rejections are recovered into an inactive introspection
//! result and only surface in logs and metrics.

use thiserror::Error;

/// Service error.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TokenError {
    /// RSA key pair could not be generated or encoded
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// No token was presented for introspection
    #[error("Token missing from request")]
    TokenMissing,

    /// Authorization header present but not in the expected scheme/format
    #[error("Authorization header malformed: {0}")]
    MalformedAuthorization(String),

    /// Client identity unknown or secret mismatch
    #[error("Invalid client credentials")]
    InvalidCredentials,

    /// Claims violate their invariants and must not be signed
    #[error("Claims invalid: {0}")]
    ClaimsInvalid(String),

    /// Cryptographic signing failure
    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    /// No public key is available for publication
    #[error("Verification key unavailable")]
    KeyUnavailable,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (details sanitized in responses)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TokenError {
    /// Create a key generation error.
    #[must_use]
    pub fn key_generation(msg: impl Into<String>) -> Self {
        Self::KeyGeneration(msg.into())
    }

    /// Create a malformed authorization error.
    #[must_use]
    pub fn malformed_authorization(msg: impl Into<String>) -> Self {
        Self::MalformedAuthorization(msg.into())
    }

    /// Create a claims invalid error.
    #[must_use]
    pub fn claims_invalid(msg: impl Into<String>) -> Self {
        Self::ClaimsInvalid(msg.into())
    }

    /// Create a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::SigningFailed(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TokenMissing => ErrorCode::TokenMissing,
            Self::MalformedAuthorization(_) => ErrorCode::MalformedAuthorization,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::ClaimsInvalid(_) => ErrorCode::ClaimsInvalid,
            Self::SigningFailed(_) => ErrorCode::SigningFailed,
            Self::KeyUnavailable => ErrorCode::KeyUnavailable,
            Self::KeyGeneration(_) | Self::Config(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the caller caused this error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TokenMissing | Self::MalformedAuthorization(_) | Self::InvalidCredentials
        )
    }

    /// Cryptographic operations are deterministic, so nothing is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::SigningFailed(err.to_string())
    }
}

/// Stable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    TokenMissing,
    MalformedAuthorization,
    InvalidCredentials,
    ClaimsInvalid,
    SigningFailed,
    KeyUnavailable,
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenMissing => "TOKEN_MISSING",
            Self::MalformedAuthorization => "AUTHORIZATION_MALFORMED",
            Self::InvalidCredentials => "INVALID_CLIENT",
            Self::ClaimsInvalid => "TOKEN_CLAIMS_INVALID",
            Self::SigningFailed => "TOKEN_SIGNING_FAILED",
            Self::KeyUnavailable => "KEYS_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::TokenMissing | Self::MalformedAuthorization => 400,
            Self::InvalidCredentials => 401,
            Self::ClaimsInvalid | Self::SigningFailed | Self::KeyUnavailable | Self::Internal => {
                500
            }
        }
    }

    /// Message safe to return to callers.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::TokenMissing => "Missing token",
            Self::MalformedAuthorization => "Invalid Authorization header format",
            Self::InvalidCredentials => "Unauthorized",
            Self::ClaimsInvalid => "Invalid token claims",
            Self::SigningFailed => "Error generating token",
            Self::KeyUnavailable => "Error getting keys",
            Self::Internal => "Internal error",
        }
    }
}

/// Reason an untrusted token was not accepted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Not three well-formed base64url parts, or the header is not JSON
    #[error("token structure malformed")]
    Malformed,

    /// Header declares anything other than the pinned algorithm
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,

    /// Header key id absent or not ours
    #[error("unknown signing key")]
    UnknownKey,

    /// Signature does not verify against the public key
    #[error("signature invalid")]
    SignatureInvalid,

    /// Payload does not decode into valid claims
    #[error("claims unparseable")]
    ClaimsUnparseable,

    /// Token is past its expiry and expiry is enforced
    #[error("token expired")]
    Expired,
}

impl Rejection {
    /// Label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::UnknownKey => "unknown_key",
            Self::SignatureInvalid => "signature_invalid",
            Self::ClaimsUnparseable => "claims_unparseable",
            Self::Expired => "expired",
        }
    }
}
