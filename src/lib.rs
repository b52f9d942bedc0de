//! OAuth2 token service library.
//!
//! Issues RS256 access tokens for an authenticated client, introspects
//! presented tokens, and publishes the verification key as a JWK set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod jwks;
pub mod jwt;
pub mod keys;
pub mod metrics;
pub mod telemetry;

// Re-exports for convenience
pub use config::Config;
pub use error::{Rejection, TokenError};
pub use keys::KeyManager;
