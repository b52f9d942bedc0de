//! Centralized configuration for the token service.
//!
//! All configuration is loaded from environment variables (optionally via a
//! `.env` file) and validated at startup.

use crate::error::TokenError;
use crate::jwt::{ExpiryPolicy, Role, DEFAULT_ISSUER, DEFAULT_TTL_SECONDS, MAX_TTL_SECONDS};
use crate::keys::{DEFAULT_KEY_BITS, MIN_KEY_BITS};
use std::env;
use std::fmt;
use zeroize::Zeroizing;

/// Token service configuration.
#[derive(Clone)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    // JWT settings
    /// JWT issuer claim
    pub jwt_issuer: String,
    /// Access token TTL in seconds
    pub access_token_ttl: i64,
    /// Expiry handling during introspection
    pub expiry_policy: ExpiryPolicy,

    // Key settings
    /// RSA modulus size
    pub rsa_key_bits: usize,

    // Client credentials
    /// The configured client identity
    pub client_id: String,
    /// Its shared secret
    pub client_secret: Zeroizing<String>,
    /// Role granted to tokens issued for the client
    pub client_role: Role,

    // Logging
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_issuer: DEFAULT_ISSUER.to_string(),
            access_token_ttl: DEFAULT_TTL_SECONDS,
            expiry_policy: ExpiryPolicy::Report,
            rsa_key_bits: DEFAULT_KEY_BITS,
            client_id: "testid".to_string(),
            client_secret: Zeroizing::new("testsecret".to_string()),
            client_role: Role::User,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the result fails
    /// validation.
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT", defaults.port)?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            access_token_ttl: parse_env("ACCESS_TOKEN_TTL", defaults.access_token_ttl)?,
            expiry_policy: parse_env("EXPIRY_POLICY", defaults.expiry_policy)?,
            rsa_key_bits: parse_env("RSA_KEY_BITS", defaults.rsa_key_bits)?,
            client_id: env::var("CLIENT_ID").unwrap_or(defaults.client_id),
            client_secret: env::var("CLIENT_SECRET")
                .map(Zeroizing::new)
                .unwrap_or(defaults.client_secret),
            client_role: parse_env("CLIENT_ROLE", defaults.client_role)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_env("LOG_JSON", defaults.log_json)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first invalid value.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.port == 0 {
            return Err(TokenError::config("PORT must be between 1 and 65535"));
        }
        if self.jwt_issuer.is_empty() {
            return Err(TokenError::config("JWT_ISSUER must not be empty"));
        }
        if self.access_token_ttl <= 0 || self.access_token_ttl > MAX_TTL_SECONDS {
            return Err(TokenError::config(format!(
                "ACCESS_TOKEN_TTL must be between 1 and {MAX_TTL_SECONDS} seconds"
            )));
        }
        if self.rsa_key_bits < MIN_KEY_BITS {
            return Err(TokenError::config(format!(
                "RSA_KEY_BITS must be at least {MIN_KEY_BITS}"
            )));
        }
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(TokenError::config(
                "CLIENT_ID and CLIENT_SECRET must not be empty",
            ));
        }
        Ok(())
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("expiry_policy", &self.expiry_policy)
            .field("rsa_key_bits", &self.rsa_key_bits)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("client_role", &self.client_role)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

/// Parse environment variable with default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, TokenError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| TokenError::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
