//! HTTP Basic client authentication.
//!
//! A single client identity is configured; its secret is compared in
//! constant time and zeroized on drop.

use crate::error::TokenError;
use crate::jwt::Role;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const BASIC_PREFIX: &str = "Basic ";

/// Credentials presented by a caller.
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
}

/// Parse an `Authorization: Basic ...` header value.
///
/// # Errors
///
/// `MalformedAuthorization` when the scheme is not Basic, the payload is
/// not base64 or UTF-8, or there is no `:` separator.
pub fn extract_basic_credentials(header: &str) -> Result<Credentials, TokenError> {
    let encoded = header
        .strip_prefix(BASIC_PREFIX)
        .ok_or_else(|| TokenError::malformed_authorization("expected Basic scheme"))?;

    let decoded = Zeroizing::new(
        STANDARD
            .decode(encoded.trim())
            .map_err(|_| TokenError::malformed_authorization("invalid base64"))?,
    );
    let decoded = std::str::from_utf8(&decoded)
        .map_err(|_| TokenError::malformed_authorization("credentials are not UTF-8"))?;

    let (client_id, client_secret) = decoded
        .split_once(':')
        .ok_or_else(|| TokenError::malformed_authorization("missing ':' separator"))?;

    Ok(Credentials {
        client_id: client_id.to_string(),
        client_secret: Zeroizing::new(client_secret.to_string()),
    })
}

/// A registered client.
pub struct Client {
    pub id: String,
    secret: Zeroizing<String>,
    pub role: Role,
}

impl Client {
    pub fn new(id: impl Into<String>, secret: impl Into<String>, role: Role) -> Self {
        Client {
            id: id.into(),
            secret: Zeroizing::new(secret.into()),
            role,
        }
    }

    fn secret_matches(&self, presented: &str) -> bool {
        let expected = self.secret.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected.ct_eq(presented).into()
    }
}

/// Lookup of client identities. Holds the one configured client.
pub struct ClientRegistry {
    client: Client,
}

impl ClientRegistry {
    pub fn new(client: Client) -> Self {
        ClientRegistry { client }
    }

    pub fn lookup(&self, client_id: &str) -> Option<&Client> {
        (self.client.id == client_id).then_some(&self.client)
    }

    /// Authenticate presented credentials.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown client or a wrong secret.
    pub fn validate(&self, credentials: &Credentials) -> Result<&Client, TokenError> {
        let client = self
            .lookup(&credentials.client_id)
            .ok_or(TokenError::InvalidCredentials)?;

        if !client.secret_matches(&credentials.client_secret) {
            return Err(TokenError::InvalidCredentials);
        }
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    fn registry() -> ClientRegistry {
        ClientRegistry::new(Client::new("testid", "testsecret", Role::User))
    }

    #[test]
    fn test_extract_valid() {
        let creds = extract_basic_credentials(&basic("testuser:testpassword")).unwrap();
        assert_eq!(creds.client_id, "testuser");
        assert_eq!(creds.client_secret.as_str(), "testpassword");
    }

    #[test]
    fn test_extract_secret_may_contain_colon() {
        let creds = extract_basic_credentials(&basic("id:se:cret")).unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret.as_str(), "se:cret");
    }

    #[test]
    fn test_extract_invalid_prefix() {
        assert!(matches!(
            extract_basic_credentials("Bearer sometoken"),
            Err(TokenError::MalformedAuthorization(_))
        ));
    }

    #[test]
    fn test_extract_invalid_base64() {
        assert!(extract_basic_credentials("Basic not-a-valid-base64").is_err());
    }

    #[test]
    fn test_extract_missing_colon() {
        assert!(extract_basic_credentials(&basic("invalidformat")).is_err());
    }

    #[test]
    fn test_validate_accepts_configured_client() {
        let creds = extract_basic_credentials(&basic("testid:testsecret")).unwrap();
        let registry = registry();
        let client = registry.validate(&creds).unwrap();
        assert_eq!(client.id, "testid");
        assert_eq!(client.role, Role::User);
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let creds = extract_basic_credentials(&basic("testid:wrongsecret")).unwrap();
        assert!(matches!(
            registry().validate(&creds),
            Err(TokenError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_client() {
        let creds = extract_basic_credentials(&basic("unknown:testsecret")).unwrap();
        assert!(registry().validate(&creds).is_err());
    }
}
