use crate::error::TokenError;
use crate::jwt::serializer::SIGNING_ALGORITHM_NAME;
use crate::keys::manager::encode_unsigned;
use crate::keys::KeyManager;
use jsonwebtoken::DecodingKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// RSA verification key descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub kid: String,
    pub alg: String,
    pub n: String,
    pub e: String,
}

impl Jwk {
    /// Describe an RSA public key.
    pub fn from_rsa_public_key(key: &RsaPublicKey, kid: impl Into<String>) -> Self {
        Jwk {
            kty: "RSA".to_string(),
            key_use: "sig".to_string(),
            kid: kid.into(),
            alg: SIGNING_ALGORITHM_NAME.to_string(),
            n: encode_unsigned(&key.n().to_bytes_be()),
            e: encode_unsigned(&key.e().to_bytes_be()),
        }
    }

    /// Verification key built from the published components only, as a
    /// third party would.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if `n` or `e` is not valid base64url.
    pub fn decoding_key(&self) -> Result<DecodingKey, TokenError> {
        DecodingKey::from_rsa_components(&self.n, &self.e)
            .map_err(|e| TokenError::Internal(anyhow::anyhow!("invalid JWK components: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl Jwks {
    pub fn new() -> Self {
        Jwks { keys: Vec::new() }
    }

    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    pub fn find_key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    /// # Errors
    ///
    /// Returns `Internal` if serialization fails.
    pub fn to_json(&self) -> Result<String, TokenError> {
        serde_json::to_string(self).map_err(|e| TokenError::Internal(e.into()))
    }
}

/// Publishes the verification key set.
///
/// Holds no copy of the key material: every call derives the set from the
/// key manager's current public key.
pub struct JwksPublisher {
    keys: Option<Arc<KeyManager>>,
}

impl JwksPublisher {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        JwksPublisher { keys: Some(keys) }
    }

    /// Publisher with no key behind it.
    pub fn unavailable() -> Self {
        JwksPublisher { keys: None }
    }

    /// # Errors
    ///
    /// Returns `KeyUnavailable` when no key manager is attached.
    pub fn get_verification_keys(&self) -> Result<Jwks, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::KeyUnavailable)?;

        let mut jwks = Jwks::new();
        jwks.add_key(Jwk::from_rsa_public_key(keys.public_key(), keys.key_id()));
        Ok(jwks)
    }

    pub fn current_key_id(&self) -> Option<&str> {
        self.keys.as_deref().map(KeyManager::key_id)
    }
}
