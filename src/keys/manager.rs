//! RSA signing key pair owned for the lifetime of the process.
//!
//! The manager is constructed once at startup and shared behind an `Arc`;
//! nothing mutates it afterwards, so concurrent readers need no locking.

use crate::error::TokenError;
use crate::keys::thumbprint;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use tracing::info;

/// Default RSA modulus size.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus accepted for signing keys.
pub const MIN_KEY_BITS: usize = 2048;

/// Owner of the service's single RSA key pair.
pub struct KeyManager {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: String,
}

impl KeyManager {
    /// Generate a fresh 2048-bit key pair.
    ///
    /// # Errors
    ///
    /// Returns `KeyGeneration` if the key pair cannot be produced. Callers
    /// treat this as fatal.
    pub fn initialize() -> Result<Self, TokenError> {
        Self::generate(DEFAULT_KEY_BITS)
    }

    /// Generate a fresh key pair of the given size.
    ///
    /// # Errors
    ///
    /// Returns `KeyGeneration` if `bits` is below [`MIN_KEY_BITS`] or
    /// generation fails.
    pub fn generate(bits: usize) -> Result<Self, TokenError> {
        if bits < MIN_KEY_BITS {
            return Err(TokenError::key_generation(format!(
                "RSA key size {bits} is below the minimum of {MIN_KEY_BITS} bits"
            )));
        }

        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| TokenError::key_generation(e.to_string()))?;

        let manager = Self::from_private_key(private_key)?;
        info!(kid = %manager.key_id, bits, "Generated RSA signing key");
        Ok(manager)
    }

    /// Build a manager around an existing private key.
    ///
    /// # Errors
    ///
    /// Returns `KeyGeneration` if the key cannot be encoded for signing or
    /// verification.
    pub fn from_private_key(private_key: RsaPrivateKey) -> Result<Self, TokenError> {
        let public_key = private_key.to_public_key();

        let der = private_key
            .to_pkcs1_der()
            .map_err(|e| TokenError::key_generation(format!("PKCS#1 encoding: {e}")))?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

        let n = encode_unsigned(&public_key.n().to_bytes_be());
        let e = encode_unsigned(&public_key.e().to_bytes_be());
        let decoding_key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| TokenError::key_generation(format!("public key components: {e}")))?;
        let key_id = thumbprint::rsa_thumbprint(&n, &e);

        Ok(Self {
            private_key,
            public_key,
            encoding_key,
            decoding_key,
            key_id,
        })
    }

    /// Public half of the key pair.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Private half of the key pair. Never leaves the process.
    #[must_use]
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// RFC 7638 thumbprint used as `kid`.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// Signing key handle for `jsonwebtoken`.
    #[must_use]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Verification key handle for `jsonwebtoken`.
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Serialize the public key as a PEM SubjectPublicKeyInfo block.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if DER encoding fails.
    pub fn export_public_key_pem(&self) -> Result<String, TokenError> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenError::Internal(anyhow::anyhow!("public key PEM encoding: {e}")))
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("key_id", &self.key_id)
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Base64url (no padding) of a big-endian unsigned integer.
pub(crate) fn encode_unsigned(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
