//! Compact JWS encoding and structural parsing.

use crate::error::{Rejection, TokenError};
use crate::jwt::claims::Claims;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Deserialize;

/// The only algorithm this service signs with or accepts.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Header name of [`SIGNING_ALGORITHM`].
pub const SIGNING_ALGORITHM_NAME: &str = "RS256";

pub struct JwtSerializer {
    algorithm: Algorithm,
}

impl JwtSerializer {
    #[must_use]
    pub const fn new() -> Self {
        JwtSerializer {
            algorithm: SIGNING_ALGORITHM,
        }
    }

    /// Sign `claims` into a compact token whose header carries `key_id`.
    ///
    /// # Errors
    ///
    /// Returns `SigningFailed` if the signature cannot be produced.
    pub fn serialize(
        &self,
        claims: &Claims,
        key: &EncodingKey,
        key_id: &str,
    ) -> Result<String, TokenError> {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(key_id.to_string());

        Ok(encode(&header, claims, key)?)
    }
}

impl Default for JwtSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Header fields as declared by the token, before any trust decision.
///
/// `alg` stays a string so that `none` and unknown names are classified as
/// unsupported rather than malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclaredHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// A token split into its three parts with the header decoded.
#[derive(Debug)]
pub struct CompactToken<'a> {
    pub header: DeclaredHeader,
    signing_input: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> CompactToken<'a> {
    /// Split `raw` into header, payload and signature.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` unless there are exactly three non-empty
    /// base64url parts and the header is a JSON object with an `alg`.
    pub fn parse(raw: &'a str) -> Result<Self, Rejection> {
        let mut parts = raw.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Rejection::Malformed);
        };

        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(Rejection::Malformed);
        }

        let header_json = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| Rejection::Malformed)?;
        URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Rejection::Malformed)?;
        let declared: DeclaredHeader =
            serde_json::from_slice(&header_json).map_err(|_| Rejection::Malformed)?;

        Ok(CompactToken {
            header: declared,
            signing_input: &raw[..header.len() + 1 + payload.len()],
            payload,
            signature,
        })
    }

    /// `header.payload`, the bytes covered by the signature.
    pub fn signing_input(&self) -> &'a str {
        self.signing_input
    }

    /// Base64url signature part.
    pub fn signature(&self) -> &'a str {
        self.signature
    }

    /// Decode the payload into claims. Only meaningful after the signature
    /// has been verified.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsUnparseable` if the payload is not valid claims.
    pub fn claims(&self) -> Result<Claims, Rejection> {
        let payload = URL_SAFE_NO_PAD
            .decode(self.payload)
            .map_err(|_| Rejection::ClaimsUnparseable)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| Rejection::ClaimsUnparseable)?;
        claims.validate().map_err(|_| Rejection::ClaimsUnparseable)?;
        Ok(claims)
    }
}
