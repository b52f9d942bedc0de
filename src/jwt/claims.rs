use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role granted to the token subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrative access
    Admin,
    /// Regular access
    User,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::User];

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(TokenError::claims_invalid(format!(
                "invalid role {other:?}: must be 'admin' or 'user'"
            ))),
        }
    }
}

/// Assertions carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub role: Role,
}

impl Claims {
    /// Claims issued now and valid for `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsInvalid` if the expiry does not fit in an `i64`.
    pub fn new(
        issuer: String,
        subject: String,
        role: Role,
        ttl_seconds: i64,
    ) -> Result<Self, TokenError> {
        let now = chrono::Utc::now().timestamp();
        Self::issued_at(issuer, subject, role, now, ttl_seconds)
    }

    /// Claims issued at `iat` and valid for `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsInvalid` if `iat + ttl_seconds` overflows.
    pub fn issued_at(
        issuer: String,
        subject: String,
        role: Role,
        iat: i64,
        ttl_seconds: i64,
    ) -> Result<Self, TokenError> {
        let exp = iat.checked_add(ttl_seconds).ok_or_else(|| {
            TokenError::claims_invalid(format!("lifetime of {ttl_seconds}s overflows exp"))
        })?;
        Ok(Claims {
            iss: issuer,
            sub: subject,
            iat,
            exp,
            role,
        })
    }

    /// Check the invariants that must hold before claims are signed.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsInvalid` for an empty issuer or subject, or when
    /// `exp` is not strictly after `iat`.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.iss.is_empty() {
            return Err(TokenError::claims_invalid("issuer must not be empty"));
        }
        if self.sub.is_empty() {
            return Err(TokenError::claims_invalid("subject must not be empty"));
        }
        if self.exp <= self.iat {
            return Err(TokenError::claims_invalid(format!(
                "exp ({}) must be after iat ({})",
                self.exp, self.iat
            )));
        }
        Ok(())
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, timestamp: i64) -> bool {
        self.exp <= timestamp
    }

    /// Remaining lifetime in seconds at issuance.
    pub fn lifetime(&self) -> i64 {
        self.exp - self.iat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(
            "oauth2-server".to_string(),
            "alice".to_string(),
            Role::User,
            3600,
        )
        .unwrap();

        assert_eq!(claims.iss, "oauth2-server");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.lifetime(), 3600);
        assert!(!claims.is_expired());
        assert!(claims.validate().is_ok());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!(matches!(
            "superuser".parse::<Role>(),
            Err(TokenError::ClaimsInvalid(_))
        ));
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_lifetime() {
        let claims = Claims::new("iss".to_string(), "sub".to_string(), Role::User, 0).unwrap();
        assert!(matches!(claims.validate(), Err(TokenError::ClaimsInvalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_subject() {
        let claims = Claims::new("iss".to_string(), String::new(), Role::Admin, 60).unwrap();
        assert!(claims.validate().is_err());
    }

    #[test]
    fn test_lifetime_overflow_is_invalid() {
        assert!(matches!(
            Claims::new("iss".to_string(), "sub".to_string(), Role::User, i64::MAX),
            Err(TokenError::ClaimsInvalid(_))
        ));
        assert!(matches!(
            Claims::issued_at("iss".to_string(), "sub".to_string(), Role::User, 1, i64::MAX),
            Err(TokenError::ClaimsInvalid(_))
        ));
        let claims =
            Claims::issued_at("iss".to_string(), "sub".to_string(), Role::User, 1_000, 60).unwrap();
        assert_eq!(claims.exp, 1_060);
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = Claims {
            iss: "iss".to_string(),
            sub: "sub".to_string(),
            iat: 100,
            exp: 200,
            role: Role::User,
        };
        assert!(!claims.is_expired_at(199));
        assert!(claims.is_expired_at(200));
    }

    #[test]
    fn test_claims_wire_shape() {
        let claims = Claims {
            iss: "oauth2-server".to_string(),
            sub: "alice".to_string(),
            iat: 1,
            exp: 3601,
            role: Role::User,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "iss": "oauth2-server",
                "sub": "alice",
                "iat": 1,
                "exp": 3601,
                "role": "user"
            })
        );
    }
}
