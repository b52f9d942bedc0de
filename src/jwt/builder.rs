use crate::error::TokenError;
use crate::jwt::claims::{Claims, Role};

/// Default access token lifetime (1 hour).
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Longest configurable access token lifetime (1 year).
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 3600;

pub struct ClaimsBuilder {
    issuer: String,
    subject: Option<String>,
    role: Option<Role>,
    ttl_seconds: i64,
    issued_at: Option<i64>,
}

impl ClaimsBuilder {
    pub fn new(issuer: impl Into<String>) -> Self {
        ClaimsBuilder {
            issuer: issuer.into(),
            subject: None,
            role: None,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            issued_at: None,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn ttl_seconds(mut self, ttl: i64) -> Self {
        self.ttl_seconds = ttl;
        self
    }

    /// Pin the issuance time instead of reading the clock.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.issued_at = Some(timestamp);
        self
    }

    /// Build and validate the claims.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsInvalid` when subject or role is missing, or the
    /// resulting claims fail [`Claims::validate`].
    pub fn build(self) -> Result<Claims, TokenError> {
        let subject = self
            .subject
            .ok_or_else(|| TokenError::claims_invalid("subject is required"))?;
        let role = self
            .role
            .ok_or_else(|| TokenError::claims_invalid("role is required"))?;

        let claims = match self.issued_at {
            Some(iat) => Claims::issued_at(self.issuer, subject, role, iat, self.ttl_seconds)?,
            None => Claims::new(self.issuer, subject, role, self.ttl_seconds)?,
        };

        claims.validate()?;
        Ok(claims)
    }
}
