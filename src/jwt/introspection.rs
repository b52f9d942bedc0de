use crate::jwt::claims::{Claims, Role};
use serde::{Deserialize, Serialize};

/// Introspection response body.
///
/// Inactive results carry no other field, so callers cannot tell which
/// check failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Introspection {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Introspection {
    pub fn inactive() -> Self {
        Introspection {
            active: false,
            iss: None,
            sub: None,
            iat: None,
            exp: None,
            role: None,
        }
    }

    pub fn active(claims: Claims) -> Self {
        Introspection {
            active: true,
            iss: Some(claims.iss),
            sub: Some(claims.sub),
            iat: Some(claims.iat),
            exp: Some(claims.exp),
            role: Some(claims.role),
        }
    }
}
