pub mod builder;
pub mod claims;
pub mod introspection;
pub mod issuer;
pub mod serializer;
pub mod verifier;

pub use builder::{ClaimsBuilder, DEFAULT_TTL_SECONDS, MAX_TTL_SECONDS};
pub use claims::{Claims, Role};
pub use introspection::Introspection;
pub use issuer::{IssuedToken, TokenIssuer, DEFAULT_ISSUER};
pub use serializer::{CompactToken, JwtSerializer};
pub use verifier::{ExpiryPolicy, TokenVerifier};
