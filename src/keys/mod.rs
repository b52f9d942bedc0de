pub mod manager;
pub mod thumbprint;

pub use manager::{KeyManager, DEFAULT_KEY_BITS, MIN_KEY_BITS};
