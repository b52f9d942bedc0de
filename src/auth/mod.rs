pub mod basic;

pub use basic::{extract_basic_credentials, Client, ClientRegistry, Credentials};
