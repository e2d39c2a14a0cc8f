//! Credential handling for external service clients.

pub mod credentials;

pub use credentials::ApiKey;
