//! Port contracts for identity management.
//!
//! Ports define infrastructure-agnostic interfaces used by identity services.

pub mod credentials;
pub mod repository;

pub use credentials::CredentialVerifier;
pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
