//! Credential comparison port.

use crate::identity::domain::{CredentialSecret, Password};

/// Turns new passwords into stored secrets and checks presented passwords
/// against stored secrets.
pub trait CredentialVerifier: Send + Sync {
    /// Produces the secret to persist for a new password.
    fn seal(&self, password: &Password) -> CredentialSecret;

    /// Returns whether `presented` matches the stored secret.
    fn verify(&self, presented: &str, stored: &CredentialSecret) -> bool;
}
