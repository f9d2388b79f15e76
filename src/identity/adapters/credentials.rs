//! Credential verifier adapters.

use crate::config::CredentialScheme;
use crate::identity::{
    domain::{CredentialSecret, Password},
    ports::CredentialVerifier,
};
use sha2::{Digest, Sha256};

/// Stores passwords verbatim and compares them directly.
///
/// Reproduces the legacy behaviour. Stored secrets are readable by anyone
/// with access to the `users` table; prefer [`Sha256Credentials`] for new
/// deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCredentials;

impl CredentialVerifier for PlaintextCredentials {
    fn seal(&self, password: &Password) -> CredentialSecret {
        CredentialSecret::new(password.expose())
    }

    fn verify(&self, presented: &str, stored: &CredentialSecret) -> bool {
        presented == stored.expose()
    }
}

/// Stores lowercase hex SHA-256 digests of passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Credentials;

impl Sha256Credentials {
    /// Returns the lowercase hex SHA-256 digest of `input`.
    #[must_use]
    pub fn digest(input: &str) -> String {
        let hash = Sha256::digest(input.as_bytes());
        format!("{hash:x}")
    }
}

impl CredentialVerifier for Sha256Credentials {
    fn seal(&self, password: &Password) -> CredentialSecret {
        CredentialSecret::new(Self::digest(password.expose()))
    }

    fn verify(&self, presented: &str, stored: &CredentialSecret) -> bool {
        Self::digest(presented) == stored.expose()
    }
}

/// Verifier selected at runtime from [`CredentialScheme`].
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredCredentials {
    /// Verbatim comparison.
    Plaintext(PlaintextCredentials),
    /// SHA-256 digest comparison.
    Sha256(Sha256Credentials),
}

impl From<CredentialScheme> for ConfiguredCredentials {
    fn from(scheme: CredentialScheme) -> Self {
        match scheme {
            CredentialScheme::Plaintext => Self::Plaintext(PlaintextCredentials),
            CredentialScheme::Sha256 => Self::Sha256(Sha256Credentials),
        }
    }
}

impl CredentialVerifier for ConfiguredCredentials {
    fn seal(&self, password: &Password) -> CredentialSecret {
        match self {
            Self::Plaintext(inner) => inner.seal(password),
            Self::Sha256(inner) => inner.seal(password),
        }
    }

    fn verify(&self, presented: &str, stored: &CredentialSecret) -> bool {
        match self {
            Self::Plaintext(inner) => inner.verify(presented, stored),
            Self::Sha256(inner) => inner.verify(presented, stored),
        }
    }
}
