//! Error types for identity domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing identity domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The person name is empty after trimming.
    #[error("name must not be empty")]
    EmptyName,

    /// The login is empty after trimming.
    #[error("login must not be empty")]
    EmptyLogin,

    /// The email address is empty after trimming.
    #[error("email must not be empty")]
    EmptyEmail,

    /// The email address does not look like `local@domain`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// A new password is shorter than the minimum length.
    #[error("password must have at least {minimum} characters")]
    PasswordTooShort {
        /// Minimum accepted number of characters.
        minimum: usize,
    },
}

/// Error returned while parsing roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
