//! Repository port for user persistence and lookup.

use crate::error::ErrorKind;
use crate::identity::domain::{EmailAddress, Login, Role, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
///
/// Listings only return active users, ordered by name.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateUser`] when the ID already
    /// exists, or [`UserRepositoryError::DuplicateLogin`] /
    /// [`UserRepositoryError::DuplicateEmail`] when an active user already
    /// holds the login or email.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Persists changes to an existing user (profile, secret, active flag).
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not exist
    /// or a uniqueness error when another active user holds the login or
    /// email.
    async fn update(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds a user by identifier, active or not.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Finds the active user holding a login.
    async fn find_active_by_login(&self, login: &Login) -> UserRepositoryResult<Option<User>>;

    /// Returns all active users.
    async fn list_active(&self) -> UserRepositoryResult<Vec<User>>;

    /// Returns all active users holding a role.
    async fn list_active_by_role(&self, role: Role) -> UserRepositoryResult<Vec<User>>;

    /// Returns whether an active user other than `exclude` holds the login.
    async fn login_taken(
        &self,
        login: &Login,
        exclude: Option<UserId>,
    ) -> UserRepositoryResult<bool>;

    /// Returns whether an active user other than `exclude` holds the email.
    async fn email_taken(
        &self,
        email: &EmailAddress,
        exclude: Option<UserId>,
    ) -> UserRepositoryResult<bool>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// An active user already holds the login.
    #[error("login already in use: {0}")]
    DuplicateLogin(Login),

    /// An active user already holds the email address.
    #[error("email already in use: {0}")]
    DuplicateEmail(EmailAddress),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted user data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateLogin(_) | Self::DuplicateEmail(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateUser(_) | Self::InvalidPersistedData(_) | Self::Persistence(_) => {
                ErrorKind::Storage
            }
        }
    }
}
