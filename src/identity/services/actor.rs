//! Resolution of the acting user against the user repository.

use crate::error::ErrorKind;
use crate::identity::{
    domain::{Identity, User, UserId},
    ports::{UserRepository, UserRepositoryError},
};
use thiserror::Error;

/// Errors raised while resolving the acting user.
#[derive(Debug, Error)]
pub enum ActorError {
    /// The user behind the identity is gone or was deactivated.
    #[error("user {0} is no longer active")]
    Revoked(UserId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

impl ActorError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Revoked(_) => ErrorKind::Unauthenticated,
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Returns the identity of the stored user behind `identity`.
///
/// Only the user ID of `identity` is trusted. Role changes and
/// deactivation made after sign-in apply to the very next call.
///
/// # Errors
///
/// Returns [`ActorError::Revoked`] when the user no longer exists or is
/// inactive, and repository errors.
pub async fn resolve_actor<R>(users: &R, identity: &Identity) -> Result<Identity, ActorError>
where
    R: UserRepository + ?Sized,
{
    let user_id = identity.user_id();
    let user = users
        .find_by_id(user_id)
        .await?
        .filter(User::is_active)
        .ok_or(ActorError::Revoked(user_id))?;
    if user.role() != identity.role() {
        tracing::debug!(
            user_id = %user_id,
            held = %identity.role(),
            current = %user.role(),
            "acting with role changed since sign-in"
        );
    }
    Ok(user.identity())
}
