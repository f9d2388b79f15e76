//! Sign-in and password change.

use crate::error::ErrorKind;
use crate::identity::{
    domain::{Identity, IdentityContext, IdentityDomainError, Login, Password, User, UserId},
    ports::{CredentialVerifier, UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for changing the caller's own password.
#[derive(Clone, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    /// Password currently in use.
    pub current: String,
    /// Replacement password.
    pub new: String,
    /// Repetition of the replacement password.
    pub confirmation: String,
}

impl ChangePasswordRequest {
    /// Creates a password change request.
    #[must_use]
    pub fn new(
        current: impl Into<String>,
        new: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        Self {
            current: current.into(),
            new: new.into(),
            confirmation: confirmation.into(),
        }
    }
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

/// Errors returned by [`AuthenticationService`].
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The login is unknown, inactive, or the secret does not match.
    #[error("invalid login or password")]
    InvalidCredentials,

    /// The replacement password and its confirmation differ.
    #[error("password confirmation does not match")]
    ConfirmationMismatch,

    /// The user behind an identity no longer exists or is inactive.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

impl AuthenticationError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials => ErrorKind::Unauthenticated,
            Self::ConfirmationMismatch | Self::Domain(_) => ErrorKind::Validation,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Result type for authentication operations.
pub type AuthenticationResult<T> = Result<T, AuthenticationError>;

/// Authenticates users against the user repository.
#[derive(Clone)]
pub struct AuthenticationService<R, V, C>
where
    R: UserRepository,
    V: CredentialVerifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    verifier: Arc<V>,
    clock: Arc<C>,
}

impl<R, V, C> AuthenticationService<R, V, C>
where
    R: UserRepository,
    V: CredentialVerifier,
    C: Clock + Send + Sync,
{
    /// Creates an authentication service.
    #[must_use]
    pub const fn new(repository: Arc<R>, verifier: Arc<V>, clock: Arc<C>) -> Self {
        Self {
            repository,
            verifier,
            clock,
        }
    }

    /// Checks a login and secret against the active users.
    ///
    /// Every failure (blank login, unknown or inactive user, wrong secret)
    /// is reported as [`AuthenticationError::InvalidCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidCredentials`] when the
    /// credentials do not identify an active user, or repository errors.
    pub async fn authenticate(&self, login: &str, secret: &str) -> AuthenticationResult<Identity> {
        let Ok(validated_login) = Login::new(login) else {
            tracing::warn!("sign-in rejected: blank login");
            return Err(AuthenticationError::InvalidCredentials);
        };
        let candidate = self.repository.find_active_by_login(&validated_login).await?;
        match candidate {
            Some(user) if self.verifier.verify(secret, user.secret()) => {
                tracing::info!(user_id = %user.id(), role = %user.role(), "signed in");
                Ok(user.identity())
            }
            _ => {
                tracing::warn!(login = %validated_login, "sign-in rejected");
                Err(AuthenticationError::InvalidCredentials)
            }
        }
    }

    /// Authenticates and stores the identity in `context`.
    ///
    /// A failed attempt leaves the context untouched.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::authenticate`].
    pub async fn sign_in(
        &self,
        context: &mut IdentityContext,
        login: &str,
        secret: &str,
    ) -> AuthenticationResult<Identity> {
        let identity = self.authenticate(login, secret).await?;
        context.establish(identity.clone());
        Ok(identity)
    }

    /// Replaces the actor's own password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidCredentials`] when the current
    /// password does not verify, [`AuthenticationError::ConfirmationMismatch`]
    /// or a domain error when the replacement is rejected, and repository
    /// errors.
    pub async fn change_password(
        &self,
        identity: &Identity,
        request: ChangePasswordRequest,
    ) -> AuthenticationResult<User> {
        if request.new != request.confirmation {
            return Err(AuthenticationError::ConfirmationMismatch);
        }
        let replacement = Password::new(request.new)?;
        let user_id = identity.user_id();
        let mut user = self
            .repository
            .find_by_id(user_id)
            .await?
            .filter(User::is_active)
            .ok_or(AuthenticationError::UserNotFound(user_id))?;
        if !self.verifier.verify(&request.current, user.secret()) {
            tracing::warn!(user_id = %user.id(), "password change rejected");
            return Err(AuthenticationError::InvalidCredentials);
        }
        user.replace_secret(self.verifier.seal(&replacement), &*self.clock);
        self.repository.update(&user).await?;
        tracing::info!(user_id = %user.id(), "password changed");
        Ok(user)
    }
}
