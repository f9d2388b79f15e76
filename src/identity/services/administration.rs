//! User account administration.

use crate::authorization::{Action, AuthorizationPolicy, PermissionDenied};
use crate::error::ErrorKind;
use crate::identity::{
    domain::{
        EmailAddress, Identity, IdentityDomainError, Login, Password, PersonName, Role, User,
        UserId, UserProfile,
    },
    ports::{CredentialVerifier, UserRepository, UserRepositoryError},
    services::{ActorError, resolve_actor},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a user.
#[derive(Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Login handle.
    pub login: String,
    /// Initial password.
    pub password: String,
    /// Access role.
    pub role: Role,
}

impl CreateUserRequest {
    /// Creates a user creation request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            login: login.into(),
            password: password.into(),
            role,
        }
    }
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("login", &self.login)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Request payload for editing a user's profile.
///
/// A password is only replaced when one is supplied.
#[derive(Clone, PartialEq, Eq)]
pub struct UpdateUserRequest {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Login handle.
    pub login: String,
    /// Access role.
    pub role: Role,
    /// Optional replacement password.
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// Creates a profile update request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        login: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            login: login.into(),
            role,
            password: None,
        }
    }

    /// Resets the user's password as part of the update.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    fn into_parts(self) -> Result<(UserProfile, Option<Password>), IdentityDomainError> {
        let password = self.password.map(Password::new).transpose()?;
        let profile = UserProfile {
            name: PersonName::new(self.name)?,
            email: EmailAddress::new(self.email)?,
            login: Login::new(self.login)?,
            role: self.role,
        };
        Ok((profile, password))
    }
}

impl std::fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("login", &self.login)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Errors returned by [`UserAdministrationService`].
#[derive(Debug, Error)]
pub enum UserAdministrationError {
    /// The actor may not perform the operation.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// The acting user is gone or was deactivated.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),

    /// Another active user already holds the login.
    #[error("login already in use: {0}")]
    LoginInUse(Login),

    /// Another active user already holds the email address.
    #[error("email already in use: {0}")]
    EmailInUse(EmailAddress),

    /// Administrators cannot deactivate their own account.
    #[error("users cannot deactivate their own account")]
    SelfDeactivation,

    /// No active user exists with the given identifier.
    #[error("user {0} not found")]
    NotFound(UserId),

    /// The directory already holds active users.
    #[error("an administrator can only be bootstrapped into an empty directory")]
    AlreadyBootstrapped,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

impl UserAdministrationError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) | Self::AlreadyBootstrapped => {
                ErrorKind::PermissionDenied
            }
            Self::Domain(_)
            | Self::LoginInUse(_)
            | Self::EmailInUse(_)
            | Self::SelfDeactivation => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Actor(err) => err.kind(),
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Result type for user administration operations.
pub type UserAdministrationResult<T> = Result<T, UserAdministrationError>;

/// Creates, edits, deactivates, and lists users.
#[derive(Clone)]
pub struct UserAdministrationService<R, V, C>
where
    R: UserRepository,
    V: CredentialVerifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    verifier: Arc<V>,
    clock: Arc<C>,
    policy: AuthorizationPolicy,
}

impl<R, V, C> UserAdministrationService<R, V, C>
where
    R: UserRepository,
    V: CredentialVerifier,
    C: Clock + Send + Sync,
{
    /// Creates a user administration service.
    #[must_use]
    pub const fn new(repository: Arc<R>, verifier: Arc<V>, clock: Arc<C>) -> Self {
        Self {
            repository,
            verifier,
            clock,
            policy: AuthorizationPolicy,
        }
    }

    async fn current_actor(&self, identity: &Identity) -> UserAdministrationResult<Identity> {
        Ok(resolve_actor(&*self.repository, identity).await?)
    }

    async fn find_active_or_error(&self, user_id: UserId) -> UserAdministrationResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .filter(User::is_active)
            .ok_or(UserAdministrationError::NotFound(user_id))
    }

    async fn ensure_unique(
        &self,
        profile: &UserProfile,
        exclude: Option<UserId>,
    ) -> UserAdministrationResult<()> {
        if self.repository.login_taken(&profile.login, exclude).await? {
            return Err(UserAdministrationError::LoginInUse(profile.login.clone()));
        }
        if self.repository.email_taken(&profile.email, exclude).await? {
            return Err(UserAdministrationError::EmailInUse(profile.email.clone()));
        }
        Ok(())
    }

    /// Creates the first administrator of an empty directory.
    ///
    /// The requested role is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`UserAdministrationError::AlreadyBootstrapped`] once any
    /// active user exists, validation errors, and repository errors.
    pub async fn bootstrap_administrator(
        &self,
        request: CreateUserRequest,
    ) -> UserAdministrationResult<User> {
        if !self.repository.list_active().await?.is_empty() {
            return Err(UserAdministrationError::AlreadyBootstrapped);
        }
        let password = Password::new(request.password)?;
        let (profile, _) = UpdateUserRequest::new(
            request.name,
            request.email,
            request.login,
            Role::Administrator,
        )
        .into_parts()?;

        let user = User::new(profile, self.verifier.seal(&password), &*self.clock);
        self.repository.store(&user).await?;
        tracing::info!(user_id = %user.id(), "administrator bootstrapped");
        Ok(user)
    }

    /// Creates an active user.
    ///
    /// # Errors
    ///
    /// Returns [`UserAdministrationError::PermissionDenied`] for
    /// non-administrators, validation errors for malformed fields or a login
    /// or email already held by an active user, and repository errors.
    pub async fn create_user(
        &self,
        identity: &Identity,
        request: CreateUserRequest,
    ) -> UserAdministrationResult<User> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ManageUsers, None)?;
        let password = Password::new(request.password)?;
        let (profile, _) =
            UpdateUserRequest::new(request.name, request.email, request.login, request.role)
                .into_parts()?;
        self.ensure_unique(&profile, None).await?;

        let user = User::new(profile, self.verifier.seal(&password), &*self.clock);
        self.repository.store(&user).await?;
        tracing::info!(
            actor = %actor.user_id(),
            user_id = %user.id(),
            role = %user.role(),
            "user created"
        );
        Ok(user)
    }

    /// Replaces a user's profile fields and, when supplied, their password.
    ///
    /// Uniqueness of login and email ignores the edited user's own record.
    ///
    /// # Errors
    ///
    /// Returns [`UserAdministrationError::PermissionDenied`] for
    /// non-administrators, [`UserAdministrationError::NotFound`] when no
    /// active user has the ID, validation errors, and repository errors.
    pub async fn update_user(
        &self,
        identity: &Identity,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> UserAdministrationResult<User> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ManageUsers, None)?;
        let (profile, password) = request.into_parts()?;
        let mut user = self.find_active_or_error(user_id).await?;
        self.ensure_unique(&profile, Some(user_id)).await?;

        user.update_profile(profile, &*self.clock);
        if let Some(replacement) = password {
            user.replace_secret(self.verifier.seal(&replacement), &*self.clock);
        }
        self.repository.update(&user).await?;
        tracing::info!(actor = %actor.user_id(), user_id = %user_id, "user updated");
        Ok(user)
    }

    /// Marks a user as inactive.
    ///
    /// # Errors
    ///
    /// Returns [`UserAdministrationError::PermissionDenied`] for
    /// non-administrators, [`UserAdministrationError::SelfDeactivation`] when
    /// the actor targets themself, [`UserAdministrationError::NotFound`], and
    /// repository errors.
    pub async fn deactivate_user(
        &self,
        identity: &Identity,
        user_id: UserId,
    ) -> UserAdministrationResult<User> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ManageUsers, None)?;
        if user_id == actor.user_id() {
            return Err(UserAdministrationError::SelfDeactivation);
        }
        let mut user = self.find_active_or_error(user_id).await?;
        user.deactivate(&*self.clock);
        self.repository.update(&user).await?;
        tracing::info!(actor = %actor.user_id(), user_id = %user_id, "user deactivated");
        Ok(user)
    }

    /// Lists active users ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`UserAdministrationError::PermissionDenied`] for
    /// non-administrators and repository errors.
    pub async fn list_users(&self, identity: &Identity) -> UserAdministrationResult<Vec<User>> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ManageUsers, None)?;
        let users = self.repository.list_active().await?;
        tracing::debug!(count = users.len(), "listed users");
        Ok(users)
    }

    /// Lists active users holding `role`, ordered by name.
    ///
    /// Used to offer managers and assignees when editing projects and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`UserAdministrationError::PermissionDenied`] for
    /// collaborators and repository errors.
    pub async fn list_users_by_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> UserAdministrationResult<Vec<User>> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ViewUserDirectory, None)?;
        Ok(self.repository.list_active_by_role(role).await?)
    }
}
