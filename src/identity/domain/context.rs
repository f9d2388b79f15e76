//! Authenticated identities and the per-caller identity slot.

use super::{Role, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The authenticated actor of an operation.
///
/// A snapshot taken at sign-in. Services only trust its user ID: they
/// re-read that user on every call, so the role held here may be stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    user_id: UserId,
    name: String,
    login: String,
    role: Role,
}

impl Identity {
    /// Creates an identity snapshot.
    #[must_use]
    pub(crate) fn new(
        user_id: UserId,
        name: impl Into<String>,
        login: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            login: login.into(),
            role,
        }
    }

    /// Returns the identifier of the underlying user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the login handle.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Returns the access role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the actor is an administrator.
    #[must_use]
    pub const fn is_administrator(&self) -> bool {
        matches!(self.role, Role::Administrator)
    }

    /// Returns whether the actor is a manager.
    #[must_use]
    pub const fn is_manager(&self) -> bool {
        matches!(self.role, Role::Manager)
    }

    /// Returns whether the actor is a collaborator.
    #[must_use]
    pub const fn is_collaborator(&self) -> bool {
        matches!(self.role, Role::Collaborator)
    }
}

/// Error returned when an operation needs an identity but none is held.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no authenticated identity")]
pub struct NoActiveIdentity;

/// Holds zero or one authenticated identity for a single caller.
///
/// Each caller (a desktop session, a request handler) owns its own context
/// and passes the held [`Identity`] into services explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityContext {
    current: Option<Identity>,
}

impl IdentityContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Stores the identity produced by a successful sign-in, replacing any
    /// previous one.
    pub fn establish(&mut self, identity: Identity) {
        self.current = Some(identity);
    }

    /// Clears the held identity.
    pub fn logout(&mut self) {
        self.current = None;
    }

    /// Returns the held identity, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Returns whether an identity is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the held identity or an error when none is held.
    ///
    /// # Errors
    ///
    /// Returns [`NoActiveIdentity`] when the context is empty.
    pub fn require(&self) -> Result<&Identity, NoActiveIdentity> {
        self.current.as_ref().ok_or(NoActiveIdentity)
    }
}
