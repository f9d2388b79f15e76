//! User aggregate root.

use super::{CredentialSecret, EmailAddress, Identity, Login, PersonName, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Validated profile fields shared by user creation and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name.
    pub name: PersonName,
    /// Contact address, unique among active users.
    pub email: EmailAddress,
    /// Login handle, unique among active users.
    pub login: Login,
    /// Access role.
    pub role: Role,
}

/// User aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    profile: UserProfile,
    secret: CredentialSecret,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted profile fields.
    pub profile: UserProfile,
    /// Persisted credential secret.
    pub secret: CredentialSecret,
    /// Persisted logical-deletion flag.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user.
    #[must_use]
    pub fn new(profile: UserProfile, secret: CredentialSecret, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: UserId::new(),
            profile,
            secret,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            profile: data.profile,
            secret: data.secret,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the profile fields.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &PersonName {
        &self.profile.name
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.profile.email
    }

    /// Returns the login handle.
    #[must_use]
    pub const fn login(&self) -> &Login {
        &self.profile.login
    }

    /// Returns the access role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role
    }

    /// Returns the stored credential secret.
    #[must_use]
    pub const fn secret(&self) -> &CredentialSecret {
        &self.secret
    }

    /// Returns whether the user has not been deactivated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Builds the identity value handed to services after authentication.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(
            self.id,
            self.profile.name.as_str(),
            self.profile.login.as_str(),
            self.profile.role,
        )
    }

    /// Replaces the profile fields.
    pub fn update_profile(&mut self, profile: UserProfile, clock: &impl Clock) {
        self.profile = profile;
        self.touch(clock);
    }

    /// Replaces the stored credential secret.
    pub fn replace_secret(&mut self, secret: CredentialSecret, clock: &impl Clock) {
        self.secret = secret;
        self.touch(clock);
    }

    /// Marks the user as logically deleted.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.active = false;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
