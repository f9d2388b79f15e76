//! Domain model for users and authenticated identities.

mod context;
mod error;
mod ids;
mod role;
mod user;
mod values;

pub use context::{Identity, IdentityContext, NoActiveIdentity};
pub use error::{IdentityDomainError, ParseRoleError};
pub use ids::UserId;
pub use role::Role;
pub use user::{PersistedUserData, User, UserProfile};
pub use values::{CredentialSecret, EmailAddress, Login, Password, PersonName};
