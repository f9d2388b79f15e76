//! Services for signing in and administering users.

mod actor;
mod administration;
mod authentication;

pub use actor::{ActorError, resolve_actor};
pub use administration::{
    CreateUserRequest, UpdateUserRequest, UserAdministrationError, UserAdministrationResult,
    UserAdministrationService,
};
pub use authentication::{
    AuthenticationError, AuthenticationResult, AuthenticationService, ChangePasswordRequest,
};
