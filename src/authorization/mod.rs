//! Role and ownership based authorization.
//!
//! [`authorize`] is a pure function of the acting [`Identity`], the
//! requested [`Action`], and the owner of the target record. It holds no
//! state and performs no I/O, so callers evaluate it afresh on every
//! operation; a role or ownership change takes effect on the next call.
//!
//! [`Identity`]: crate::identity::domain::Identity

mod policy;

pub use policy::{Action, AuthorizationPolicy, Decision, PermissionDenied, authorize};

#[cfg(test)]
mod tests;
