//! Error classification shared by every service.
//!
//! Each service defines its own error enum; [`ErrorKind`] is the coarse
//! category presentation code switches on.

use std::fmt;

/// Coarse failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The authorization policy denied the action.
    PermissionDenied,
    /// Input failed validation or the requested state change is illegal.
    Validation,
    /// The storage layer failed; nothing was committed.
    Storage,
    /// Credentials did not identify an active user.
    Unauthenticated,
}

impl ErrorKind {
    /// Returns the canonical lowercase name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Validation => "validation",
            Self::Storage => "storage",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
