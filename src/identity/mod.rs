//! User identity, authentication, and user administration.
//!
//! An [`domain::Identity`] is the value every other service receives to
//! know who is acting. It is produced by authenticating against the user
//! repository and is passed explicitly per call; nothing here keeps a
//! process-wide session. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
