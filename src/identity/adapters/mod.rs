//! Adapter implementations for identity ports.

pub mod memory;
pub mod postgres;

mod credentials;

pub use credentials::{ConfiguredCredentials, PlaintextCredentials, Sha256Credentials};
