//! Projectdesk: role-governed project and task tracking.
//!
//! This crate holds the decision logic of a small project-management system:
//! who may do what to which record, and how projects and their tasks move
//! through their lifecycles. Presentation and process startup live
//! elsewhere; callers reach the core through [`desk::Desk`] or the individual
//! services.
//!
//! # Architecture
//!
//! Projectdesk follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and credentials
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`authorization`]: Role and ownership based access decisions
//! - [`identity`]: Users, authentication, and the per-call identity value
//! - [`planning`]: Project and task lifecycles, including the cancellation
//!   cascade
//! - [`desk`]: Facade exposing the in-process contract to presentation code

pub mod authorization;
pub mod config;
pub mod desk;
pub mod display;
pub mod error;
pub mod identity;
pub mod planning;
pub mod storage;
pub mod telemetry;
