//! Projects, tasks, and their lifecycles.
//!
//! Projects own tasks through `project_id`; both are soft-deleted through an
//! `active` flag that is independent of their status. Cancelling a project
//! deactivates its unfinished tasks in the same unit of work. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
