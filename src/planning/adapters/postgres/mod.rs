//! `PostgreSQL` adapter for project and task persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresPlanningStore;
