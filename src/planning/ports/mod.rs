//! Port contracts for project and task persistence.

mod repository;

pub use repository::{
    CascadeOutcome, PlanningRepositoryError, PlanningRepositoryResult, ProjectFilter,
    ProjectRepository, TaskFilter, TaskRepository,
};
