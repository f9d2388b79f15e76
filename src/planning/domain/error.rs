//! Error types for planning domain validation and parsing.

use super::{ProjectId, ProjectStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or changing projects and tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanningDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The description is empty after trimming.
    #[error("description must not be empty")]
    EmptyDescription,

    /// The expected end date precedes the start date.
    #[error("expected end {expected_end} is before start {start}")]
    EndBeforeStart {
        /// Requested start date.
        start: NaiveDate,
        /// Requested expected end date.
        expected_end: NaiveDate,
    },

    /// Cancellation was requested through a plain field edit.
    #[error("projects can only be cancelled through the cancel operation")]
    CancellationRequiresCascade,

    /// The project is cancelled and no longer accepts edits.
    #[error("project {0} is cancelled")]
    ProjectCancelled(ProjectId),

    /// The project has already reached a terminal status.
    #[error("project {project_id} is already {status}")]
    AlreadyTerminal {
        /// Project that was targeted.
        project_id: ProjectId,
        /// Status found on the project.
        status: ProjectStatus,
    },
}

/// Error returned while parsing project statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project status: {0}")]
pub struct ParseProjectStatusError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
