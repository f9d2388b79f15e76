//! Diesel row models for project and task persistence.

use super::schema::{projects, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Expected end date.
    pub expected_end: NaiveDate,
    /// Date the project was completed.
    pub actual_end: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: String,
    /// Responsible user.
    pub manager_id: uuid::Uuid,
    /// Logical-deletion flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model and changeset for project records.
///
/// Used for inserts and full-row updates. `None` dates are written as
/// `NULL` so clearing a date persists.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct ProjectRecord {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Expected end date.
    pub expected_end: NaiveDate,
    /// Date the project was completed.
    pub actual_end: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: String,
    /// Responsible user.
    pub manager_id: uuid::Uuid,
    /// Logical-deletion flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Parent project.
    pub project_id: uuid::Uuid,
    /// Assigned user.
    pub assignee_id: uuid::Uuid,
    /// Task status.
    pub status: String,
    /// Task priority.
    pub priority: String,
    /// Date the task should be done by.
    pub expected_completion: Option<NaiveDate>,
    /// Date the task was completed.
    pub completed_on: Option<NaiveDate>,
    /// Logical-deletion flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model and changeset for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Parent project.
    pub project_id: uuid::Uuid,
    /// Assigned user.
    pub assignee_id: uuid::Uuid,
    /// Task status.
    pub status: String,
    /// Task priority.
    pub priority: String,
    /// Date the task should be done by.
    pub expected_completion: Option<NaiveDate>,
    /// Date the task was completed.
    pub completed_on: Option<NaiveDate>,
    /// Logical-deletion flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
