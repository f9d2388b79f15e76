//! Validated value objects for projects and tasks.

use super::PlanningDomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

fn required(
    value: impl Into<String>,
    empty: PlanningDomainError,
) -> Result<String, PlanningDomainError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    Ok(trimmed.to_owned())
}

/// Validated, trimmed project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::EmptyProjectName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PlanningDomainError> {
        required(value, PlanningDomainError::EmptyProjectName).map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated, trimmed task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::EmptyTaskTitle`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PlanningDomainError> {
        required(value, PlanningDomainError::EmptyTaskTitle).map(Self)
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated, trimmed free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::EmptyDescription`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PlanningDomainError> {
        required(value, PlanningDomainError::EmptyDescription).map(Self)
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Planned date range of a project. The expected end never precedes the
/// start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    start: NaiveDate,
    expected_end: NaiveDate,
}

impl Schedule {
    /// Creates a validated schedule.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::EndBeforeStart`] when `expected_end`
    /// is earlier than `start`.
    pub fn new(start: NaiveDate, expected_end: NaiveDate) -> Result<Self, PlanningDomainError> {
        if expected_end < start {
            return Err(PlanningDomainError::EndBeforeStart {
                start,
                expected_end,
            });
        }
        Ok(Self {
            start,
            expected_end,
        })
    }

    /// Returns the start date.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the expected end date.
    #[must_use]
    pub const fn expected_end(&self) -> NaiveDate {
        self.expected_end
    }
}
