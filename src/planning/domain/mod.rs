//! Domain model for projects, tasks, and planning reports.

mod error;
mod ids;
mod project;
mod report;
mod status;
mod task;
mod values;

pub use error::{
    ParseProjectStatusError, ParseTaskPriorityError, ParseTaskStatusError, PlanningDomainError,
};
pub use ids::{ProjectId, TaskId};
pub use project::{PersistedProjectData, Project, ProjectDetails};
pub use report::{ProjectSummary, UserWorkload};
pub use status::{ProjectStatus, TaskPriority, TaskStatus};
pub use task::{PersistedTaskData, Task, TaskDetails};
pub use values::{Description, ProjectName, Schedule, TaskTitle};
