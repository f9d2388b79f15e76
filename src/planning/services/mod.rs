//! Services orchestrating project and task lifecycles and reports.

mod project_lifecycle;
mod reporting;
mod task_lifecycle;

pub use project_lifecycle::{
    CreateProjectRequest, DEFAULT_CASCADE_TIMEOUT, ProjectLifecycleError,
    ProjectLifecycleResult, ProjectLifecycleService, UpdateProjectRequest,
};
pub use reporting::{ReportingError, ReportingResult, ReportingService};
pub use task_lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    UpdateTaskRequest,
};
