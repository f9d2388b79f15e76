//! Project completion summaries and per-user workload.

use crate::authorization::{Action, AuthorizationPolicy, PermissionDenied};
use crate::error::ErrorKind;
use crate::identity::{
    domain::{Identity, UserId},
    ports::{UserRepository, UserRepositoryError},
    services::{ActorError, resolve_actor},
};
use crate::planning::{
    domain::{Project, ProjectId, ProjectSummary, TaskStatus, UserWorkload},
    ports::{
        PlanningRepositoryError, ProjectFilter, ProjectRepository, TaskFilter, TaskRepository,
    },
};
use std::collections::{HashMap, hash_map::Entry};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`ReportingService`].
#[derive(Debug, Error)]
pub enum ReportingError {
    /// The actor may not read reports.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// The acting user is gone or was deactivated.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// Planning repository operation failed.
    #[error(transparent)]
    Repository(#[from] PlanningRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

impl ReportingError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Actor(err) => err.kind(),
            Self::Repository(err) => err.kind(),
            Self::Users(err) => err.kind(),
        }
    }
}

/// Result type for reporting operations.
pub type ReportingResult<T> = Result<T, ReportingError>;

/// Read-only dashboard figures over active records.
#[derive(Clone)]
pub struct ReportingService<P, T, U>
where
    P: ProjectRepository,
    T: TaskRepository,
    U: UserRepository,
{
    projects: Arc<P>,
    tasks: Arc<T>,
    users: Arc<U>,
    policy: AuthorizationPolicy,
}

impl<P, T, U> ReportingService<P, T, U>
where
    P: ProjectRepository,
    T: TaskRepository,
    U: UserRepository,
{
    /// Creates a reporting service.
    #[must_use]
    pub const fn new(projects: Arc<P>, tasks: Arc<T>, users: Arc<U>) -> Self {
        Self {
            projects,
            tasks,
            users,
            policy: AuthorizationPolicy,
        }
    }

    async fn current_actor(&self, identity: &Identity) -> ReportingResult<Identity> {
        Ok(resolve_actor(&*self.users, identity).await?)
    }

    /// Returns task totals for every active project, ordered by name.
    ///
    /// Only active tasks are counted. The manager's name is reported even
    /// when their account has since been deactivated.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::PermissionDenied`] for collaborators and
    /// repository errors.
    pub async fn project_summaries(
        &self,
        identity: &Identity,
    ) -> ReportingResult<Vec<ProjectSummary>> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ViewReports, None)?;
        let projects = self.projects.list_active(&ProjectFilter::all()).await?;
        let tasks = self.tasks.list(&TaskFilter::all()).await?;
        let mut manager_names: HashMap<UserId, Option<String>> = HashMap::new();
        for manager_id in projects.iter().map(Project::manager_id) {
            if let Entry::Vacant(slot) = manager_names.entry(manager_id) {
                let name = self
                    .users
                    .find_by_id(manager_id)
                    .await?
                    .map(|user| user.name().as_str().to_owned());
                slot.insert(name);
            }
        }

        let mut counts: HashMap<ProjectId, (u64, u64)> = HashMap::new();
        for task in &tasks {
            let entry = counts.entry(task.project_id()).or_default();
            entry.0 += 1;
            if task.status() == TaskStatus::Completed {
                entry.1 += 1;
            }
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let (total_tasks, completed_tasks) =
                    counts.get(&project.id()).copied().unwrap_or_default();
                ProjectSummary {
                    project_id: project.id(),
                    name: project.name().clone(),
                    status: project.status(),
                    manager_id: project.manager_id(),
                    manager_name: manager_names.get(&project.manager_id()).cloned().flatten(),
                    total_tasks,
                    completed_tasks,
                }
            })
            .collect())
    }

    /// Returns active task counts for every active user, ordered by name.
    ///
    /// Users without tasks are included with zero counts.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::PermissionDenied`] for collaborators and
    /// repository errors.
    pub async fn task_workload(&self, identity: &Identity) -> ReportingResult<Vec<UserWorkload>> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ViewReports, None)?;
        let users = self.users.list_active().await?;
        let tasks = self.tasks.list(&TaskFilter::all()).await?;

        let mut workloads: HashMap<UserId, UserWorkload> = users
            .iter()
            .map(|user| {
                (
                    user.id(),
                    UserWorkload {
                        user_id: user.id(),
                        name: user.name().as_str().to_owned(),
                        role: user.role(),
                        total: 0,
                        pending: 0,
                        in_progress: 0,
                        completed: 0,
                    },
                )
            })
            .collect();
        for task in &tasks {
            let Some(workload) = workloads.get_mut(&task.assignee_id()) else {
                continue;
            };
            workload.total += 1;
            match task.status() {
                TaskStatus::Pending => workload.pending += 1,
                TaskStatus::InProgress => workload.in_progress += 1,
                TaskStatus::Completed => workload.completed += 1,
                TaskStatus::Cancelled => {}
            }
        }

        Ok(users
            .iter()
            .filter_map(|user| workloads.remove(&user.id()))
            .collect())
    }
}
