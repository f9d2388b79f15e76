//! Project creation, editing, cancellation, and lookup.

use crate::authorization::{Action, AuthorizationPolicy, PermissionDenied};
use crate::error::ErrorKind;
use crate::identity::{
    domain::{Identity, User, UserId},
    ports::{UserRepository, UserRepositoryError},
    services::{ActorError, resolve_actor},
};
use crate::planning::{
    domain::{
        Description, PlanningDomainError, Project, ProjectDetails, ProjectId, ProjectName,
        ProjectStatus, Schedule,
    },
    ports::{CascadeOutcome, PlanningRepositoryError, ProjectFilter, ProjectRepository},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound applied to a cancellation cascade unless configured
/// otherwise.
pub const DEFAULT_CASCADE_TIMEOUT: Duration = Duration::from_secs(5);

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Planned start date.
    pub start: NaiveDate,
    /// Expected end date.
    pub expected_end: NaiveDate,
    /// Requested manager. Ignored when a manager creates the project.
    pub manager_id: UserId,
}

impl CreateProjectRequest {
    /// Creates a project creation request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDate,
        expected_end: NaiveDate,
        manager_id: UserId,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            start,
            expected_end,
            manager_id,
        }
    }
}

/// Request payload for editing a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Planned start date.
    pub start: NaiveDate,
    /// Expected end date.
    pub expected_end: NaiveDate,
    /// Responsible user.
    pub manager_id: UserId,
    /// Status to set; cancellation goes through
    /// [`ProjectLifecycleService::cancel`] instead.
    pub status: ProjectStatus,
}

impl UpdateProjectRequest {
    /// Builds an update request pre-filled from the project's current
    /// fields.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        let details = project.details();
        Self {
            name: details.name.as_str().to_owned(),
            description: details.description.as_str().to_owned(),
            start: details.schedule.start(),
            expected_end: details.schedule.expected_end(),
            manager_id: details.manager_id,
            status: project.status(),
        }
    }

    /// Replaces the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the planned dates.
    #[must_use]
    pub const fn with_dates(mut self, start: NaiveDate, expected_end: NaiveDate) -> Self {
        self.start = start;
        self.expected_end = expected_end;
        self
    }

    /// Replaces the manager.
    #[must_use]
    pub const fn with_manager(mut self, manager_id: UserId) -> Self {
        self.manager_id = manager_id;
        self
    }

    /// Replaces the status.
    #[must_use]
    pub const fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

fn project_details(
    name: String,
    description: String,
    start: NaiveDate,
    expected_end: NaiveDate,
    manager_id: UserId,
) -> Result<ProjectDetails, PlanningDomainError> {
    Ok(ProjectDetails {
        name: ProjectName::new(name)?,
        description: Description::new(description)?,
        schedule: Schedule::new(start, expected_end)?,
        manager_id,
    })
}

/// Errors returned by [`ProjectLifecycleService`].
#[derive(Debug, Error)]
pub enum ProjectLifecycleError {
    /// The actor may not perform the operation.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// The acting user is gone or was deactivated.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PlanningDomainError),

    /// No active project exists with the given identifier.
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// The requested manager is not an active user.
    #[error("manager {0} not found")]
    ManagerNotFound(UserId),

    /// A manager tried to hand their project to someone else.
    #[error("only administrators can reassign a project's manager")]
    ManagerReassignment,

    /// Planning repository operation failed.
    #[error(transparent)]
    Repository(#[from] PlanningRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

impl ProjectLifecycleError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) | Self::ManagerReassignment => ErrorKind::PermissionDenied,
            Self::Domain(_) => ErrorKind::Validation,
            Self::ProjectNotFound(_) | Self::ManagerNotFound(_) => ErrorKind::NotFound,
            Self::Actor(err) => err.kind(),
            Self::Repository(err) => err.kind(),
            Self::Users(err) => err.kind(),
        }
    }
}

/// Result type for project lifecycle operations.
pub type ProjectLifecycleResult<T> = Result<T, ProjectLifecycleError>;

/// Project lifecycle orchestration service.
#[derive(Clone)]
pub struct ProjectLifecycleService<P, U, C>
where
    P: ProjectRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    projects: Arc<P>,
    users: Arc<U>,
    clock: Arc<C>,
    policy: AuthorizationPolicy,
    cascade_timeout: Duration,
}

impl<P, U, C> ProjectLifecycleService<P, U, C>
where
    P: ProjectRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a project lifecycle service with [`DEFAULT_CASCADE_TIMEOUT`].
    #[must_use]
    pub const fn new(projects: Arc<P>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            projects,
            users,
            clock,
            policy: AuthorizationPolicy,
            cascade_timeout: DEFAULT_CASCADE_TIMEOUT,
        }
    }

    /// Sets the upper bound of a cancellation cascade.
    #[must_use]
    pub const fn with_cascade_timeout(mut self, cascade_timeout: Duration) -> Self {
        self.cascade_timeout = cascade_timeout;
        self
    }

    async fn current_actor(&self, identity: &Identity) -> ProjectLifecycleResult<Identity> {
        Ok(resolve_actor(&*self.users, identity).await?)
    }

    async fn find_project_or_error(
        &self,
        project_id: ProjectId,
    ) -> ProjectLifecycleResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .filter(Project::is_active)
            .ok_or(ProjectLifecycleError::ProjectNotFound(project_id))
    }

    async fn ensure_manager_exists(&self, manager_id: UserId) -> ProjectLifecycleResult<()> {
        self.users
            .find_by_id(manager_id)
            .await?
            .filter(User::is_active)
            .map(|_| ())
            .ok_or(ProjectLifecycleError::ManagerNotFound(manager_id))
    }

    /// Creates a project in [`ProjectStatus::Planned`].
    ///
    /// A manager always becomes the manager of the projects they create.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLifecycleError::PermissionDenied`] for
    /// collaborators, domain errors for missing fields or an expected end
    /// before the start, [`ProjectLifecycleError::ManagerNotFound`], and
    /// repository errors.
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateProjectRequest,
    ) -> ProjectLifecycleResult<Project> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::CreateProject, None)?;
        let manager_id = if actor.is_manager() {
            actor.user_id()
        } else {
            request.manager_id
        };
        let details = project_details(
            request.name,
            request.description,
            request.start,
            request.expected_end,
            manager_id,
        )?;
        self.ensure_manager_exists(manager_id).await?;

        let project = Project::new(details, &*self.clock);
        self.projects.store(&project).await?;
        tracing::info!(
            actor = %actor.user_id(),
            project_id = %project.id(),
            manager_id = %manager_id,
            "project created"
        );
        Ok(project)
    }

    /// Edits a project's fields and status.
    ///
    /// Tasks are not touched. Entering [`ProjectStatus::Completed`] records
    /// today's date as the actual end; other statuses clear it.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLifecycleError::ProjectNotFound`],
    /// [`ProjectLifecycleError::PermissionDenied`] unless the actor is an
    /// administrator or the project's manager,
    /// [`ProjectLifecycleError::ManagerReassignment`] when a manager changes
    /// the manager, domain errors for invalid fields, a cancellation
    /// request, or a cancelled project, and repository errors.
    pub async fn update(
        &self,
        identity: &Identity,
        project_id: ProjectId,
        request: UpdateProjectRequest,
    ) -> ProjectLifecycleResult<Project> {
        let actor = &self.current_actor(identity).await?;
        let mut project = self.find_project_or_error(project_id).await?;
        self.policy
            .ensure(actor, Action::EditProject, Some(project.manager_id()))?;
        let manager_changed = request.manager_id != project.manager_id();
        if manager_changed && !actor.is_administrator() {
            return Err(ProjectLifecycleError::ManagerReassignment);
        }
        let status = request.status;
        let details = project_details(
            request.name,
            request.description,
            request.start,
            request.expected_end,
            request.manager_id,
        )?;
        if manager_changed {
            self.ensure_manager_exists(details.manager_id).await?;
        }

        project.apply_update(details, status, &*self.clock)?;
        self.projects.update(&project).await?;
        tracing::info!(
            actor = %actor.user_id(),
            project_id = %project_id,
            status = %status,
            "project updated"
        );
        Ok(project)
    }

    /// Cancels a project and deactivates its unfinished tasks atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLifecycleError::ProjectNotFound`],
    /// [`ProjectLifecycleError::PermissionDenied`] unless the actor is an
    /// administrator or the project's manager, a validation error when the
    /// project is already completed or cancelled (including when a
    /// concurrent cancellation won), and storage errors when the unit of
    /// work fails or times out. Nothing is written on error.
    pub async fn cancel(
        &self,
        identity: &Identity,
        project_id: ProjectId,
    ) -> ProjectLifecycleResult<CascadeOutcome> {
        let actor = &self.current_actor(identity).await?;
        let project = self.find_project_or_error(project_id).await?;
        self.policy
            .ensure(actor, Action::CancelProject, Some(project.manager_id()))?;
        project.ensure_cancellable()?;

        let outcome = self
            .projects
            .cancel_with_cascade(project_id, self.clock.utc(), self.cascade_timeout)
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    project_id = %project_id,
                    error = %err,
                    "project cancellation failed"
                );
            })?;
        tracing::info!(
            actor = %actor.user_id(),
            project_id = %project_id,
            deactivated_tasks = outcome.deactivated_tasks.len(),
            "project cancelled"
        );
        Ok(outcome)
    }

    /// Lists the active projects selected by `filter`, ordered by name.
    ///
    /// [`ProjectFilter::managed_by`] gives a manager's own projects.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLifecycleError::PermissionDenied`] for collaborators
    /// and repository errors.
    pub async fn list(
        &self,
        identity: &Identity,
        filter: ProjectFilter,
    ) -> ProjectLifecycleResult<Vec<Project>> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ViewProjects, None)?;
        let projects = self.projects.list_active(&filter).await?;
        tracing::debug!(
            count = projects.len(),
            manager_id = ?filter.manager_id,
            "listed projects"
        );
        Ok(projects)
    }

    /// Returns one active project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLifecycleError::PermissionDenied`] for collaborators,
    /// [`ProjectLifecycleError::ProjectNotFound`], and repository errors.
    pub async fn find(
        &self,
        identity: &Identity,
        project_id: ProjectId,
    ) -> ProjectLifecycleResult<Project> {
        let actor = &self.current_actor(identity).await?;
        self.policy.ensure(actor, Action::ViewProjects, None)?;
        self.find_project_or_error(project_id).await
    }
}
