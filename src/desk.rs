//! The in-process contract presentation code talks to.
//!
//! [`Desk`] bundles the identity and planning services over one user
//! repository and one planning store. Every operation takes the acting
//! [`Identity`] explicitly; the desk itself holds no session state. Only the
//! identity's user ID is trusted: each call re-reads that user and acts
//! with their current role.

use std::sync::Arc;

use crate::config::DeskConfig;
use crate::identity::{
    adapters::{
        ConfiguredCredentials, memory::InMemoryUserRepository, postgres::PostgresUserRepository,
    },
    domain::{Identity, IdentityContext, Role, User, UserId},
    ports::{CredentialVerifier, UserRepository},
    services::{
        AuthenticationResult, AuthenticationService, ChangePasswordRequest, CreateUserRequest,
        UpdateUserRequest, UserAdministrationResult, UserAdministrationService,
    },
};
use crate::planning::{
    adapters::{memory::InMemoryPlanningStore, postgres::PostgresPlanningStore},
    domain::{Project, ProjectId, ProjectSummary, Task, TaskId, TaskStatus, UserWorkload},
    ports::{CascadeOutcome, ProjectFilter, ProjectRepository, TaskFilter, TaskRepository},
    services::{
        CreateProjectRequest, CreateTaskRequest, ProjectLifecycleResult, ProjectLifecycleService,
        ReportingResult, ReportingService, TaskLifecycleResult, TaskLifecycleService,
        UpdateProjectRequest, UpdateTaskRequest,
    },
};
use crate::storage::{StorageSetupError, connect_pool};
use mockable::{Clock, DefaultClock};

/// Desk backed by the in-memory adapters.
pub type InMemoryDesk =
    Desk<InMemoryUserRepository, InMemoryPlanningStore, ConfiguredCredentials, DefaultClock>;

/// Desk backed by the `PostgreSQL` adapters.
pub type PostgresDesk =
    Desk<PostgresUserRepository, PostgresPlanningStore, ConfiguredCredentials, DefaultClock>;

/// Facade over authentication, user administration, project and task
/// lifecycles, and reporting.
#[derive(Clone)]
pub struct Desk<U, S, V, C>
where
    U: UserRepository,
    S: ProjectRepository + TaskRepository,
    V: CredentialVerifier,
    C: Clock + Send + Sync,
{
    authentication: AuthenticationService<U, V, C>,
    administration: UserAdministrationService<U, V, C>,
    projects: ProjectLifecycleService<S, U, C>,
    tasks: TaskLifecycleService<S, S, U, C>,
    reports: ReportingService<S, S, U>,
}

impl InMemoryDesk {
    /// Builds a desk over fresh in-memory stores.
    ///
    /// The credential scheme and cascade timeout come from `config`.
    #[must_use]
    pub fn in_memory(config: &DeskConfig) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPlanningStore::new()),
            Arc::new(ConfiguredCredentials::from(config.credential_scheme)),
            Arc::new(DefaultClock),
            config,
        )
    }
}

impl PostgresDesk {
    /// Builds a desk over a new connection pool for `config.database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageSetupError`] when no URL is configured or the pool
    /// cannot be built.
    pub fn connect(config: &DeskConfig) -> Result<Self, StorageSetupError> {
        let pool = connect_pool(config)?;
        Ok(Self::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresPlanningStore::new(pool)),
            Arc::new(ConfiguredCredentials::from(config.credential_scheme)),
            Arc::new(DefaultClock),
            config,
        ))
    }
}

impl<U, S, V, C> Desk<U, S, V, C>
where
    U: UserRepository,
    S: ProjectRepository + TaskRepository,
    V: CredentialVerifier,
    C: Clock + Send + Sync,
{
    /// Wires every service over the given repositories.
    #[must_use]
    pub fn new(
        users: Arc<U>,
        store: Arc<S>,
        verifier: Arc<V>,
        clock: Arc<C>,
        config: &DeskConfig,
    ) -> Self {
        Self {
            authentication: AuthenticationService::new(
                Arc::clone(&users),
                Arc::clone(&verifier),
                Arc::clone(&clock),
            ),
            administration: UserAdministrationService::new(
                Arc::clone(&users),
                verifier,
                Arc::clone(&clock),
            ),
            projects: ProjectLifecycleService::new(
                Arc::clone(&store),
                Arc::clone(&users),
                Arc::clone(&clock),
            )
            .with_cascade_timeout(config.cascade_timeout),
            tasks: TaskLifecycleService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&users),
                clock,
            ),
            reports: ReportingService::new(Arc::clone(&store), store, users),
        }
    }

    /// Resolves credentials to an identity.
    ///
    /// # Errors
    ///
    /// See [`AuthenticationService::authenticate`].
    pub async fn authenticate(&self, login: &str, secret: &str) -> AuthenticationResult<Identity> {
        self.authentication.authenticate(login, secret).await
    }

    /// Authenticates and records the identity in `context`.
    ///
    /// # Errors
    ///
    /// See [`AuthenticationService::sign_in`].
    pub async fn sign_in(
        &self,
        context: &mut IdentityContext,
        login: &str,
        secret: &str,
    ) -> AuthenticationResult<Identity> {
        self.authentication.sign_in(context, login, secret).await
    }

    /// Replaces the actor's own password.
    ///
    /// # Errors
    ///
    /// See [`AuthenticationService::change_password`].
    pub async fn change_password(
        &self,
        actor: &Identity,
        request: ChangePasswordRequest,
    ) -> AuthenticationResult<User> {
        self.authentication.change_password(actor, request).await
    }

    /// Creates the first administrator of an empty user directory.
    ///
    /// # Errors
    ///
    /// See [`UserAdministrationService::bootstrap_administrator`].
    pub async fn bootstrap_administrator(
        &self,
        request: CreateUserRequest,
    ) -> UserAdministrationResult<User> {
        self.administration.bootstrap_administrator(request).await
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// See [`UserAdministrationService::create_user`].
    pub async fn create_user(
        &self,
        actor: &Identity,
        request: CreateUserRequest,
    ) -> UserAdministrationResult<User> {
        self.administration.create_user(actor, request).await
    }

    /// Edits a user.
    ///
    /// # Errors
    ///
    /// See [`UserAdministrationService::update_user`].
    pub async fn update_user(
        &self,
        actor: &Identity,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> UserAdministrationResult<User> {
        self.administration
            .update_user(actor, user_id, request)
            .await
    }

    /// Deactivates a user.
    ///
    /// # Errors
    ///
    /// See [`UserAdministrationService::deactivate_user`].
    pub async fn deactivate_user(
        &self,
        actor: &Identity,
        user_id: UserId,
    ) -> UserAdministrationResult<User> {
        self.administration.deactivate_user(actor, user_id).await
    }

    /// Lists active users.
    ///
    /// # Errors
    ///
    /// See [`UserAdministrationService::list_users`].
    pub async fn list_users(&self, actor: &Identity) -> UserAdministrationResult<Vec<User>> {
        self.administration.list_users(actor).await
    }

    /// Lists active users holding `role`.
    ///
    /// # Errors
    ///
    /// See [`UserAdministrationService::list_users_by_role`].
    pub async fn list_users_by_role(
        &self,
        actor: &Identity,
        role: Role,
    ) -> UserAdministrationResult<Vec<User>> {
        self.administration.list_users_by_role(actor, role).await
    }

    /// Lists the active projects selected by `filter`.
    ///
    /// # Errors
    ///
    /// See [`ProjectLifecycleService::list`].
    pub async fn list_projects(
        &self,
        actor: &Identity,
        filter: ProjectFilter,
    ) -> ProjectLifecycleResult<Vec<Project>> {
        self.projects.list(actor, filter).await
    }

    /// Returns one active project.
    ///
    /// # Errors
    ///
    /// See [`ProjectLifecycleService::find`].
    pub async fn find_project(
        &self,
        actor: &Identity,
        project_id: ProjectId,
    ) -> ProjectLifecycleResult<Project> {
        self.projects.find(actor, project_id).await
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// See [`ProjectLifecycleService::create`].
    pub async fn create_project(
        &self,
        actor: &Identity,
        request: CreateProjectRequest,
    ) -> ProjectLifecycleResult<Project> {
        self.projects.create(actor, request).await
    }

    /// Edits a project.
    ///
    /// # Errors
    ///
    /// See [`ProjectLifecycleService::update`].
    pub async fn update_project(
        &self,
        actor: &Identity,
        project_id: ProjectId,
        request: UpdateProjectRequest,
    ) -> ProjectLifecycleResult<Project> {
        self.projects.update(actor, project_id, request).await
    }

    /// Cancels a project and deactivates its unfinished tasks.
    ///
    /// # Errors
    ///
    /// See [`ProjectLifecycleService::cancel`].
    pub async fn cancel_project(
        &self,
        actor: &Identity,
        project_id: ProjectId,
    ) -> ProjectLifecycleResult<CascadeOutcome> {
        self.projects.cancel(actor, project_id).await
    }

    /// Lists active tasks visible to the actor.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleService::list`].
    pub async fn list_tasks(
        &self,
        actor: &Identity,
        filter: TaskFilter,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.tasks.list(actor, filter).await
    }

    /// Returns one active task.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleService::find`].
    pub async fn find_task(&self, actor: &Identity, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks.find(actor, task_id).await
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleService::create`].
    pub async fn create_task(
        &self,
        actor: &Identity,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        self.tasks.create(actor, request).await
    }

    /// Edits a task.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleService::update`].
    pub async fn update_task(
        &self,
        actor: &Identity,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        self.tasks.update(actor, task_id, request).await
    }

    /// Sets a task's status.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleService::update_status`].
    pub async fn update_task_status(
        &self,
        actor: &Identity,
        task_id: TaskId,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        self.tasks.update_status(actor, task_id, status).await
    }

    /// Deactivates a task.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleService::deactivate`].
    pub async fn deactivate_task(
        &self,
        actor: &Identity,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        self.tasks.deactivate(actor, task_id).await
    }

    /// Returns completion figures per active project.
    ///
    /// # Errors
    ///
    /// See [`ReportingService::project_summaries`].
    pub async fn project_summaries(
        &self,
        actor: &Identity,
    ) -> ReportingResult<Vec<ProjectSummary>> {
        self.reports.project_summaries(actor).await
    }

    /// Returns task counts per active user.
    ///
    /// # Errors
    ///
    /// See [`ReportingService::task_workload`].
    pub async fn task_workload(&self, actor: &Identity) -> ReportingResult<Vec<UserWorkload>> {
        self.reports.task_workload(actor).await
    }
}
