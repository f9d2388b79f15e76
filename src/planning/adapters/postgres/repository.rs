//! `PostgreSQL` repository implementation for projects and tasks.

use super::{
    models::{ProjectRecord, ProjectRow, TaskRecord, TaskRow},
    schema::{projects, tasks},
};
use crate::identity::domain::UserId;
use crate::planning::{
    domain::{
        Description, PersistedProjectData, PersistedTaskData, PlanningDomainError, Project,
        ProjectDetails, ProjectId, ProjectName, ProjectStatus, Schedule, Task, TaskDetails,
        TaskId, TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{
        CascadeOutcome, PlanningRepositoryError, PlanningRepositoryResult, ProjectFilter,
        ProjectRepository, TaskFilter, TaskRepository,
    },
};
use crate::storage::{PgPool, get_conn_with, get_conn_within, run_blocking_with};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::{Duration, Instant};

impl From<DieselError> for PlanningRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed store for projects and tasks.
///
/// Cancellation runs in one transaction that locks the project row with
/// `SELECT ... FOR UPDATE`. Its timeout is a budget for the whole unit of
/// work: the pool checkout waits at most that long, and before each
/// statement `SET LOCAL statement_timeout` is lowered to what is left.
///
/// Task updates take a share lock on the parent project row, so they queue
/// behind a running cancellation and then see its result.
#[derive(Debug, Clone)]
pub struct PostgresPlanningStore {
    pool: PgPool,
}

impl PostgresPlanningStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> PlanningRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PlanningRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, PlanningRepositoryError::persistence)?;
                operation(&mut connection)
            },
            PlanningRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl ProjectRepository for PostgresPlanningStore {
    async fn store(&self, project: &Project) -> PlanningRepositoryResult<()> {
        let record = to_project_record(project);
        let project_id = project.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&record)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PlanningRepositoryError::DuplicateProject(project_id)
                    }
                    other => PlanningRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, project: &Project) -> PlanningRepositoryResult<()> {
        let record = to_project_record(project);
        let project_id = project.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                projects::table
                    .filter(projects::id.eq(project_id.into_inner()))
                    .filter(projects::active.eq(true))
                    .filter(projects::status.ne(ProjectStatus::Cancelled.as_str())),
            )
            .set(&record)
            .execute(connection)?;
            if updated == 0 {
                return Err(refusal_for(connection, project_id)?);
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> PlanningRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_active(&self, filter: &ProjectFilter) -> PlanningRepositoryResult<Vec<Project>> {
        let selection = *filter;
        self.run_blocking(move |connection| {
            let mut query = projects::table
                .filter(projects::active.eq(true))
                .select(ProjectRow::as_select())
                .into_boxed();
            if let Some(manager_id) = selection.manager_id {
                query = query.filter(projects::manager_id.eq(manager_id.into_inner()));
            }
            let rows = query
                .order(projects::name.asc())
                .load::<ProjectRow>(connection)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn cancel_with_cascade(
        &self,
        project_id: ProjectId,
        cancelled_at: DateTime<Utc>,
        timeout: Duration,
    ) -> PlanningRepositoryResult<CascadeOutcome> {
        let budget = Budget::starting_now(timeout);
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_within(
                    &pool,
                    budget.remaining(),
                    PlanningRepositoryError::persistence,
                )?;
                connection.transaction::<_, PlanningRepositoryError, _>(|tx| {
                    cancel_in_transaction(tx, project_id, cancelled_at, &budget)
                })
            },
            PlanningRepositoryError::persistence,
        )
        .await
    }
}

/// Time left for one cancellation, shared by its checkout and statements.
#[derive(Debug, Clone, Copy)]
struct Budget {
    started: Instant,
    limit: Duration,
}

impl Budget {
    fn starting_now(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    /// Caps the next statement at the remaining budget.
    fn arm(&self, tx: &mut PgConnection) -> PlanningRepositoryResult<()> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(PlanningRepositoryError::persistence(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "cancellation ran out of time",
            )));
        }
        diesel::sql_query(format!(
            "SET LOCAL statement_timeout = {}",
            remaining.as_millis().max(1)
        ))
        .execute(tx)?;
        Ok(())
    }
}

/// Explains why a conditional project write matched no row.
fn refusal_for(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> PlanningRepositoryResult<PlanningRepositoryError> {
    let stored = projects::table
        .filter(projects::id.eq(project_id.into_inner()))
        .select((projects::active, projects::status))
        .first::<(bool, String)>(connection)
        .optional()?;
    match stored {
        Some((true, status)) => Ok(PlanningRepositoryError::AlreadyTerminal {
            project_id,
            status: ProjectStatus::try_from(status.as_str())
                .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        }),
        _ => Ok(PlanningRepositoryError::ProjectNotFound(project_id)),
    }
}

/// Share-locks the parent project and refuses it when gone or cancelled.
fn lock_open_project(
    tx: &mut PgConnection,
    project_id: ProjectId,
) -> PlanningRepositoryResult<()> {
    let stored = projects::table
        .filter(projects::id.eq(project_id.into_inner()))
        .filter(projects::active.eq(true))
        .select(projects::status)
        .for_share()
        .first::<String>(tx)
        .optional()?
        .ok_or(PlanningRepositoryError::ProjectNotFound(project_id))?;
    let status = ProjectStatus::try_from(stored.as_str())
        .map_err(PlanningRepositoryError::invalid_persisted_data)?;
    if status == ProjectStatus::Cancelled {
        return Err(PlanningRepositoryError::AlreadyTerminal { project_id, status });
    }
    Ok(())
}

fn cancel_in_transaction(
    tx: &mut PgConnection,
    project_id: ProjectId,
    cancelled_at: DateTime<Utc>,
    budget: &Budget,
) -> PlanningRepositoryResult<CascadeOutcome> {
    budget.arm(tx)?;
    let row = projects::table
        .filter(projects::id.eq(project_id.into_inner()))
        .select(ProjectRow::as_select())
        .for_update()
        .first::<ProjectRow>(tx)
        .optional()?
        .ok_or(PlanningRepositoryError::ProjectNotFound(project_id))?;
    let mut project = row_to_project(row)?;
    project.cancel_at(cancelled_at).map_err(|err| match err {
        PlanningDomainError::AlreadyTerminal { status, .. } => {
            PlanningRepositoryError::AlreadyTerminal { project_id, status }
        }
        other => PlanningRepositoryError::invalid_persisted_data(other),
    })?;

    budget.arm(tx)?;
    diesel::update(projects::table.filter(projects::id.eq(project_id.into_inner())))
        .set((
            projects::status.eq(project.status().as_str()),
            projects::updated_at.eq(cancelled_at),
        ))
        .execute(tx)?;

    budget.arm(tx)?;
    let terminal = vec![TaskStatus::Completed.as_str(), TaskStatus::Cancelled.as_str()];
    let deactivated = diesel::update(
        tasks::table
            .filter(tasks::project_id.eq(project_id.into_inner()))
            .filter(tasks::active.eq(true))
            .filter(tasks::status.ne_all(terminal)),
    )
    .set((tasks::active.eq(false), tasks::updated_at.eq(cancelled_at)))
    .returning(tasks::id)
    .get_results::<uuid::Uuid>(tx)?;

    Ok(CascadeOutcome {
        project,
        deactivated_tasks: deactivated.into_iter().map(TaskId::from_uuid).collect(),
    })
}

#[async_trait]
impl TaskRepository for PostgresPlanningStore {
    async fn store(&self, task: &Task) -> PlanningRepositoryResult<()> {
        let record = to_task_record(task);
        let task_id = task.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&record)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PlanningRepositoryError::DuplicateTask(task_id)
                    }
                    other => PlanningRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> PlanningRepositoryResult<()> {
        let record = to_task_record(task);
        let task_id = task.id();
        let project_id = task.project_id();
        let needs_open_project = task.is_active() && !task.status().is_terminal();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PlanningRepositoryError, _>(|tx| {
                if needs_open_project {
                    lock_open_project(tx, project_id)?;
                }
                let updated = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .filter(tasks::active.eq(true)),
                )
                .set(&record)
                .execute(tx)?;
                if updated == 0 {
                    return Err(PlanningRepositoryError::TaskNotFound(task_id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> PlanningRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(&self, filter: &TaskFilter) -> PlanningRepositoryResult<Vec<Task>> {
        let selection = *filter;
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::active.eq(true))
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(project_id) = selection.project_id {
                query = query.filter(tasks::project_id.eq(project_id.into_inner()));
            }
            if let Some(assignee_id) = selection.assignee_id {
                query = query.filter(tasks::assignee_id.eq(assignee_id.into_inner()));
            }
            let rows = query.order(tasks::title.asc()).load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn to_project_record(project: &Project) -> ProjectRecord {
    let details = project.details();
    ProjectRecord {
        id: project.id().into_inner(),
        name: details.name.as_str().to_owned(),
        description: details.description.as_str().to_owned(),
        start_date: details.schedule.start(),
        expected_end: details.schedule.expected_end(),
        actual_end: project.actual_end(),
        status: project.status().as_str().to_owned(),
        manager_id: details.manager_id.into_inner(),
        active: project.is_active(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn to_task_record(task: &Task) -> TaskRecord {
    let details = task.details();
    TaskRecord {
        id: task.id().into_inner(),
        title: details.title.as_str().to_owned(),
        description: details.description.as_str().to_owned(),
        project_id: details.project_id.into_inner(),
        assignee_id: details.assignee_id.into_inner(),
        status: task.status().as_str().to_owned(),
        priority: details.priority.as_str().to_owned(),
        expected_completion: details.expected_completion,
        completed_on: task.completed_on(),
        active: task.is_active(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> PlanningRepositoryResult<Project> {
    let details = ProjectDetails {
        name: ProjectName::new(row.name)
            .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        description: Description::new(row.description)
            .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        schedule: Schedule::new(row.start_date, row.expected_end)
            .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        manager_id: UserId::from_uuid(row.manager_id),
    };
    let status = ProjectStatus::try_from(row.status.as_str())
        .map_err(PlanningRepositoryError::invalid_persisted_data)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        details,
        status,
        actual_end: row.actual_end,
        active: row.active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_task(row: TaskRow) -> PlanningRepositoryResult<Task> {
    let details = TaskDetails {
        title: TaskTitle::new(row.title)
            .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        description: Description::new(row.description)
            .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        project_id: ProjectId::from_uuid(row.project_id),
        assignee_id: UserId::from_uuid(row.assignee_id),
        priority: TaskPriority::try_from(row.priority.as_str())
            .map_err(PlanningRepositoryError::invalid_persisted_data)?,
        expected_completion: row.expected_completion,
    };
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(PlanningRepositoryError::invalid_persisted_data)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        details,
        status,
        completed_on: row.completed_on,
        active: row.active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
