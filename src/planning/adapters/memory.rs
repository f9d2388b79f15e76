//! In-memory planning store.

use crate::planning::{
    domain::{PlanningDomainError, Project, ProjectId, ProjectStatus, Task, TaskId},
    ports::{
        CascadeOutcome, PlanningRepositoryError, PlanningRepositoryResult, ProjectFilter,
        ProjectRepository, TaskFilter, TaskRepository,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct PlanningState {
    projects: HashMap<ProjectId, Project>,
    tasks: HashMap<TaskId, Task>,
}

impl PlanningState {
    /// Refuses unfinished work for a project that is gone or cancelled.
    fn ensure_open(&self, project_id: ProjectId) -> PlanningRepositoryResult<()> {
        let project = self
            .projects
            .get(&project_id)
            .filter(|project| project.is_active())
            .ok_or(PlanningRepositoryError::ProjectNotFound(project_id))?;
        if project.status() == ProjectStatus::Cancelled {
            return Err(PlanningRepositoryError::AlreadyTerminal {
                project_id,
                status: project.status(),
            });
        }
        Ok(())
    }
}

/// Thread-safe in-memory store for projects and tasks.
///
/// Projects and tasks share one lock, so a cancellation cascade holds the
/// write lock for its whole unit of work and concurrent cancellations are
/// serialized. Updates re-check the stored rows under the same lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanningStore {
    state: Arc<RwLock<PlanningState>>,
}

impl InMemoryPlanningStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PlanningRepositoryResult<RwLockReadGuard<'_, PlanningState>> {
        self.state.read().map_err(|err| {
            PlanningRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> PlanningRepositoryResult<RwLockWriteGuard<'_, PlanningState>> {
        self.state.write().map_err(|err| {
            PlanningRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ProjectRepository for InMemoryPlanningStore {
    async fn store(&self, project: &Project) -> PlanningRepositoryResult<()> {
        let mut state = self.write()?;
        if state.projects.contains_key(&project.id()) {
            return Err(PlanningRepositoryError::DuplicateProject(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> PlanningRepositoryResult<()> {
        let project_id = project.id();
        let mut state = self.write()?;
        state.ensure_open(project_id)?;
        state.projects.insert(project_id, project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> PlanningRepositoryResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn list_active(&self, filter: &ProjectFilter) -> PlanningRepositoryResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .read()?
            .projects
            .values()
            .filter(|project| filter.matches(project))
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(projects)
    }

    async fn cancel_with_cascade(
        &self,
        project_id: ProjectId,
        cancelled_at: DateTime<Utc>,
        _timeout: Duration,
    ) -> PlanningRepositoryResult<CascadeOutcome> {
        let mut state = self.write()?;
        let mut project = state
            .projects
            .get(&project_id)
            .cloned()
            .ok_or(PlanningRepositoryError::ProjectNotFound(project_id))?;
        project.cancel_at(cancelled_at).map_err(|err| match err {
            PlanningDomainError::AlreadyTerminal { status, .. } => {
                PlanningRepositoryError::AlreadyTerminal { project_id, status }
            }
            other => PlanningRepositoryError::invalid_persisted_data(other),
        })?;

        let mut deactivated: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| {
                task.project_id() == project_id && task.is_active() && !task.status().is_terminal()
            })
            .cloned()
            .collect();
        for task in &mut deactivated {
            task.deactivate_at(cancelled_at);
        }

        let deactivated_tasks = deactivated.iter().map(Task::id).collect();
        state.projects.insert(project_id, project.clone());
        state
            .tasks
            .extend(deactivated.into_iter().map(|task| (task.id(), task)));
        Ok(CascadeOutcome {
            project,
            deactivated_tasks,
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryPlanningStore {
    async fn store(&self, task: &Task) -> PlanningRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(PlanningRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> PlanningRepositoryResult<()> {
        let task_id = task.id();
        let mut state = self.write()?;
        if task.is_active() && !task.status().is_terminal() {
            state.ensure_open(task.project_id())?;
        }
        let slot = state
            .tasks
            .get_mut(&task_id)
            .filter(|stored| stored.is_active())
            .ok_or(PlanningRepositoryError::TaskNotFound(task_id))?;
        *slot = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> PlanningRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list(&self, filter: &TaskFilter) -> PlanningRepositoryResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.title().as_str().cmp(b.title().as_str()));
        Ok(tasks)
    }
}
