//! Shared world state for project lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use projectdesk::{
    config::DeskConfig,
    desk::InMemoryDesk,
    identity::{
        adapters::{ConfiguredCredentials, memory::InMemoryUserRepository},
        domain::{Identity, Role},
        services::CreateUserRequest,
    },
    planning::{
        adapters::memory::InMemoryPlanningStore,
        domain::{Project, Task},
        ports::CascadeOutcome,
        services::ProjectLifecycleError,
    },
};
use rstest::fixture;

/// Password shared by every scenario account.
pub const SECRET: &str = "secret1";

/// Scenario world for project lifecycle behaviour tests.
pub struct ProjectWorld {
    pub desk: InMemoryDesk,
    pub store: Arc<InMemoryPlanningStore>,
    pub admin: Option<Identity>,
    pub people: HashMap<String, Identity>,
    pub projects: HashMap<String, Project>,
    pub tasks: HashMap<String, Task>,
    pub last_cancellation: Option<Result<CascadeOutcome, ProjectLifecycleError>>,
    pub last_creation: Option<Result<Project, ProjectLifecycleError>>,
}

impl ProjectWorld {
    /// Creates a world over empty in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let config = DeskConfig::default();
        let store = Arc::new(InMemoryPlanningStore::new());
        let desk = InMemoryDesk::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&store),
            Arc::new(ConfiguredCredentials::from(config.credential_scheme)),
            Arc::new(DefaultClock),
            &config,
        );

        Self {
            desk,
            store,
            admin: None,
            people: HashMap::new(),
            projects: HashMap::new(),
            tasks: HashMap::new(),
            last_cancellation: None,
            last_creation: None,
        }
    }

    /// Returns the bootstrapped administrator.
    pub fn admin(&self) -> Result<&Identity, eyre::Report> {
        self.admin
            .as_ref()
            .ok_or_else(|| eyre::eyre!("scenario has no administrator"))
    }

    /// Returns a previously created person by login.
    pub fn person(&self, login: &str) -> Result<&Identity, eyre::Report> {
        self.people
            .get(login)
            .ok_or_else(|| eyre::eyre!("unknown person '{login}'"))
    }

    /// Returns a previously created project by name.
    pub fn project(&self, name: &str) -> Result<&Project, eyre::Report> {
        self.projects
            .get(name)
            .ok_or_else(|| eyre::eyre!("unknown project '{name}'"))
    }

    /// Returns a previously created task by title.
    pub fn task(&self, title: &str) -> Result<&Task, eyre::Report> {
        self.tasks
            .get(title)
            .ok_or_else(|| eyre::eyre!("unknown task '{title}'"))
    }

    /// Creates an account unless one with the login already exists.
    pub fn ensure_person(&mut self, login: &str, role: Role) -> Result<Identity, eyre::Report> {
        if let Some(existing) = self.people.get(login) {
            return Ok(existing.clone());
        }
        let admin = self.admin()?.clone();
        let request = CreateUserRequest::new(
            format!("Person {login}"),
            format!("{login}@example.com"),
            login,
            SECRET,
            role,
        );
        let identity = run_async(self.desk.create_user(&admin, request))?.identity();
        self.people.insert(login.to_owned(), identity.clone());
        Ok(identity)
    }
}

impl Default for ProjectWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ProjectWorld {
    ProjectWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
