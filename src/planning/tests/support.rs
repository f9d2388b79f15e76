//! Shared fixtures for planning service tests.

use std::sync::Arc;

use crate::identity::{
    adapters::memory::InMemoryUserRepository,
    domain::{CredentialSecret, EmailAddress, Identity, Login, PersonName, Role, User, UserProfile},
    ports::UserRepository,
};
use crate::planning::{
    adapters::memory::InMemoryPlanningStore,
    domain::{Project, Task},
    services::{
        CreateProjectRequest, CreateTaskRequest, ProjectLifecycleService, ReportingService,
        TaskLifecycleService,
    },
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::fixture;

pub(super) type Projects =
    ProjectLifecycleService<InMemoryPlanningStore, InMemoryUserRepository, DefaultClock>;
pub(super) type Tasks = TaskLifecycleService<
    InMemoryPlanningStore,
    InMemoryPlanningStore,
    InMemoryUserRepository,
    DefaultClock,
>;
pub(super) type Reports =
    ReportingService<InMemoryPlanningStore, InMemoryPlanningStore, InMemoryUserRepository>;

pub(super) struct Harness {
    pub store: Arc<InMemoryPlanningStore>,
    pub users: Arc<InMemoryUserRepository>,
    pub projects: Projects,
    pub tasks: Tasks,
    pub reports: Reports,
}

#[fixture]
pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryPlanningStore::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);
    Harness {
        projects: ProjectLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&users),
            Arc::clone(&clock),
        ),
        tasks: TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&users),
            clock,
        ),
        reports: ReportingService::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&users)),
        store,
        users,
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

pub(super) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

impl Harness {
    /// Stores an active user and returns its identity.
    pub async fn user(&self, login: &str, role: Role) -> Identity {
        let profile = UserProfile {
            name: PersonName::new(format!("Person {login}")).expect("valid name"),
            email: EmailAddress::new(format!("{login}@example.com")).expect("valid email"),
            login: Login::new(login).expect("valid login"),
            role,
        };
        let user = User::new(profile, CredentialSecret::new("secret1"), &DefaultClock);
        self.users.store(&user).await.expect("seed user");
        user.identity()
    }

    /// Rewrites a stored user's role, as an administrator edit would.
    pub async fn change_role(&self, identity: &Identity, role: Role) {
        let mut user = self.stored_user(identity).await;
        let profile = UserProfile {
            role,
            ..user.profile().clone()
        };
        user.update_profile(profile, &DefaultClock);
        self.users.update(&user).await.expect("store role change");
    }

    /// Marks a stored user inactive.
    pub async fn deactivate_account(&self, identity: &Identity) {
        let mut user = self.stored_user(identity).await;
        user.deactivate(&DefaultClock);
        self.users.update(&user).await.expect("store deactivation");
    }

    async fn stored_user(&self, identity: &Identity) -> User {
        self.users
            .find_by_id(identity.user_id())
            .await
            .expect("read user")
            .expect("user stored")
    }

    /// Creates a planned project managed by `manager`.
    pub async fn project(&self, actor: &Identity, name: &str, manager: &Identity) -> Project {
        self.projects
            .create(
                actor,
                CreateProjectRequest::new(
                    name,
                    format!("{name} description"),
                    date(2025, 1, 1),
                    date(2025, 6, 30),
                    manager.user_id(),
                ),
            )
            .await
            .expect("project creation should succeed")
    }

    /// Creates a pending task in `project` assigned to `assignee`.
    pub async fn task(
        &self,
        actor: &Identity,
        project: &Project,
        title: &str,
        assignee: &Identity,
    ) -> Task {
        self.tasks
            .create(
                actor,
                CreateTaskRequest::new(
                    title,
                    format!("{title} description"),
                    project.id(),
                    assignee.user_id(),
                ),
            )
            .await
            .expect("task creation should succeed")
    }
}
