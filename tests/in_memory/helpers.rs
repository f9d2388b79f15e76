//! Shared fixtures for in-memory desk integration tests.

use chrono::NaiveDate;
use projectdesk::{
    config::DeskConfig,
    desk::InMemoryDesk,
    identity::{
        domain::{Identity, Role},
        services::CreateUserRequest,
    },
    planning::{
        domain::{Project, Task},
        services::{CreateProjectRequest, CreateTaskRequest},
    },
};
use rstest::fixture;

/// Password every seeded account starts with.
pub const SECRET: &str = "secret1";

/// A desk with a bootstrapped administrator.
pub struct Office {
    pub desk: InMemoryDesk,
    pub admin: Identity,
}

/// Provides a fresh office for each test.
#[fixture]
pub async fn office() -> Office {
    let desk = InMemoryDesk::in_memory(&DeskConfig::default());
    let admin = desk
        .bootstrap_administrator(account("root", Role::Administrator))
        .await
        .expect("bootstrap administrator")
        .identity();
    Office { desk, admin }
}

/// Builds a user creation request with predictable fields.
pub fn account(login: &str, role: Role) -> CreateUserRequest {
    CreateUserRequest::new(
        format!("Person {login}"),
        format!("{login}@example.com"),
        login,
        SECRET,
        role,
    )
}

/// Builds a calendar date, failing the test on invalid input.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

impl Office {
    /// Creates a user and returns their identity.
    pub async fn member(&self, login: &str, role: Role) -> Identity {
        self.desk
            .create_user(&self.admin, account(login, role))
            .await
            .expect("user creation should succeed")
            .identity()
    }

    /// Creates a project managed by `manager`.
    pub async fn project(&self, manager: &Identity, name: &str) -> Project {
        self.desk
            .create_project(
                manager,
                CreateProjectRequest::new(
                    name,
                    "Integration project",
                    date(2025, 2, 1),
                    date(2025, 8, 31),
                    manager.user_id(),
                ),
            )
            .await
            .expect("project creation should succeed")
    }

    /// Creates a task in `project` assigned to `assignee`.
    pub async fn task(
        &self,
        manager: &Identity,
        project: &Project,
        title: &str,
        assignee: &Identity,
    ) -> Task {
        self.desk
            .create_task(
                manager,
                CreateTaskRequest::new(title, "Integration task", project.id(), assignee.user_id()),
            )
            .await
            .expect("task creation should succeed")
    }
}
