//! Given steps for project lifecycle BDD scenarios.

use super::world::{ProjectWorld, SECRET, run_async};
use chrono::NaiveDate;
use eyre::WrapErr;
use projectdesk::{
    identity::{domain::Role, services::CreateUserRequest},
    planning::{
        domain::TaskStatus,
        services::{CreateProjectRequest, CreateTaskRequest},
    },
};
use rstest_bdd_macros::given;

const ASSIGNEE: &str = "worker";

#[given(r#"an administrator "{login}""#)]
fn administrator(world: &mut ProjectWorld, login: String) -> Result<(), eyre::Report> {
    let request = CreateUserRequest::new(
        "Administrator",
        format!("{login}@example.com"),
        login.as_str(),
        SECRET,
        Role::Administrator,
    );
    let admin = run_async(world.desk.bootstrap_administrator(request))
        .wrap_err("bootstrap administrator")?
        .identity();
    world.people.insert(login, admin.clone());
    world.admin = Some(admin);
    Ok(())
}

#[given(r#"manager "{login}" exists"#)]
fn manager_exists(world: &mut ProjectWorld, login: String) -> Result<(), eyre::Report> {
    world.ensure_person(&login, Role::Manager)?;
    Ok(())
}

#[given(r#"manager "{login}" manages project "{name}""#)]
fn manager_manages_project(
    world: &mut ProjectWorld,
    login: String,
    name: String,
) -> Result<(), eyre::Report> {
    let manager = world.ensure_person(&login, Role::Manager)?;
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).ok_or_else(|| eyre::eyre!("start date"))?;
    let end = NaiveDate::from_ymd_opt(2025, 6, 30).ok_or_else(|| eyre::eyre!("end date"))?;
    let request = CreateProjectRequest::new(
        name.as_str(),
        "Scenario project",
        start,
        end,
        manager.user_id(),
    );
    let project = run_async(world.desk.create_project(&manager, request))
        .wrap_err("create scenario project")?;
    world.projects.insert(name, project);
    Ok(())
}

fn add_task(
    world: &mut ProjectWorld,
    project_name: &str,
    title: String,
    status: TaskStatus,
) -> Result<(), eyre::Report> {
    let assignee = world.ensure_person(ASSIGNEE, Role::Collaborator)?;
    let admin = world.admin()?.clone();
    let project_id = world.project(project_name)?.id();
    let request = CreateTaskRequest::new(
        title.as_str(),
        "Scenario task",
        project_id,
        assignee.user_id(),
    );
    let created =
        run_async(world.desk.create_task(&admin, request)).wrap_err("create scenario task")?;
    let task = if status == TaskStatus::Pending {
        created
    } else {
        run_async(world.desk.update_task_status(&assignee, created.id(), status))
            .wrap_err("set scenario task status")?
    };
    world.tasks.insert(title, task);
    Ok(())
}

#[given(r#"project "{name}" has a pending task "{title}""#)]
fn pending_task(world: &mut ProjectWorld, name: String, title: String) -> Result<(), eyre::Report> {
    add_task(world, &name, title, TaskStatus::Pending)
}

#[given(r#"project "{name}" has a completed task "{title}""#)]
fn completed_task(
    world: &mut ProjectWorld,
    name: String,
    title: String,
) -> Result<(), eyre::Report> {
    add_task(world, &name, title, TaskStatus::Completed)
}
