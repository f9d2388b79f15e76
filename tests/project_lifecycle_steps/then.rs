//! Then steps for project lifecycle BDD scenarios.

use super::world::{ProjectWorld, run_async};
use projectdesk::{
    error::ErrorKind,
    planning::{
        domain::{ProjectStatus, TaskStatus},
        ports::{ProjectFilter, ProjectRepository, TaskRepository},
    },
};
use rstest_bdd_macros::then;

fn cancellation_kind(world: &ProjectWorld) -> Result<Option<ErrorKind>, eyre::Report> {
    let result = world
        .last_cancellation
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no cancellation attempted"))?;
    Ok(result.as_ref().err().map(|err| err.kind()))
}

#[then("the cancellation is denied")]
fn cancellation_denied(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let kind = cancellation_kind(world)?;
    eyre::ensure!(
        kind == Some(ErrorKind::PermissionDenied),
        "expected permission denied, got {kind:?}"
    );
    Ok(())
}

#[then("the cancellation fails validation")]
fn cancellation_invalid(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let kind = cancellation_kind(world)?;
    eyre::ensure!(
        kind == Some(ErrorKind::Validation),
        "expected validation failure, got {kind:?}"
    );
    Ok(())
}

#[then("{count:usize} task was deactivated")]
fn tasks_deactivated(world: &ProjectWorld, count: usize) -> Result<(), eyre::Report> {
    let outcome = world
        .last_cancellation
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no cancellation attempted"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("cancellation failed: {err}"))?;
    eyre::ensure!(
        outcome.deactivated_tasks.len() == count,
        "expected {count} deactivated tasks, got {}",
        outcome.deactivated_tasks.len()
    );
    Ok(())
}

#[then(r#"project "{name}" has status "{status}""#)]
fn project_status(world: &ProjectWorld, name: String, status: String) -> Result<(), eyre::Report> {
    let expected = ProjectStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status: {err}"))?;
    let project_id = world.project(&name)?.id();
    let stored = run_async(ProjectRepository::find_by_id(&*world.store, project_id))?
        .ok_or_else(|| eyre::eyre!("project '{name}' missing from store"))?;
    eyre::ensure!(
        stored.status() == expected,
        "expected {expected}, found {}",
        stored.status()
    );
    Ok(())
}

fn check_task(
    world: &ProjectWorld,
    title: &str,
    active: bool,
    status: &str,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status)
        .map_err(|err| eyre::eyre!("invalid expected status: {err}"))?;
    let task_id = world.task(title)?.id();
    let stored = run_async(TaskRepository::find_by_id(&*world.store, task_id))?
        .ok_or_else(|| eyre::eyre!("task '{title}' missing from store"))?;
    eyre::ensure!(stored.is_active() == active, "task '{title}' activity mismatch");
    eyre::ensure!(
        stored.status() == expected,
        "expected {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then(r#"task "{title}" is active with status "{status}""#)]
fn task_active(world: &ProjectWorld, title: String, status: String) -> Result<(), eyre::Report> {
    check_task(world, &title, true, &status)
}

#[then(r#"task "{title}" is inactive with status "{status}""#)]
fn task_inactive(world: &ProjectWorld, title: String, status: String) -> Result<(), eyre::Report> {
    check_task(world, &title, false, &status)
}

#[then("the project creation fails validation")]
fn creation_invalid(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_creation
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no creation attempted"))?;
    let kind = result.as_ref().err().map(|err| err.kind());
    eyre::ensure!(
        kind == Some(ErrorKind::Validation),
        "expected validation failure, got {kind:?}"
    );
    Ok(())
}

#[then("no projects are stored")]
fn no_projects(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let stored = run_async(ProjectRepository::list_active(
        &*world.store,
        &ProjectFilter::all(),
    ))?;
    eyre::ensure!(stored.is_empty(), "found {} stored projects", stored.len());
    Ok(())
}

#[then(r#"project "{name}" is managed by "{login}""#)]
fn managed_by(world: &ProjectWorld, name: String, login: String) -> Result<(), eyre::Report> {
    let project = world.project(&name)?;
    let manager = world.person(&login)?;
    eyre::ensure!(
        project.manager_id() == manager.user_id(),
        "project '{name}' not managed by '{login}'"
    );
    Ok(())
}
