//! When steps for project lifecycle BDD scenarios.

use super::world::{ProjectWorld, run_async};
use chrono::NaiveDate;
use projectdesk::planning::services::CreateProjectRequest;
use rstest_bdd_macros::when;

#[when(r#"manager "{login}" cancels project "{name}""#)]
fn manager_cancels(
    world: &mut ProjectWorld,
    login: String,
    name: String,
) -> Result<(), eyre::Report> {
    let manager = world.person(&login)?.clone();
    let project_id = world.project(&name)?.id();
    world.last_cancellation = Some(run_async(world.desk.cancel_project(&manager, project_id)));
    Ok(())
}

#[when(r#"the administrator cancels project "{name}""#)]
fn administrator_cancels(world: &mut ProjectWorld, name: String) -> Result<(), eyre::Report> {
    let admin = world.admin()?.clone();
    let project_id = world.project(&name)?.id();
    world.last_cancellation = Some(run_async(world.desk.cancel_project(&admin, project_id)));
    Ok(())
}

#[when(r#"manager "{login}" creates project "{name}" from "{start}" to "{end}""#)]
fn manager_creates(
    world: &mut ProjectWorld,
    login: String,
    name: String,
    start: String,
    end: String,
) -> Result<(), eyre::Report> {
    let manager = world.person(&login)?.clone();
    let admin_id = world.admin()?.user_id();
    let start_date: NaiveDate = start.parse()?;
    let end_date: NaiveDate = end.parse()?;
    // Name someone else as manager; the service must override it.
    let request = CreateProjectRequest::new(
        name.as_str(),
        "Scenario project",
        start_date,
        end_date,
        admin_id,
    );
    let result = run_async(world.desk.create_project(&manager, request));
    if let Ok(ref project) = result {
        world.projects.insert(name, project.clone());
    }
    world.last_creation = Some(result);
    Ok(())
}
