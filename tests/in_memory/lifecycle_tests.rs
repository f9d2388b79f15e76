//! Status bookkeeping for projects and tasks.

use super::helpers::{Office, office};
use chrono::Utc;
use projectdesk::{
    error::ErrorKind,
    identity::domain::Role,
    planning::{
        domain::{ProjectStatus, TaskStatus},
        ports::TaskFilter,
        services::UpdateProjectRequest,
    },
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_a_project_records_and_reopening_clears_its_end(
    #[future(awt)] office: Office,
) -> eyre::Result<()> {
    let manager = office.member("marta", Role::Manager).await;
    let project = office.project(&manager, "Portal").await;

    let completed = office
        .desk
        .update_project(
            &manager,
            project.id(),
            UpdateProjectRequest::from_project(&project).with_status(ProjectStatus::Completed),
        )
        .await?;
    let reopened = office
        .desk
        .update_project(
            &manager,
            project.id(),
            UpdateProjectRequest::from_project(&completed).with_status(ProjectStatus::InProgress),
        )
        .await?;

    eyre::ensure!(
        completed.actual_end() == Some(Utc::now().date_naive()),
        "completion date not recorded"
    );
    eyre::ensure!(reopened.actual_end().is_none(), "reopening kept the end date");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_completion_date_follows_status(#[future(awt)] office: Office) -> eyre::Result<()> {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;
    let task = office.task(&manager, &project, "Copy", &cora).await;

    let done = office
        .desk
        .update_task_status(&cora, task.id(), TaskStatus::Completed)
        .await?;
    let reopened = office
        .desk
        .update_task_status(&manager, task.id(), TaskStatus::Pending)
        .await?;

    eyre::ensure!(
        done.completed_on() == Some(Utc::now().date_naive()),
        "completion date not recorded"
    );
    eyre::ensure!(reopened.completed_on().is_none(), "reopening kept the date");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_tasks_leave_every_listing(#[future(awt)] office: Office) -> eyre::Result<()> {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;
    let task = office.task(&manager, &project, "Copy", &cora).await;

    let deactivated = office.desk.deactivate_task(&manager, task.id()).await?;
    let listed = office.desk.list_tasks(&manager, TaskFilter::all()).await?;
    let lookup = office.desk.find_task(&manager, task.id()).await;

    eyre::ensure!(!deactivated.is_active(), "task still active");
    eyre::ensure!(deactivated.status() == TaskStatus::Pending, "status changed");
    eyre::ensure!(listed.is_empty(), "deactivated task listed");
    eyre::ensure!(
        lookup.err().map(|err| err.kind()) == Some(ErrorKind::NotFound),
        "deactivated task still found"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancellation_goes_through_the_cascade_only(#[future(awt)] office: Office) {
    let manager = office.member("marta", Role::Manager).await;
    let project = office.project(&manager, "Portal").await;

    let via_update = office
        .desk
        .update_project(
            &manager,
            project.id(),
            UpdateProjectRequest::from_project(&project).with_status(ProjectStatus::Cancelled),
        )
        .await;
    let via_cancel = office
        .desk
        .cancel_project(&manager, project.id())
        .await
        .expect("manager may cancel own project");
    let edit_after = office
        .desk
        .update_project(
            &manager,
            project.id(),
            UpdateProjectRequest::from_project(&via_cancel.project).with_name("Renamed"),
        )
        .await;

    assert_eq!(
        via_update.err().map(|err| err.kind()),
        Some(ErrorKind::Validation)
    );
    assert_eq!(via_cancel.project.status(), ProjectStatus::Cancelled);
    assert_eq!(
        edit_after.err().map(|err| err.kind()),
        Some(ErrorKind::Validation)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn summaries_reflect_task_progress(#[future(awt)] office: Office) -> eyre::Result<()> {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;
    let first = office.task(&manager, &project, "First", &cora).await;
    office.task(&manager, &project, "Second", &cora).await;
    office.task(&manager, &project, "Third", &cora).await;
    office.task(&manager, &project, "Fourth", &cora).await;
    office
        .desk
        .update_task_status(&cora, first.id(), TaskStatus::Completed)
        .await?;

    let summaries = office.desk.project_summaries(&manager).await?;
    let summary = summaries
        .first()
        .ok_or_else(|| eyre::eyre!("expected one summary"))?;

    eyre::ensure!(summary.total_tasks == 4, "total was {}", summary.total_tasks);
    eyre::ensure!(summary.completion_percent() == 25, "percent mismatch");
    Ok(())
}
