//! Role and ownership rules observed through the desk facade.

use super::helpers::{Office, date, office};
use projectdesk::{
    error::ErrorKind,
    identity::domain::Role,
    planning::{
        domain::{ProjectStatus, TaskStatus},
        ports::{ProjectFilter, TaskFilter},
        services::{CreateProjectRequest, UpdateProjectRequest, UpdateTaskRequest},
    },
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn collaborators_only_see_their_own_tasks(#[future(awt)] office: Office) -> eyre::Result<()> {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let ivo = office.member("ivo", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;
    let own = office.task(&manager, &project, "Own", &cora).await;
    let other = office.task(&manager, &project, "Other", &ivo).await;

    let visible = office.desk.list_tasks(&cora, TaskFilter::all()).await?;
    let asked_for_other = office
        .desk
        .list_tasks(&cora, TaskFilter::all().assigned_to(ivo.user_id()))
        .await?;
    let everything = office
        .desk
        .list_tasks(&manager, TaskFilter::all().in_project(project.id()))
        .await?;
    let foreign = office.desk.find_task(&cora, other.id()).await;

    eyre::ensure!(visible == vec![own.clone()], "collaborator saw {visible:?}");
    eyre::ensure!(asked_for_other.is_empty(), "filter widened visibility");
    eyre::ensure!(everything.len() == 2, "manager saw {} tasks", everything.len());
    eyre::ensure!(
        foreign.err().map(|err| err.kind()) == Some(ErrorKind::PermissionDenied),
        "collaborator read a foreign task"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn collaborators_cannot_touch_projects(#[future(awt)] office: Office) {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;

    let listed = office.desk.list_projects(&cora, ProjectFilter::all()).await;
    let created = office
        .desk
        .create_project(
            &cora,
            CreateProjectRequest::new(
                "Side quest",
                "Not allowed",
                date(2025, 1, 1),
                date(2025, 2, 1),
                cora.user_id(),
            ),
        )
        .await;
    let edited = office
        .desk
        .update_project(
            &cora,
            project.id(),
            UpdateProjectRequest::from_project(&project).with_name("Renamed"),
        )
        .await;

    for kind in [
        listed.err().map(|err| err.kind()),
        created.err().map(|err| err.kind()),
        edited.err().map(|err| err.kind()),
    ] {
        assert_eq!(kind, Some(ErrorKind::PermissionDenied));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn managers_edit_only_projects_they_manage(#[future(awt)] office: Office) {
    let owner = office.member("marta", Role::Manager).await;
    let rival = office.member("rui", Role::Manager).await;
    let project = office.project(&owner, "Portal").await;
    let request =
        UpdateProjectRequest::from_project(&project).with_status(ProjectStatus::InProgress);

    let denied = office
        .desk
        .update_project(&rival, project.id(), request.clone())
        .await;
    let allowed = office
        .desk
        .update_project(&owner, project.id(), request)
        .await
        .expect("owner may edit");

    assert_eq!(
        denied.err().map(|err| err.kind()),
        Some(ErrorKind::PermissionDenied)
    );
    assert_eq!(allowed.status(), ProjectStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn collaborators_change_status_but_not_content(#[future(awt)] office: Office) {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;
    let task = office.task(&manager, &project, "Copy", &cora).await;

    let moved = office
        .desk
        .update_task_status(&cora, task.id(), TaskStatus::InProgress)
        .await
        .expect("assignee may change status");
    let rewritten = office
        .desk
        .update_task(
            &cora,
            task.id(),
            UpdateTaskRequest::from_task(&moved).with_title("Rewritten"),
        )
        .await;

    assert_eq!(moved.status(), TaskStatus::InProgress);
    assert_eq!(
        rewritten.err().map(|err| err.kind()),
        Some(ErrorKind::PermissionDenied)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reports_are_closed_to_collaborators(#[future(awt)] office: Office) {
    let cora = office.member("cora", Role::Collaborator).await;

    let summaries = office.desk.project_summaries(&cora).await;
    let workload = office.desk.task_workload(&office.admin).await;

    assert_eq!(
        summaries.err().map(|err| err.kind()),
        Some(ErrorKind::PermissionDenied)
    );
    assert!(workload.is_ok_and(|entries| entries.len() == 2));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_list_narrows_to_one_manager(#[future(awt)] office: Office) -> eyre::Result<()> {
    let marta = office.member("marta", Role::Manager).await;
    let rui = office.member("rui", Role::Manager).await;
    let portal = office.project(&marta, "Portal").await;
    office.project(&rui, "Warehouse").await;

    let martas = office
        .desk
        .list_projects(&office.admin, ProjectFilter::all().managed_by(marta.user_id()))
        .await?;
    let all = office.desk.list_projects(&office.admin, ProjectFilter::all()).await?;

    eyre::ensure!(martas == vec![portal], "filtered list was {martas:?}");
    eyre::ensure!(all.len() == 2, "unfiltered list had {} projects", all.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivation_revokes_a_signed_in_identity(#[future(awt)] office: Office) {
    let manager = office.member("marta", Role::Manager).await;
    let cora = office.member("cora", Role::Collaborator).await;
    let project = office.project(&manager, "Portal").await;
    let task = office.task(&manager, &project, "Copy", &cora).await;
    office
        .desk
        .deactivate_user(&office.admin, cora.user_id())
        .await
        .expect("administrator may deactivate");

    let moved = office
        .desk
        .update_task_status(&cora, task.id(), TaskStatus::InProgress)
        .await;

    assert_eq!(
        moved.err().map(|err| err.kind()),
        Some(ErrorKind::Unauthenticated)
    );
}
