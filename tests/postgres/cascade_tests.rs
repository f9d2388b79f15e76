//! `PostgreSQL` integration tests for project cancellation.

use super::helpers::{PgContext, pg_context, pg_context_with_timeout};
use chrono::NaiveDate;
use projectdesk::{
    error::ErrorKind,
    identity::domain::{Identity, Role},
    planning::{
        domain::{Project, ProjectStatus, Task, TaskStatus},
        ports::{ProjectFilter, ProjectRepository, TaskRepository},
        services::{CreateProjectRequest, CreateTaskRequest},
    },
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use rstest::rstest;
use std::sync::mpsc;
use std::time::Duration;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

struct Scenario {
    ctx: PgContext,
    manager: Identity,
    assignee: Identity,
    project: Project,
}

async fn scenario() -> Option<Scenario> {
    scenario_in(pg_context().await.expect("postgres setup")?).await
}

async fn scenario_in(ctx: PgContext) -> Option<Scenario> {
    let manager = ctx
        .member("marta", Role::Manager)
        .await
        .expect("create manager");
    let assignee = ctx
        .member("cora", Role::Collaborator)
        .await
        .expect("create collaborator");
    let request = CreateProjectRequest::new(
        "Relaunch",
        "Site relaunch",
        date(2025, 1, 1),
        date(2025, 6, 30),
        manager.user_id(),
    );
    let project = ctx
        .desk
        .create_project(&manager, request)
        .await
        .expect("create project");
    Some(Scenario {
        ctx,
        manager,
        assignee,
        project,
    })
}

impl Scenario {
    async fn task(&self, title: &str) -> Task {
        let request = CreateTaskRequest::new(
            title,
            "Scenario",
            self.project.id(),
            self.assignee.user_id(),
        );
        self.ctx
            .desk
            .create_task(&self.manager, request)
            .await
            .expect("create task")
    }

    async fn stored_task(&self, task: &Task) -> Task {
        TaskRepository::find_by_id(&*self.ctx.store, task.id())
            .await
            .expect("read task")
            .expect("task stored")
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_cascade_deactivates_unfinished_tasks() {
    let Some(sc) = scenario().await else {
        return;
    };
    let open = sc.task("Open").await;
    let done = sc.task("Done").await;
    sc.ctx
        .desk
        .update_task_status(&sc.assignee, done.id(), TaskStatus::Completed)
        .await
        .expect("complete task");

    let outcome = sc
        .ctx
        .desk
        .cancel_project(&sc.ctx.admin, sc.project.id())
        .await
        .expect("administrator cancels");
    let stored_project = ProjectRepository::find_by_id(&*sc.ctx.store, sc.project.id())
        .await
        .expect("read project")
        .expect("project stored");
    let stored_open = sc.stored_task(&open).await;
    let stored_done = sc.stored_task(&done).await;

    assert_eq!(outcome.deactivated_tasks, vec![open.id()]);
    assert_eq!(stored_project.status(), ProjectStatus::Cancelled);
    assert!(!stored_open.is_active());
    assert_eq!(stored_open.status(), TaskStatus::Pending);
    assert!(stored_done.is_active());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_concurrent_cancellations_apply_once() {
    let Some(sc) = scenario().await else {
        return;
    };
    sc.task("Open").await;

    let (first, second) = tokio::join!(
        sc.ctx.desk.cancel_project(&sc.ctx.admin, sc.project.id()),
        sc.ctx.desk.cancel_project(&sc.manager, sc.project.id()),
    );

    let outcomes = [&first, &second];
    let succeeded = outcomes.iter().filter(|result| result.is_ok()).count();
    let rejected: Vec<ErrorKind> = outcomes
        .iter()
        .filter_map(|result| result.as_ref().err().map(|err| err.kind()))
        .collect();
    assert_eq!(succeeded, 1);
    assert_eq!(rejected, vec![ErrorKind::Validation]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_rejects_backwards_schedule_without_writing() {
    let Some(sc) = scenario().await else {
        return;
    };

    let result = sc
        .ctx
        .desk
        .create_project(
            &sc.manager,
            CreateProjectRequest::new(
                "Backwards",
                "Nope",
                date(2025, 6, 30),
                date(2025, 1, 1),
                sc.manager.user_id(),
            ),
        )
        .await;
    let stored = ProjectRepository::list_active(&*sc.ctx.store, &ProjectFilter::all())
        .await
        .expect("list projects");

    assert_eq!(
        result.err().map(|err| err.kind()),
        Some(ErrorKind::Validation)
    );
    let stored_ids: Vec<_> = stored.iter().map(Project::id).collect();
    assert_eq!(stored_ids, vec![sc.project.id()]);
}

/// Holds `FOR UPDATE` on a project row from a separate session until told
/// to roll back.
fn hold_project_lock(
    url: String,
    project: &Project,
) -> (mpsc::Receiver<()>, mpsc::Sender<()>, std::thread::JoinHandle<()>) {
    let (locked_tx, locked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let project_id = project.id();
    let holder = std::thread::spawn(move || {
        let mut conn = PgConnection::establish(&url).expect("lock session");
        conn.batch_execute(&format!(
            "BEGIN; SELECT id FROM projects WHERE id = '{project_id}' FOR UPDATE;"
        ))
        .expect("take row lock");
        locked_tx.send(()).expect("signal lock");
        drop(release_rx.recv());
        conn.batch_execute("ROLLBACK;").expect("release row lock");
    });
    (locked_rx, release_tx, holder)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_cancel_times_out_behind_a_row_lock() {
    let Some(ctx) = pg_context_with_timeout(Duration::from_millis(200))
        .await
        .expect("postgres setup")
    else {
        return;
    };
    let Some(sc) = scenario_in(ctx).await else {
        return;
    };
    let open = sc.task("Open").await;
    let (locked, release, holder) = hold_project_lock(sc.ctx.database_url.clone(), &sc.project);
    locked.recv().expect("lock taken");

    let result = sc
        .ctx
        .desk
        .cancel_project(&sc.ctx.admin, sc.project.id())
        .await;
    release.send(()).expect("release lock");
    holder.join().expect("lock session ends");

    assert_eq!(result.err().map(|err| err.kind()), Some(ErrorKind::Storage));
    let stored_project = ProjectRepository::find_by_id(&*sc.ctx.store, sc.project.id())
        .await
        .expect("read project")
        .expect("project stored");
    assert_eq!(stored_project.status(), ProjectStatus::Planned);
    assert!(sc.stored_task(&open).await.is_active());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_stale_task_write_cannot_reopen_cancelled_work() {
    let Some(sc) = scenario().await else {
        return;
    };
    let open = sc.task("Open").await;
    sc.ctx
        .desk
        .cancel_project(&sc.ctx.admin, sc.project.id())
        .await
        .expect("administrator cancels");

    let mut stale = open.clone();
    stale.change_status(TaskStatus::InProgress, &mockable::DefaultClock);
    let result = TaskRepository::update(&*sc.ctx.store, &stale).await;

    assert_eq!(result.err().map(|err| err.kind()), Some(ErrorKind::Validation));
    let stored = sc.stored_task(&open).await;
    assert!(!stored.is_active());
    assert_eq!(stored.status(), TaskStatus::Pending);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_lists_projects_by_manager() {
    let Some(sc) = scenario().await else {
        return;
    };
    let rival = sc
        .ctx
        .member("rui", Role::Manager)
        .await
        .expect("create manager");
    sc.ctx
        .desk
        .create_project(
            &rival,
            CreateProjectRequest::new(
                "Warehouse",
                "Stock system",
                date(2025, 1, 1),
                date(2025, 6, 30),
                rival.user_id(),
            ),
        )
        .await
        .expect("create rival project");

    let managed = ProjectRepository::list_active(
        &*sc.ctx.store,
        &ProjectFilter::all().managed_by(sc.manager.user_id()),
    )
    .await
    .expect("list projects");

    let ids: Vec<_> = managed.iter().map(Project::id).collect();
    assert_eq!(ids, vec![sc.project.id()]);
}
