//! Authorization decision table.

use crate::identity::domain::{Identity, Role, UserId};
use std::fmt;
use thiserror::Error;

/// Operations subject to authorization.
///
/// Actions that act on one record take the record owner as the `owner`
/// argument of [`authorize`]: the project manager for project actions, the
/// parent project's manager for [`Action::CreateTask`] and
/// [`Action::EditTask`], and the assignee for [`Action::ViewTask`] and
/// [`Action::UpdateTaskStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create, edit, or deactivate user accounts.
    ManageUsers,
    /// List users to pick managers and assignees.
    ViewUserDirectory,
    /// List and open projects.
    ViewProjects,
    /// Create a project.
    CreateProject,
    /// Edit a project's fields.
    EditProject,
    /// Cancel a project and run the task cascade.
    CancelProject,
    /// Read project summaries and workload reports.
    ViewReports,
    /// List every task regardless of assignee.
    ViewAllTasks,
    /// Open a single task.
    ViewTask,
    /// Create a task inside a project.
    CreateTask,
    /// Edit every field of a task, or deactivate it.
    EditTask,
    /// Change only the status of a task.
    UpdateTaskStatus,
}

impl Action {
    /// Returns the canonical snake_case name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ViewUserDirectory => "view_user_directory",
            Self::ViewProjects => "view_projects",
            Self::CreateProject => "create_project",
            Self::EditProject => "edit_project",
            Self::CancelProject => "cancel_project",
            Self::ViewReports => "view_reports",
            Self::ViewAllTasks => "view_all_tasks",
            Self::ViewTask => "view_task",
            Self::CreateTask => "create_task",
            Self::EditTask => "edit_task",
            Self::UpdateTaskStatus => "update_task_status",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The actor may perform the action.
    Allow,
    /// The actor may not perform the action.
    Deny,
}

impl Decision {
    /// Returns whether the decision is [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// Error produced when the policy denies an action.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("user {actor} ({role}) is not allowed to {action}")]
pub struct PermissionDenied {
    /// Acting user.
    pub actor: UserId,
    /// Role held by the acting user at decision time.
    pub role: Role,
    /// Denied action.
    pub action: Action,
}

/// Decides whether `actor` may perform `action` on a record owned by
/// `owner`.
///
/// Administrators may do everything. Managers may do everything except user
/// management, but may only mutate projects they manage and tasks inside
/// those projects. Collaborators may only view and change the status of
/// tasks assigned to them. An absent owner never matches the actor.
#[must_use]
pub fn authorize(actor: &Identity, action: Action, owner: Option<UserId>) -> Decision {
    let owns = owner.is_some_and(|owner_id| owner_id == actor.user_id());
    let allowed = match actor.role() {
        Role::Administrator => true,
        Role::Manager => match action {
            Action::ManageUsers => false,
            Action::ViewUserDirectory
            | Action::ViewProjects
            | Action::CreateProject
            | Action::ViewReports
            | Action::ViewAllTasks
            | Action::ViewTask => true,
            Action::EditProject
            | Action::CancelProject
            | Action::CreateTask
            | Action::EditTask
            | Action::UpdateTaskStatus => owns,
        },
        Role::Collaborator => match action {
            Action::ViewTask | Action::UpdateTaskStatus => owns,
            _ => false,
        },
    };
    Decision::from_bool(allowed)
}

/// Stateless handle over [`authorize`] for services.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    /// Evaluates the decision table. See [`authorize`].
    #[must_use]
    pub fn decide(self, actor: &Identity, action: Action, owner: Option<UserId>) -> Decision {
        authorize(actor, action, owner)
    }

    /// Returns `Ok(())` when the action is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionDenied`] when the policy denies the action.
    pub fn ensure(
        self,
        actor: &Identity,
        action: Action,
        owner: Option<UserId>,
    ) -> Result<(), PermissionDenied> {
        if self.decide(actor, action, owner).is_allowed() {
            return Ok(());
        }
        tracing::warn!(
            actor = %actor.user_id(),
            role = %actor.role(),
            action = %action,
            "permission denied"
        );
        Err(self.denial(actor, action))
    }

    /// Returns `Ok(())` when any of the `(action, owner)` alternatives is
    /// allowed.
    ///
    /// The error reports the first alternative.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionDenied`] when every alternative is denied.
    pub fn ensure_any(
        self,
        actor: &Identity,
        alternatives: &[(Action, Option<UserId>)],
    ) -> Result<(), PermissionDenied> {
        let allowed = alternatives
            .iter()
            .any(|&(action, owner)| self.decide(actor, action, owner).is_allowed());
        if allowed {
            return Ok(());
        }
        let reported = alternatives
            .first()
            .map_or(Action::EditTask, |&(action, _)| action);
        tracing::warn!(
            actor = %actor.user_id(),
            role = %actor.role(),
            action = %reported,
            "permission denied"
        );
        Err(self.denial(actor, reported))
    }

    const fn denial(self, actor: &Identity, action: Action) -> PermissionDenied {
        PermissionDenied {
            actor: actor.user_id(),
            role: actor.role(),
            action,
        }
    }
}
