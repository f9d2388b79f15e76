//! Diesel schema for project and task persistence.

diesel::table! {
    /// Projects.
    projects (id) {
        /// Internal project identifier.
        id -> Uuid,
        /// Project name.
        #[max_length = 200]
        name -> Varchar,
        /// Project description.
        description -> Text,
        /// Planned start date.
        start_date -> Date,
        /// Expected end date.
        expected_end -> Date,
        /// Date the project was completed.
        actual_end -> Nullable<Date>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Responsible user.
        manager_id -> Uuid,
        /// Logical-deletion flag.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks belonging to projects.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Parent project.
        project_id -> Uuid,
        /// Assigned user.
        assignee_id -> Uuid,
        /// Task status.
        #[max_length = 20]
        status -> Varchar,
        /// Task priority.
        #[max_length = 10]
        priority -> Varchar,
        /// Date the task should be done by.
        expected_completion -> Nullable<Date>,
        /// Date the task was completed.
        completed_on -> Nullable<Date>,
        /// Logical-deletion flag.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> projects (project_id));
diesel::allow_tables_to_appear_in_same_query!(projects, tasks);
