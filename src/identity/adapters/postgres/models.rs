//! Diesel row models for user persistence.

use super::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Login handle.
    pub login: String,
    /// Stored credential secret.
    pub secret: String,
    /// Access role.
    pub role: String,
    /// Logical-deletion flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Login handle.
    pub login: String,
    /// Stored credential secret.
    pub secret: String,
    /// Access role.
    pub role: String,
    /// Logical-deletion flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for updating every mutable user column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Login handle.
    pub login: String,
    /// Stored credential secret.
    pub secret: String,
    /// Access role.
    pub role: String,
    /// Logical-deletion flag.
    pub active: bool,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
