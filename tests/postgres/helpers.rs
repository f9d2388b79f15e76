//! Shared helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use projectdesk::{
    config::DeskConfig,
    desk::{Desk, PostgresDesk},
    identity::{
        adapters::{ConfiguredCredentials, postgres::PostgresUserRepository},
        domain::{Identity, Role},
        services::CreateUserRequest,
    },
    planning::adapters::postgres::PostgresPlanningStore,
    storage::connect_pool,
};
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Boxed error type for test results.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Variable naming the database integration tests may use.
pub const TEST_DATABASE_URL_VAR: &str = "PROJECTDESK_TEST_DATABASE_URL";

/// SQL creating the users, projects, and tasks tables.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2025-01-10-000000_create_desk_tables/up.sql");

/// Password every seeded account starts with.
pub const SECRET: &str = "secret1";

/// A desk bound to a private schema that is dropped with the context.
pub struct PgContext {
    pub desk: PostgresDesk,
    pub store: Arc<PostgresPlanningStore>,
    pub admin: Identity,
    /// Connection string bound to this context's schema.
    pub database_url: String,
    _schema: TestSchema,
}

impl PgContext {
    /// Creates a user and returns their identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be created.
    pub async fn member(&self, login: &str, role: Role) -> Result<Identity, BoxError> {
        let user = self.desk.create_user(&self.admin, account(login, role)).await?;
        Ok(user.identity())
    }
}

struct TestSchema {
    base_url: String,
    name: String,
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut conn) = PgConnection::establish(&self.base_url) {
            drop(conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name)));
        }
    }
}

/// Builds a user creation request with predictable fields.
#[must_use]
pub fn account(login: &str, role: Role) -> CreateUserRequest {
    CreateUserRequest::new(
        format!("Person {login}"),
        format!("{login}@example.com"),
        login,
        SECRET,
        role,
    )
}

fn with_search_path(base_url: &str, schema: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}options=-csearch_path%3D{schema}")
}

fn provision_schema(base_url: &str, name: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(base_url)?;
    conn.batch_execute(&format!(
        "CREATE SCHEMA {name}; SET search_path TO {name}; {CREATE_TABLES_SQL}"
    ))?;
    Ok(())
}

/// Provisions a schema and a desk over it.
///
/// Returns `Ok(None)` when no test database is configured.
///
/// # Errors
///
/// Returns an error if the schema, pool, or administrator cannot be set up.
pub async fn pg_context() -> Result<Option<PgContext>, BoxError> {
    pg_context_with_timeout(DeskConfig::default().cascade_timeout).await
}

/// Like [`pg_context`], with a custom cancellation budget.
///
/// # Errors
///
/// Returns an error if the schema, pool, or administrator cannot be set up.
pub async fn pg_context_with_timeout(
    cascade_timeout: Duration,
) -> Result<Option<PgContext>, BoxError> {
    let Ok(base_url) = std::env::var(TEST_DATABASE_URL_VAR) else {
        return Ok(None);
    };
    let name = format!("pd_{}", Uuid::new_v4().simple());
    let schema = TestSchema {
        base_url: base_url.clone(),
        name: name.clone(),
    };
    let setup_url = base_url.clone();
    let setup_name = name.clone();
    tokio::task::spawn_blocking(move || provision_schema(&setup_url, &setup_name)).await??;

    let database_url = with_search_path(&base_url, &name);
    let config = DeskConfig {
        database_url: Some(database_url.clone()),
        pool_max_size: 4,
        cascade_timeout,
        ..DeskConfig::default()
    };
    let (shared_pool, desk_config) =
        tokio::task::spawn_blocking(move || connect_pool(&config).map(|pool| (pool, config)))
            .await??;
    let store = Arc::new(PostgresPlanningStore::new(shared_pool.clone()));
    let desk = Desk::new(
        Arc::new(PostgresUserRepository::new(shared_pool)),
        Arc::clone(&store),
        Arc::new(ConfiguredCredentials::from(desk_config.credential_scheme)),
        Arc::new(DefaultClock),
        &desk_config,
    );
    let admin = desk
        .bootstrap_administrator(account("root", Role::Administrator))
        .await?
        .identity();

    Ok(Some(PgContext {
        desk,
        store,
        admin,
        database_url,
        _schema: schema,
    }))
}
