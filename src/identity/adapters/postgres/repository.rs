//! `PostgreSQL` repository implementation for user storage.

use super::{
    models::{NewUserRow, UserChangeset, UserRow},
    schema::users,
};
use crate::identity::{
    domain::{
        CredentialSecret, EmailAddress, Login, PersistedUserData, PersonName, Role, User, UserId,
        UserProfile,
    },
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::storage::{PgPool, get_conn_with, run_blocking_with};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const LOGIN_UNIQUE_INDEX: &str = "idx_users_login_active_unique";
const EMAIL_UNIQUE_INDEX: &str = "idx_users_email_active_unique";

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, UserRepositoryError::persistence)?;
                operation(&mut connection)
            },
            UserRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let new_row = to_new_row(user);
        let user_id = user.id();
        let login = user.login().clone();
        let email = user.email().clone();

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &login, &email, || {
                    UserRepositoryError::DuplicateUser(user_id)
                }))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let changeset = to_changeset(user);
        let user_id = user.id();
        let login = user.login().clone();
        let email = user.email().clone();

        self.run_blocking(move |connection| {
            let updated = diesel::update(users::table.filter(users::id.eq(user_id.into_inner())))
                .set(&changeset)
                .execute(connection)
                .map_err(|err| map_write_error(err, &login, &email, || {
                    UserRepositoryError::DuplicateUser(user_id)
                }))?;
            if updated == 0 {
                return Err(UserRepositoryError::NotFound(user_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_active_by_login(&self, login: &Login) -> UserRepositoryResult<Option<User>> {
        let lookup = login.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::login.eq(&lookup))
                .filter(users::active.eq(true))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn list_active(&self) -> UserRepositoryResult<Vec<User>> {
        self.run_blocking(move |connection| {
            let rows = users::table
                .filter(users::active.eq(true))
                .order(users::name.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }

    async fn list_active_by_role(&self, role: Role) -> UserRepositoryResult<Vec<User>> {
        self.run_blocking(move |connection| {
            let rows = users::table
                .filter(users::active.eq(true))
                .filter(users::role.eq(role.as_str()))
                .order(users::name.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }

    async fn login_taken(
        &self,
        login: &Login,
        exclude: Option<UserId>,
    ) -> UserRepositoryResult<bool> {
        let lookup = login.as_str().to_owned();
        self.run_blocking(move |connection| {
            let mut query = users::table
                .filter(users::login.eq(lookup))
                .filter(users::active.eq(true))
                .into_boxed();
            if let Some(excluded) = exclude {
                query = query.filter(users::id.ne(excluded.into_inner()));
            }
            let count: i64 = query
                .count()
                .get_result(connection)
                .map_err(UserRepositoryError::persistence)?;
            Ok(count > 0)
        })
        .await
    }

    async fn email_taken(
        &self,
        email: &EmailAddress,
        exclude: Option<UserId>,
    ) -> UserRepositoryResult<bool> {
        let lookup = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let mut query = users::table
                .filter(users::email.eq(lookup))
                .filter(users::active.eq(true))
                .into_boxed();
            if let Some(excluded) = exclude {
                query = query.filter(users::id.ne(excluded.into_inner()));
            }
            let count: i64 = query
                .count()
                .get_result(connection)
                .map_err(UserRepositoryError::persistence)?;
            Ok(count > 0)
        })
        .await
    }
}

fn to_new_row(user: &User) -> NewUserRow {
    NewUserRow {
        id: user.id().into_inner(),
        name: user.name().as_str().to_owned(),
        email: user.email().as_str().to_owned(),
        login: user.login().as_str().to_owned(),
        secret: user.secret().expose().to_owned(),
        role: user.role().as_str().to_owned(),
        active: user.is_active(),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

fn to_changeset(user: &User) -> UserChangeset {
    UserChangeset {
        name: user.name().as_str().to_owned(),
        email: user.email().as_str().to_owned(),
        login: user.login().as_str().to_owned(),
        secret: user.secret().expose().to_owned(),
        role: user.role().as_str().to_owned(),
        active: user.is_active(),
        updated_at: user.updated_at(),
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        name,
        email,
        login,
        secret,
        role,
        active,
        created_at,
        updated_at,
    } = row;

    let profile = UserProfile {
        name: PersonName::new(name).map_err(UserRepositoryError::invalid_persisted_data)?,
        email: EmailAddress::new(email).map_err(UserRepositoryError::invalid_persisted_data)?,
        login: Login::new(login).map_err(UserRepositoryError::invalid_persisted_data)?,
        role: Role::try_from(role.as_str()).map_err(UserRepositoryError::invalid_persisted_data)?,
    };

    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(id),
        profile,
        secret: CredentialSecret::new(secret),
        active,
        created_at,
        updated_at,
    }))
}

fn map_write_error(
    err: DieselError,
    login: &Login,
    email: &EmailAddress,
    duplicate_id: impl FnOnce() -> UserRepositoryError,
) -> UserRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
            match violated_index(info.as_ref()) {
                Some(LOGIN_UNIQUE_INDEX) => UserRepositoryError::DuplicateLogin(login.clone()),
                Some(EMAIL_UNIQUE_INDEX) => UserRepositoryError::DuplicateEmail(email.clone()),
                _ => duplicate_id(),
            }
        }
        _ => UserRepositoryError::persistence(err),
    }
}

fn violated_index(info: &dyn DatabaseErrorInformation) -> Option<&str> {
    info.constraint_name()
}
