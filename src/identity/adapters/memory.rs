//! In-memory user repository.

use crate::identity::{
    domain::{EmailAddress, Login, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UserRepositoryResult<RwLockReadGuard<'_, HashMap<UserId, User>>> {
        self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> UserRepositoryResult<RwLockWriteGuard<'_, HashMap<UserId, User>>> {
        self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Rejects `user` when another active user already holds its login or email.
fn ensure_unique(users: &HashMap<UserId, User>, user: &User) -> UserRepositoryResult<()> {
    if !user.is_active() {
        return Ok(());
    }
    let others = || {
        users
            .values()
            .filter(|other| other.is_active() && other.id() != user.id())
    };
    if others().any(|other| other.login() == user.login()) {
        return Err(UserRepositoryError::DuplicateLogin(user.login().clone()));
    }
    if others().any(|other| other.email() == user.email()) {
        return Err(UserRepositoryError::DuplicateEmail(user.email().clone()));
    }
    Ok(())
}

fn sorted_by_name(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
    users
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.write()?;
        if users.contains_key(&user.id()) {
            return Err(UserRepositoryError::DuplicateUser(user.id()));
        }
        ensure_unique(&users, user)?;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.write()?;
        if !users.contains_key(&user.id()) {
            return Err(UserRepositoryError::NotFound(user.id()));
        }
        ensure_unique(&users, user)?;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_active_by_login(&self, login: &Login) -> UserRepositoryResult<Option<User>> {
        let users = self.read()?;
        Ok(users
            .values()
            .find(|user| user.is_active() && user.login() == login)
            .cloned())
    }

    async fn list_active(&self) -> UserRepositoryResult<Vec<User>> {
        let users = self.read()?;
        Ok(sorted_by_name(
            users.values().filter(|user| user.is_active()).cloned().collect(),
        ))
    }

    async fn list_active_by_role(&self, role: Role) -> UserRepositoryResult<Vec<User>> {
        let users = self.read()?;
        Ok(sorted_by_name(
            users
                .values()
                .filter(|user| user.is_active() && user.role() == role)
                .cloned()
                .collect(),
        ))
    }

    async fn login_taken(
        &self,
        login: &Login,
        exclude: Option<UserId>,
    ) -> UserRepositoryResult<bool> {
        let users = self.read()?;
        Ok(users.values().any(|user| {
            user.is_active() && user.login() == login && Some(user.id()) != exclude
        }))
    }

    async fn email_taken(
        &self,
        email: &EmailAddress,
        exclude: Option<UserId>,
    ) -> UserRepositoryResult<bool> {
        let users = self.read()?;
        Ok(users.values().any(|user| {
            user.is_active() && user.email() == email && Some(user.id()) != exclude
        }))
    }
}
