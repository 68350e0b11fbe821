use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use zendriver_models::User;

use super::{RepositoryError, UserRepository};

/// Process-local user store. Contents are lost on restart.
///
/// Inserts take the write lock for the whole check-and-insert, which keeps
/// usernames unique under concurrent registration.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn add(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::DuplicateUsername(user.username.clone()));
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.username == username))
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&user.id)
            .ok_or(RepositoryError::NotFound(user.id))?;

        stored.password_hash = user.password_hash.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.role = user.role;
        stored.updated_at = user.updated_at;
        Ok(())
    }

    async fn remove(&self, user: &User) -> Result<(), RepositoryError> {
        self.users
            .write()
            .await
            .remove(&user.id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(user.id))
    }
}
