use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewUser, User, email_key};
use super::user_repository::{RepositoryError, UserRepository};

/// Process-local account store for development and tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let key = email_key(email);
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| email_key(&user.email) == key)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let key = email_key(&new_user.email);
        let mut users = self.users.write().await;
        if users.values().any(|user| email_key(&user.email) == key) {
            return Err(RepositoryError::EmailTaken);
        }

        let user = User::from_new(new_user);
        users.insert(user.id, user.clone());
        log::debug!("Stored user {} ({})", user.email, user.id);
        Ok(user)
    }

    async fn touch_login(&self, id: Uuid) -> Result<(), RepositoryError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.update_last_login();
        }
        Ok(())
    }
}
