use async_trait::async_trait;
use uuid::Uuid;

use super::models::{NewUser, User};
use crate::auth::password;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
    #[error("Email already exists")]
    EmailTaken,
    #[error("Invalid data format: {0}")]
    InvalidData(String),
}

/// Storage for portal accounts. Emails compare case-insensitively.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Stores a new account, failing with [`RepositoryError::EmailTaken`]
    /// when the email is already registered.
    async fn insert(&self, new_user: NewUser) -> Result<User, RepositoryError>;

    /// Records a successful login.
    async fn touch_login(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// The account for `email` if `password` matches its stored hash.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let Some(mut user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }

        let matches = password::verify_password(password, &user.password_hash)
            .map_err(|e| RepositoryError::InvalidData(format!("Stored password hash: {}", e)))?;
        if !matches {
            return Ok(None);
        }

        self.touch_login(user.id).await?;
        user.update_last_login();
        Ok(Some(user))
    }
}
