use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use super::models::{NewUser, User, email_key};
use super::user_repository::{RepositoryError, UserRepository};

#[derive(Clone)]
pub struct DynamoDbUserRepository {
    client: Client,
    users_table: String,
}

impl DynamoDbUserRepository {
    pub fn new(client: Client, users_table: String) -> Self {
        Self {
            client,
            users_table,
        }
    }

    async fn put_user(&self, user: &User) -> Result<(), RepositoryError> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(user.id.to_string()));
        item.insert("email".to_string(), AttributeValue::S(user.email.clone()));
        item.insert(
            "email_key".to_string(),
            AttributeValue::S(email_key(&user.email)),
        );
        item.insert("name".to_string(), AttributeValue::S(user.name.clone()));
        item.insert(
            "password_hash".to_string(),
            AttributeValue::S(user.password_hash.clone()),
        );
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(user.created_at.to_rfc3339()),
        );
        item.insert(
            "updated_at".to_string(),
            AttributeValue::S(user.updated_at.to_rfc3339()),
        );
        if let Some(last_login) = &user.last_login {
            item.insert(
                "last_login".to_string(),
                AttributeValue::S(last_login.to_rfc3339()),
            );
        }
        item.insert(
            "is_active".to_string(),
            AttributeValue::Bool(user.is_active),
        );

        match self
            .client
            .put_item()
            .table_name(&self.users_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
        {
            Ok(_) => {
                log::info!("Created user in DynamoDB: {}", user.email);
                Ok(())
            }
            Err(e) => {
                log::error!("DynamoDB put_item failed for user {}: {:?}", user.email, e);
                Err(RepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    fn parse_user_from_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<User, RepositoryError> {
        let id = item
            .get("id")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid user id".to_string()))?;

        let email = string_attr(&item, "email")?;
        let name = string_attr(&item, "name")?;
        let password_hash = string_attr(&item, "password_hash")?;

        let created_at = time_attr(&item, "created_at")
            .ok_or_else(|| RepositoryError::InvalidData("Invalid created_at".to_string()))?;
        let updated_at = time_attr(&item, "updated_at").unwrap_or(created_at);
        let last_login = time_attr(&item, "last_login");

        let is_active = item
            .get("is_active")
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(true);

        Ok(User {
            id,
            email,
            name,
            password_hash,
            created_at,
            updated_at,
            last_login,
            is_active,
        })
    }
}

type Item = HashMap<String, AttributeValue>;

/// Fetches scan pages until one yields an item. Filtered scans can return
/// empty pages while `last_evaluated_key` says more of the table remains.
async fn first_item_across_pages<F, Fut>(mut fetch_page: F) -> Result<Option<Item>, RepositoryError>
where
    F: FnMut(Option<Item>) -> Fut,
    Fut: Future<Output = Result<(Vec<Item>, Option<Item>), RepositoryError>>,
{
    let mut start_key = None;
    loop {
        let (items, last_key) = fetch_page(start_key.take()).await?;
        if let Some(item) = items.into_iter().next() {
            return Ok(Some(item));
        }
        match last_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => return Ok(None),
        }
    }
}

fn string_attr(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid {}", key)))
}

fn time_attr(item: &HashMap<String, AttributeValue>, key: &str) -> Option<DateTime<Utc>> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let key = email_key(email);
        let item = first_item_across_pages(|start_key| {
            let request = self
                .client
                .scan()
                .table_name(&self.users_table)
                .filter_expression("email_key = :email_key")
                .expression_attribute_values(":email_key", AttributeValue::S(key.clone()))
                .set_exclusive_start_key(start_key);
            async move {
                let page = request
                    .send()
                    .await
                    .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;
                Ok((page.items.unwrap_or_default(), page.last_evaluated_key))
            }
        })
        .await?;

        item.map(|item| self.parse_user_from_item(item)).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.users_table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(self.parse_user_from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        // TODO: key an index on email_key so uniqueness is enforced by a
        // conditional write instead of this scan-then-put.
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(RepositoryError::EmailTaken);
        }

        let user = User::from_new(new_user);
        self.put_user(&user).await?;
        Ok(user)
    }

    async fn touch_login(&self, id: Uuid) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        self.client
            .update_item()
            .table_name(&self.users_table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET last_login = :now, updated_at = :now")
            .expression_attribute_values(":now", AttributeValue::S(now))
            .send()
            .await
            .map_err(|e| {
                log::error!("DynamoDB update_item failed for user {}: {:?}", id, e);
                RepositoryError::DynamoDb(e.to_string())
            })?;
        Ok(())
    }
}
