//! User Service - Member registration and maintenance

use std::sync::Arc;

use validator::Validate;

use crate::domain::{DomainError, UserInput, UserQuery, UserRepository, UserUpdate};
use crate::models::User;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn list_users(&self, query: UserQuery) -> Result<Vec<User>, DomainError> {
        tracing::info!(
            "List users - Filters: search={:?}, status={:?}",
            query.search,
            query.status
        );
        self.users.find_all(query).await
    }

    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))
    }

    pub async fn create_user(&self, input: UserInput) -> Result<User, DomainError> {
        input.validate()?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Email {} already exists",
                input.email
            )));
        }

        let user = self.users.create(input).await?;
        tracing::info!("User {} registered as {:?}", user.id, user.membership_type);
        Ok(user)
    }

    pub async fn update_user(&self, id: i32, input: UserUpdate) -> Result<User, DomainError> {
        input.validate()?;

        let existing = self.get_user(id).await?;

        if input.email != existing.email
            && let Some(other) = self.users.find_by_email(&input.email).await?
            && other.id != id
        {
            return Err(DomainError::Conflict(format!(
                "Email {} already exists",
                input.email
            )));
        }

        let user = self.users.update(id, input).await?;
        tracing::info!("User {} updated (status {:?})", user.id, user.status);
        Ok(user)
    }

    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        self.users.delete(id).await?;
        tracing::info!("User {} deleted", id);
        Ok(())
    }

    pub async fn count_active_users(&self) -> Result<u64, DomainError> {
        self.users.count_active().await
    }
}
