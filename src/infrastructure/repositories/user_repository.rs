//! SeaORM implementation of UserRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::lending;
use crate::domain::{DomainError, UserInput, UserQuery, UserRepository, UserUpdate};
use crate::models::User;
use crate::models::loan::{self, Entity as LoanEntity, LoanStatus};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity, Model, UserStatus};
use super::contains_literal;

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn active_loan_count(&self, user_id: i32) -> Result<u64, DomainError> {
        let count = LoanEntity::find()
            .filter(loan::Column::UserId.eq(user_id))
            .filter(loan::Column::Status.eq(LoanStatus::Active))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn with_loan_count(&self, model: Model) -> Result<User, DomainError> {
        let active_loans = self.active_loan_count(model.id).await?;
        Ok(User::from_model(model, active_loans))
    }
}

/// Turn the listing filter into a query condition
fn filter_condition(query: &UserQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(q) = &query.search
        && !q.trim().is_empty()
    {
        let q = q.trim();
        condition = condition.add(
            Condition::any()
                .add(contains_literal(Column::Name, q))
                .add(contains_literal(Column::Email, q)),
        );
    }

    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status));
    }

    condition
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound(format!("User {} not found", id))
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self, query: UserQuery) -> Result<Vec<User>, DomainError> {
        let users = UserEntity::find()
            .filter(filter_condition(&query))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?;

        let user_ids: Vec<i32> = users.iter().map(|u| u.id).collect();

        // Count active loans per member in one query
        let mut loan_counts: HashMap<i32, u64> = HashMap::new();
        if !user_ids.is_empty() {
            let active_loans = LoanEntity::find()
                .filter(loan::Column::UserId.is_in(user_ids))
                .filter(loan::Column::Status.eq(LoanStatus::Active))
                .all(&self.db)
                .await?;
            for active in active_loans {
                *loan_counts.entry(active.user_id).or_insert(0) += 1;
            }
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let count = loan_counts.get(&user.id).copied().unwrap_or(0);
                User::from_model(user, count)
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        match UserEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(self.with_loan_count(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let user = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;

        match user {
            Some(model) => Ok(Some(self.with_loan_count(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: UserInput) -> Result<User, DomainError> {
        let now = chrono::Utc::now();

        let new_user = ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            membership_type: Set(input.membership_type),
            status: Set(UserStatus::Active),
            join_date: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_user.insert(&self.db).await?;
        Ok(User::from_model(result, 0))
    }

    async fn update(&self, id: i32, input: UserUpdate) -> Result<User, DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(id))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.membership_type = Set(input.membership_type);
        active.status = Set(input.status);
        active.updated_at = Set(chrono::Utc::now());

        let result = active.update(&self.db).await?;
        self.with_loan_count(result).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        UserEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let active_loans = LoanEntity::find()
            .filter(loan::Column::UserId.eq(id))
            .filter(loan::Column::Status.eq(LoanStatus::Active))
            .count(&txn)
            .await?;
        lending::ensure_no_active_loans(active_loans, "user")?;

        // Returned loans go with the record
        LoanEntity::delete_many()
            .filter(loan::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = UserEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(not_found(id));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn count_active(&self) -> Result<u64, DomainError> {
        let count = UserEntity::find()
            .filter(Column::Status.eq(UserStatus::Active))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
