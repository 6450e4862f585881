use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity},
    entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel},
    errors::ServiceError,
    services::order_lines,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Service for user records, including the order/line cascade on delete.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<UserModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let email = request.email.clone();

        let user = UserActiveModel {
            name: Set(request.name),
            email: Set(request.email),
            address: Set(request.address),
            ..Default::default()
        };

        let model = user.insert(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                warn!(email = %email, "Rejected duplicate email");
                ServiceError::EmailTaken(email.clone())
            } else {
                error!(error = %e, "Failed to create user");
                e.into()
            }
        })?;

        info!(user_id = model.id, "User created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i32) -> Result<UserModel, ServiceError> {
        UserEntity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserModel>, ServiceError> {
        Ok(UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    /// Updates name, email, or address. Email uniqueness is re-checked by the
    /// unique index when the email changes.
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        user_id: i32,
        request: UpdateUserRequest,
    ) -> Result<UserModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let user = UserEntity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let new_email = request.email.clone();
        let mut active: UserActiveModel = user.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }

        let model = active.update(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::EmailTaken(new_email.unwrap_or_default())
            } else {
                error!(error = %e, user_id, "Failed to update user");
                e.into()
            }
        })?;

        info!(user_id, "User updated");
        Ok(model)
    }

    /// Deletes a user and, in the same transaction, every order the user owns
    /// together with those orders' lines.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await?;

        UserEntity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let order_ids: Vec<i32> = OrderEntity::find()
            .select_only()
            .column(order::Column::Id)
            .filter(order::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&txn)
            .await?;

        for order_id in &order_ids {
            order_lines::remove_lines_for_order(&txn, *order_id).await?;
        }

        OrderEntity::delete_many()
            .filter(order::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        UserEntity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;

        info!(user_id, orders_removed = order_ids.len(), "User deleted");
        Ok(())
    }
}
