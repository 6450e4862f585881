use crate::{
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    entities::user::Entity as UserEntity,
    errors::ServiceError,
    services::order_lines,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub user_id: i32,
    /// ISO-8601 order date; defaults to the creation time when absent.
    pub order_date: Option<String>,
}

/// Parses an ISO-8601 order date. Accepts a full RFC 3339 timestamp or a
/// bare date, which is taken as midnight UTC.
fn parse_order_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(ServiceError::ValidationError(format!(
        "order_date '{raw}' is not a valid ISO-8601 timestamp"
    )))
}

/// Service for order records. Orders are only mutated through their lines,
/// so there is no update path here.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        let order_date = match request.order_date.as_deref() {
            Some(raw) => parse_order_date(raw)?,
            None => Utc::now(),
        };

        let db = &*self.db_pool;
        UserEntity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::UserNotFound(request.user_id))?;

        let order = OrderActiveModel {
            user_id: Set(request.user_id),
            order_date: Set(order_date),
            ..Default::default()
        };

        let model = order.insert(db).await?;
        info!(order_id = model.id, user_id = model.user_id, "Order created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderModel>, ServiceError> {
        Ok(OrderEntity::find()
            .order_by_asc(order::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    /// Deletes an order and, in the same transaction, all of its lines.
    /// The products referenced by those lines are untouched.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await?;

        OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        let lines_removed = order_lines::remove_lines_for_order(&txn, order_id).await?;
        OrderEntity::delete_by_id(order_id).exec(&txn).await?;

        txn.commit().await?;

        info!(order_id, lines_removed, "Order deleted");
        Ok(())
    }
}
