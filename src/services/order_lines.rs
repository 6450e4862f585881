use crate::{
    db::DbPool,
    entities::order::Entity as OrderEntity,
    entities::order_line::{self, ActiveModel as OrderLineActiveModel, Entity as OrderLineEntity},
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Default quantity for a line added without an explicit amount.
const DEFAULT_QUANTITY: i32 = 1;

/// Manages the order/product association: one line per (order, product) pair,
/// each carrying a positive quantity.
///
/// The uniqueness invariant is enforced by the composite primary key on the
/// order_lines table. `add_product` is a plain insert whose constraint
/// violation is classified as `DuplicateAssociation`, so two racing inserts
/// for the same pair resolve to exactly one success at the storage boundary.
#[derive(Clone)]
pub struct OrderLineService {
    db_pool: Arc<DbPool>,
}

fn validate_quantity(quantity: i32) -> Result<i32, ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

/// Fails with `OrderNotFound` unless the order exists.
async fn ensure_order_exists<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
) -> Result<(), ServiceError> {
    OrderEntity::find_by_id(order_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(ServiceError::OrderNotFound(order_id))
}

/// Fails with `ProductNotFound` unless the product exists.
async fn ensure_product_exists<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<(), ServiceError> {
    ProductEntity::find_by_id(product_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(ServiceError::ProductNotFound(product_id))
}

/// Deletes every line belonging to an order. Called inside the order-delete
/// transaction so no reader observes a line for a deleted order.
pub async fn remove_lines_for_order<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
) -> Result<u64, ServiceError> {
    let result = OrderLineEntity::delete_many()
        .filter(order_line::Column::OrderId.eq(order_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Deletes every line referencing a product. Called inside the product-delete
/// transaction so no reader observes a line for a deleted product.
pub async fn remove_lines_for_product<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<u64, ServiceError> {
    let result = OrderLineEntity::delete_many()
        .filter(order_line::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

impl OrderLineService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Attaches a product to an order with the given quantity (default 1).
    ///
    /// Strictly an insert: a line that already exists fails with
    /// `DuplicateAssociation` rather than updating the quantity.
    #[instrument(skip(self), fields(order_id = order_id, product_id = product_id))]
    pub async fn add_product(
        &self,
        order_id: i32,
        product_id: i32,
        quantity: Option<i32>,
    ) -> Result<order_line::Model, ServiceError> {
        let quantity = validate_quantity(quantity.unwrap_or(DEFAULT_QUANTITY))?;

        let db = &*self.db_pool;
        ensure_order_exists(db, order_id).await?;
        ensure_product_exists(db, product_id).await?;

        let line = OrderLineActiveModel {
            order_id: Set(order_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
        };

        // The composite primary key decides the race; the existence checks
        // above only pick which not-found error to report.
        let model = line.insert(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                warn!(order_id, product_id, "Duplicate order line rejected");
                ServiceError::DuplicateAssociation {
                    order_id,
                    product_id,
                }
            } else {
                error!(error = %e, order_id, product_id, "Failed to insert order line");
                e.into()
            }
        })?;

        info!(order_id, product_id, quantity, "Product added to order");
        Ok(model)
    }

    /// Detaches a product from an order.
    #[instrument(skip(self), fields(order_id = order_id, product_id = product_id))]
    pub async fn remove_product(
        &self,
        order_id: i32,
        product_id: i32,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        ensure_order_exists(db, order_id).await?;
        ensure_product_exists(db, product_id).await?;

        let result = OrderLineEntity::delete_by_id((order_id, product_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::AssociationNotFound {
                order_id,
                product_id,
            });
        }

        info!(order_id, product_id, "Product removed from order");
        Ok(())
    }

    /// Lists every product on an order, paired with its line quantity.
    /// Ordered by product id so repeated reads of one snapshot agree.
    #[instrument(skip(self), fields(order_id = order_id))]
    pub async fn list_products(
        &self,
        order_id: i32,
    ) -> Result<Vec<(product::Model, i32)>, ServiceError> {
        let db = &*self.db_pool;
        ensure_order_exists(db, order_id).await?;

        let lines = OrderLineEntity::find()
            .filter(order_line::Column::OrderId.eq(order_id))
            .order_by_asc(order_line::Column::ProductId)
            .find_also_related(ProductEntity)
            .all(db)
            .await?;

        lines
            .into_iter()
            .map(|(line, product)| {
                // Cascades run inside the delete transactions, so a line
                // without its product means the store is corrupt.
                let product = product.ok_or_else(|| {
                    error!(
                        order_id,
                        product_id = line.product_id,
                        "Order line references a missing product"
                    );
                    ServiceError::DatabaseError(sea_orm::DbErr::RecordNotFound(format!(
                        "product {} for order line ({}, {})",
                        line.product_id, line.order_id, line.product_id
                    )))
                })?;
                Ok((product, line.quantity))
            })
            .collect()
    }

    /// Corrects the quantity of an existing line without a remove/add cycle.
    ///
    /// Executed as one filtered UPDATE so concurrent writers to the same pair
    /// never interleave partial effects.
    #[instrument(skip(self), fields(order_id = order_id, product_id = product_id, quantity = quantity))]
    pub async fn update_quantity(
        &self,
        order_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<order_line::Model, ServiceError> {
        let quantity = validate_quantity(quantity)?;

        let db = &*self.db_pool;
        ensure_order_exists(db, order_id).await?;
        ensure_product_exists(db, product_id).await?;

        let result = OrderLineEntity::update_many()
            .col_expr(order_line::Column::Quantity, Expr::value(quantity))
            .filter(order_line::Column::OrderId.eq(order_id))
            .filter(order_line::Column::ProductId.eq(product_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::AssociationNotFound {
                order_id,
                product_id,
            });
        }

        let line = OrderLineEntity::find_by_id((order_id, product_id))
            .one(db)
            .await?
            .ok_or(ServiceError::AssociationNotFound {
                order_id,
                product_id,
            })?;

        info!(order_id, product_id, quantity, "Order line quantity updated");
        Ok(line)
    }
}
