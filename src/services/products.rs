use crate::{
    db::DbPool,
    entities::product::{
        self, ActiveModel as ProductActiveModel, Entity as ProductEntity, Model as ProductModel,
    },
    errors::ServiceError,
    services::order_lines,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Product name must not be empty"))]
    pub product_name: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
}

/// Service for product records, including the line cascade on delete.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(product_name = %request.product_name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        request.validate()?;

        let product = ProductActiveModel {
            product_name: Set(request.product_name),
            price: Set(request.price),
            ..Default::default()
        };

        let model = product.insert(&*self.db_pool).await?;
        info!(product_id = model.id, "Product created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: i32) -> Result<ProductModel, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        product_id: i32,
        request: UpdateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))?;

        let mut active: ProductActiveModel = product.into();
        if let Some(product_name) = request.product_name {
            active.product_name = Set(product_name);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }

        let model = active.update(db).await?;
        info!(product_id, "Product updated");
        Ok(model)
    }

    /// Deletes a product and, in the same transaction, every order line that
    /// references it, so no order ever lists a vanished product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await?;

        ProductEntity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))?;

        let lines_removed = order_lines::remove_lines_for_product(&txn, product_id).await?;
        ProductEntity::delete_by_id(product_id).exec(&txn).await?;

        txn.commit().await?;

        info!(product_id, lines_removed, "Product deleted");
        Ok(())
    }
}
