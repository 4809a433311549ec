use crate::{
    db::DbPool,
    entities::{
        part::{self, Entity as PartEntity},
        used_part::{self, Entity as UsedPartEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// Parts with tracked stock at or below this level are flagged for reordering.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePartRequest {
    #[validate(length(min = 1, max = 100, message = "Part name must be between 1 and 100 characters"))]
    pub name: String,
    pub unit_price: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub part_number: Option<String>,
    pub stock_quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdatePartRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub part_number: Option<String>,
}

/// Service for managing the parts inventory
#[derive(Clone)]
pub struct PartService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PartService {
    /// Creates a new part service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(part_name = %request.name))]
    pub async fn create_part(&self, request: CreatePartRequest) -> Result<part::Model, ServiceError> {
        request.validate()?;

        if request.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit price must not be negative".into(),
            ));
        }
        if matches!(request.stock_quantity, Some(q) if q < 0) {
            return Err(ServiceError::ValidationError(
                "stock quantity must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;

        let part = part::ActiveModel {
            name: Set(request.name),
            unit_price: Set(request.unit_price),
            description: Set(request.description),
            part_number: Set(request.part_number),
            stock_quantity: Set(request.stock_quantity),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create part");
            ServiceError::DatabaseError(e)
        })?;

        info!(part_id = %part.id, "Part created");
        Ok(part)
    }

    #[instrument(skip(self))]
    pub async fn get_part(&self, part_id: i32) -> Result<part::Model, ServiceError> {
        let db = &*self.db_pool;

        PartEntity::find_by_id(part_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Part with ID {} not found", part_id)))
    }

    /// Lists parts with pagination
    #[instrument(skip(self))]
    pub async fn list_parts(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<part::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = PartEntity::find().paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let parts = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((parts, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_part(
        &self,
        part_id: i32,
        request: UpdatePartRequest,
    ) -> Result<part::Model, ServiceError> {
        request.validate()?;

        if matches!(request.unit_price, Some(p) if p < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "unit price must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let part = self.get_part(part_id).await?;

        let mut active: part::ActiveModel = part.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(price) = request.unit_price {
            active.unit_price = Set(price);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(part_number) = request.part_number {
            active.part_number = Set(Some(part_number));
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(part_id = %part_id, "Part updated");
        Ok(updated)
    }

    /// Deletes a part. Rejected while used-part rows still reference it; usage
    /// history must outlive the catalog entry.
    #[instrument(skip(self))]
    pub async fn delete_part(&self, part_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let part = self.get_part(part_id).await?;

        let usage_count = UsedPartEntity::find()
            .filter(used_part::Column::PartId.eq(part_id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if usage_count > 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Part {} is referenced by {} used-part record(s) and cannot be deleted",
                part_id, usage_count
            )));
        }

        let active: part::ActiveModel = part.into();
        active.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(part_id = %part_id, "Part deleted");
        Ok(())
    }

    /// Substring search over part name and description
    #[instrument(skip(self))]
    pub async fn search_parts(&self, query: &str) -> Result<Vec<part::Model>, ServiceError> {
        let db = &*self.db_pool;
        let pattern = format!("%{}%", query);

        PartEntity::find()
            .filter(
                Condition::any()
                    .add(part::Column::Name.like(pattern.clone()))
                    .add(part::Column::Description.like(pattern)),
            )
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Tracked parts at or below the low-stock threshold
    #[instrument(skip(self))]
    pub async fn low_stock_parts(&self) -> Result<Vec<part::Model>, ServiceError> {
        let db = &*self.db_pool;

        PartEntity::find()
            .filter(part::Column::StockQuantity.is_not_null())
            .filter(part::Column::StockQuantity.lte(LOW_STOCK_THRESHOLD))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Applies a manual stock correction (receiving a delivery, fixing a
    /// count). The decrement path is a single conditional UPDATE so two
    /// concurrent adjustments cannot drive the quantity negative.
    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, part_id: i32, delta: i32) -> Result<part::Model, ServiceError> {
        let db = &*self.db_pool;
        let part = self.get_part(part_id).await?;

        if part.stock_quantity.is_none() {
            return Err(ServiceError::InvalidOperation(format!(
                "Stock is not tracked for part {}",
                part_id
            )));
        }

        let mut update = PartEntity::update_many()
            .col_expr(
                part::Column::StockQuantity,
                Expr::col(part::Column::StockQuantity).add(delta),
            )
            .filter(part::Column::Id.eq(part_id));
        if delta < 0 {
            update = update.filter(part::Column::StockQuantity.gte(-delta));
        }

        let result = update.exec(db).await.map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidOperation(
                "Stock quantity cannot be negative".to_string(),
            ));
        }

        let updated = self.get_part(part_id).await?;
        let new_quantity = updated.stock_quantity.unwrap_or(0);

        info!(part_id = %part_id, delta = %delta, new_quantity = %new_quantity, "Stock adjusted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::StockAdjusted {
                    part_id,
                    delta,
                    new_quantity,
                })
                .await
            {
                warn!(error = %e, part_id = %part_id, "Failed to send stock adjusted event");
            }
            if new_quantity <= LOW_STOCK_THRESHOLD {
                if let Err(e) = event_sender
                    .send(Event::LowStock {
                        part_id,
                        remaining: new_quantity,
                    })
                    .await
                {
                    warn!(error = %e, part_id = %part_id, "Failed to send low stock event");
                }
            }
        }

        Ok(updated)
    }

    /// Overwrites the stock count outright (counted delivery). Also enables
    /// tracking for a previously untracked part.
    #[instrument(skip(self))]
    pub async fn set_stock_quantity(
        &self,
        part_id: i32,
        quantity: i32,
    ) -> Result<part::Model, ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::ValidationError(
                "stock quantity must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let part = self.get_part(part_id).await?;

        let mut active: part::ActiveModel = part.into();
        active.stock_quantity = Set(Some(quantity));
        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(part_id = %part_id, quantity = %quantity, "Stock quantity set");
        Ok(updated)
    }

    /// Availability probe; untracked stock is always available.
    #[instrument(skip(self))]
    pub async fn is_part_available(
        &self,
        part_id: i32,
        requested_quantity: i32,
    ) -> Result<bool, ServiceError> {
        let part = self.get_part(part_id).await?;

        Ok(match part.stock_quantity {
            Some(stock) => stock >= requested_quantity,
            None => true,
        })
    }
}
