use crate::{
    db::DbPool,
    entities::{
        part::{self, Entity as PartEntity},
        service_task::{self, Entity as TaskEntity},
        used_part::{self, Entity as UsedPartEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::costing::{TaskAggregate, UsedPartLine},
    services::parts::LOW_STOCK_THRESHOLD,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub description: Option<String>,
    pub labor_cost: Option<Decimal>,
    pub assigned_mechanic_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecordUsedPartRequest {
    pub part_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Service for managing service tasks and the used-part ledger
#[derive(Clone)]
pub struct TaskService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl TaskService {
    /// Creates a new task service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_task(&self, task_id: i32) -> Result<service_task::Model, ServiceError> {
        let db = &*self.db_pool;

        TaskEntity::find_by_id(task_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Task with ID {} not found", task_id)))
    }

    /// Loads a task together with its used-part lines and the referenced parts
    #[instrument(skip(self))]
    pub async fn get_task_with_parts(&self, task_id: i32) -> Result<TaskAggregate, ServiceError> {
        let db = &*self.db_pool;
        let task = self.get_task(task_id).await?;

        let lines = UsedPartEntity::find()
            .filter(used_part::Column::ServiceTaskId.eq(task_id))
            .find_also_related(PartEntity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut parts = Vec::with_capacity(lines.len());
        for (usage, maybe_part) in lines {
            let part = maybe_part.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "used-part record {} references a missing part",
                    usage.id
                ))
            })?;
            parts.push(UsedPartLine {
                used_part: usage,
                part,
            });
        }

        Ok(TaskAggregate { task, parts })
    }

    #[instrument(skip(self, request))]
    pub async fn update_task(
        &self,
        task_id: i32,
        request: UpdateTaskRequest,
    ) -> Result<service_task::Model, ServiceError> {
        request.validate()?;

        if matches!(request.labor_cost, Some(c) if c < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "labor cost must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let task = self.get_task(task_id).await?;

        let mut active: service_task::ActiveModel = task.into();
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(labor_cost) = request.labor_cost {
            active.labor_cost = Set(labor_cost);
        }
        if let Some(mechanic_id) = request.assigned_mechanic_id {
            active.assigned_mechanic_id = Set(Some(mechanic_id));
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(task_id = %task_id, "Task updated");
        Ok(updated)
    }

    /// Marks a task completed and stamps the completion time. Completing an
    /// already-completed task is a no-op.
    #[instrument(skip(self))]
    pub async fn complete_task(&self, task_id: i32) -> Result<service_task::Model, ServiceError> {
        let db = &*self.db_pool;
        let task = self.get_task(task_id).await?;

        if task.is_completed {
            return Ok(task);
        }

        let mut active: service_task::ActiveModel = task.into();
        active.is_completed = Set(true);
        active.completed_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(task_id = %task_id, "Task completed");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::TaskCompleted(task_id)).await {
                warn!(error = %e, task_id = %task_id, "Failed to send task completed event");
            }
        }

        Ok(updated)
    }

    /// Deletes a task and its used-part ledger rows. Consumed stock is not
    /// restored; the parts left the shelf regardless of the record.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, task_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let task = self.get_task(task_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        UsedPartEntity::delete_many()
            .filter(used_part::Column::ServiceTaskId.eq(task_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        task.delete(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(task_id = %task_id, "Task deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::TaskDeleted(task_id)).await {
                warn!(error = %e, task_id = %task_id, "Failed to send task deleted event");
            }
        }

        Ok(())
    }

    /// Records part consumption against a task and decrements tracked stock.
    ///
    /// The decrement is a conditional UPDATE (`stock_quantity >= quantity` in
    /// the WHERE clause) executed in the same transaction as the ledger
    /// insert, so concurrent recordings against the last units on the shelf
    /// serialize at the database: one succeeds, the other gets
    /// `InsufficientStock`, and the quantity never goes negative.
    #[instrument(skip(self, request), fields(part_id = %request.part_id, quantity = %request.quantity))]
    pub async fn record_used_part(
        &self,
        task_id: i32,
        request: RecordUsedPartRequest,
    ) -> Result<used_part::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let task = self.get_task(task_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let part = PartEntity::find_by_id(request.part_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Part with ID {} not found", request.part_id))
            })?;

        // Untracked stock (NULL) skips the decrement entirely.
        if part.stock_quantity.is_some() {
            let result = PartEntity::update_many()
                .col_expr(
                    part::Column::StockQuantity,
                    Expr::col(part::Column::StockQuantity).sub(request.quantity),
                )
                .filter(part::Column::Id.eq(request.part_id))
                .filter(part::Column::StockQuantity.gte(request.quantity))
                .exec(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if result.rows_affected == 0 {
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(ServiceError::InsufficientStock(format!(
                    "Insufficient stock for part {}: requested {}, available {}",
                    request.part_id,
                    request.quantity,
                    part.stock_quantity.unwrap_or(0)
                )));
            }
        }

        let usage = used_part::ActiveModel {
            quantity: Set(request.quantity),
            service_task_id: Set(task_id),
            part_id: Set(request.part_id),
            service_order_id: Set(task.service_order_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, task_id = %task_id, "Failed to insert used-part record");
            ServiceError::DatabaseError(e)
        })?;

        let remaining_stock = match part.stock_quantity {
            Some(_) => PartEntity::find_by_id(request.part_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .and_then(|p| p.stock_quantity),
            None => None,
        };

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            task_id = %task_id,
            part_id = %request.part_id,
            quantity = %request.quantity,
            remaining_stock = ?remaining_stock,
            "Used part recorded"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::UsedPartRecorded {
                    task_id,
                    part_id: request.part_id,
                    quantity: request.quantity,
                    remaining_stock,
                })
                .await
            {
                warn!(error = %e, task_id = %task_id, "Failed to send used part event");
            }
            if let Some(remaining) = remaining_stock {
                if remaining <= LOW_STOCK_THRESHOLD {
                    if let Err(e) = event_sender
                        .send(Event::LowStock {
                            part_id: request.part_id,
                            remaining,
                        })
                        .await
                    {
                        warn!(error = %e, part_id = %request.part_id, "Failed to send low stock event");
                    }
                }
            }
        }

        Ok(usage)
    }

    /// Used-part lines for one task
    #[instrument(skip(self))]
    pub async fn get_task_parts(&self, task_id: i32) -> Result<Vec<UsedPartLine>, ServiceError> {
        Ok(self.get_task_with_parts(task_id).await?.parts)
    }

    /// All tasks currently assigned to the given mechanic
    #[instrument(skip(self))]
    pub async fn get_mechanic_tasks(
        &self,
        mechanic_id: &str,
    ) -> Result<Vec<service_task::Model>, ServiceError> {
        let db = &*self.db_pool;

        TaskEntity::find()
            .filter(service_task::Column::AssignedMechanicId.eq(mechanic_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
