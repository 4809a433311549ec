use crate::{
    db::DbPool,
    entities::{
        comment::{self, Entity as CommentEntity},
        part::Entity as PartEntity,
        service_order::{self, Entity as OrderEntity, OrderStatus},
        service_task::{self, Entity as TaskEntity},
        used_part::{self, Entity as UsedPartEntity},
        vehicle::Entity as VehicleEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::costing::{OrderAggregate, TaskAggregate, UsedPartLine},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 500, message = "Description must be between 1 and 500 characters"))]
    pub description: String,
    pub vehicle_id: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Description must be between 1 and 200 characters"))]
    pub description: String,
    pub labor_cost: Decimal,
    pub assigned_mechanic_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"))]
    pub content: String,
}

/// An order decorated with its derived cost totals
#[derive(Debug, Serialize)]
pub struct OrderWithTotals {
    #[serde(flatten)]
    pub order: service_order::Model,
    pub total_labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_cost: Decimal,
}

impl From<&OrderAggregate> for OrderWithTotals {
    fn from(agg: &OrderAggregate) -> Self {
        Self {
            order: agg.order.clone(),
            total_labor_cost: agg.total_labor_cost(),
            total_parts_cost: agg.total_parts_cost(),
            total_cost: agg.total_cost(),
        }
    }
}

/// Service for managing service orders
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(vehicle_id = %request.vehicle_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<service_order::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        VehicleEntity::find_by_id(request.vehicle_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Vehicle with ID {} not found",
                    request.vehicle_id
                ))
            })?;

        let order = service_order::ActiveModel {
            description: Set(request.description),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
            status: Set(OrderStatus::Created),
            assigned_mechanic_id: Set(None),
            vehicle_id: Set(request.vehicle_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order.id, "Service order created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order.id)).await {
                warn!(error = %e, order_id = %order.id, "Failed to send order created event");
            }
        }

        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<service_order::Model, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Service order with ID {} not found", order_id))
            })
    }

    /// Loads the full order subtree: the order, its tasks, and each task's
    /// used-part lines joined with the parts they consumed. All cost totals
    /// are derived from this snapshot.
    #[instrument(skip(self))]
    pub async fn load_order_aggregate(&self, order_id: i32) -> Result<OrderAggregate, ServiceError> {
        let db = &*self.db_pool;
        let order = self.get_order(order_id).await?;

        let tasks = TaskEntity::find()
            .filter(service_task::Column::ServiceOrderId.eq(order_id))
            .order_by_asc(service_task::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let lines = UsedPartEntity::find()
            .filter(used_part::Column::ServiceOrderId.eq(order_id))
            .find_also_related(PartEntity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut aggregates: Vec<TaskAggregate> = tasks
            .into_iter()
            .map(|task| TaskAggregate {
                task,
                parts: Vec::new(),
            })
            .collect();

        for (usage, maybe_part) in lines {
            let part = maybe_part.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "used-part record {} references a missing part",
                    usage.id
                ))
            })?;
            if let Some(agg) = aggregates
                .iter_mut()
                .find(|a| a.task.id == usage.service_task_id)
            {
                agg.parts.push(UsedPartLine {
                    used_part: usage,
                    part,
                });
            }
        }

        Ok(OrderAggregate {
            order,
            tasks: aggregates,
        })
    }

    /// Order with its derived cost totals
    #[instrument(skip(self))]
    pub async fn get_order_with_totals(
        &self,
        order_id: i32,
    ) -> Result<OrderWithTotals, ServiceError> {
        let aggregate = self.load_order_aggregate(order_id).await?;
        Ok(OrderWithTotals::from(&aggregate))
    }

    /// Lists orders with pagination, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<service_order::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = OrderEntity::find()
            .order_by_desc(service_order::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((orders, total))
    }

    /// Orders that are neither completed nor cancelled
    #[instrument(skip(self))]
    pub async fn active_orders(&self) -> Result<Vec<service_order::Model>, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find()
            .filter(service_order::Column::Status.is_in([OrderStatus::Created, OrderStatus::InProgress]))
            .order_by_desc(service_order::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Orders for one vehicle, newest first
    #[instrument(skip(self))]
    pub async fn get_vehicle_orders(
        &self,
        vehicle_id: i32,
    ) -> Result<Vec<service_order::Model>, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find()
            .filter(service_order::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(service_order::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        order_id: i32,
        request: UpdateOrderRequest,
    ) -> Result<service_order::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let order = self.get_order(order_id).await?;

        let mut active: service_order::ActiveModel = order.into();
        if let Some(description) = request.description {
            active.description = Set(description);
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, "Service order updated");
        Ok(updated)
    }

    /// Deletes an order and everything hanging off it: tasks, their used-part
    /// ledger rows, and comments, all in one transaction. Stock consumed by
    /// the order is not restored.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let order = self.get_order(order_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        UsedPartEntity::delete_many()
            .filter(used_part::Column::ServiceOrderId.eq(order_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        TaskEntity::delete_many()
            .filter(service_task::Column::ServiceOrderId.eq(order_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        CommentEntity::delete_many()
            .filter(comment::Column::ServiceOrderId.eq(order_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        order.delete(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, "Service order deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderDeleted(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order deleted event");
            }
        }

        Ok(())
    }

    /// Moves an order to a new status. Transitions are deliberately
    /// unrestricted (a cancelled order can be reopened by the front desk);
    /// entering `Completed` stamps the completion time, leaving it clears it.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: i32,
        new_status: OrderStatus,
    ) -> Result<service_order::Model, ServiceError> {
        let db = &*self.db_pool;
        let order = self.get_order(order_id).await?;
        let old_status = order.status;

        if old_status == new_status {
            return Ok(order);
        }

        let mut active: service_order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.completed_at = Set(if new_status == OrderStatus::Completed {
            Some(Utc::now())
        } else {
            None
        });

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            "Service order status changed"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status: old_status.to_string(),
                    new_status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send status change event");
            }
        }

        Ok(updated)
    }

    /// Cancels an order; shorthand for a status change to `Cancelled`.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: i32) -> Result<service_order::Model, ServiceError> {
        self.update_order_status(order_id, OrderStatus::Cancelled)
            .await
    }

    /// Assigns a mechanic and moves the order to `InProgress` in the same
    /// write; assigning someone to the work is what starts it.
    #[instrument(skip(self))]
    pub async fn assign_mechanic(
        &self,
        order_id: i32,
        mechanic_id: &str,
    ) -> Result<service_order::Model, ServiceError> {
        if mechanic_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "mechanic id must not be empty".into(),
            ));
        }

        let db = &*self.db_pool;
        let order = self.get_order(order_id).await?;
        let old_status = order.status;

        let mut active: service_order::ActiveModel = order.into();
        active.assigned_mechanic_id = Set(Some(mechanic_id.to_string()));
        active.status = Set(OrderStatus::InProgress);
        if old_status == OrderStatus::Completed {
            active.completed_at = Set(None);
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, mechanic_id = %mechanic_id, "Mechanic assigned");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MechanicAssigned {
                    order_id,
                    mechanic_id: mechanic_id.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send mechanic assigned event");
            }
            if old_status != OrderStatus::InProgress {
                if let Err(e) = event_sender
                    .send(Event::OrderStatusChanged {
                        order_id,
                        old_status: old_status.to_string(),
                        new_status: OrderStatus::InProgress.to_string(),
                    })
                    .await
                {
                    warn!(error = %e, order_id = %order_id, "Failed to send status change event");
                }
            }
        }

        Ok(updated)
    }

    /// Adds a work item to an order
    #[instrument(skip(self, request))]
    pub async fn add_task(
        &self,
        order_id: i32,
        request: AddTaskRequest,
    ) -> Result<service_task::Model, ServiceError> {
        request.validate()?;

        if request.labor_cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "labor cost must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        self.get_order(order_id).await?;

        let task = service_task::ActiveModel {
            description: Set(request.description),
            labor_cost: Set(request.labor_cost),
            is_completed: Set(false),
            completed_at: Set(None),
            assigned_mechanic_id: Set(request.assigned_mechanic_id),
            service_order_id: Set(order_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, task_id = %task.id, "Task added to order");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::TaskAdded {
                    order_id,
                    task_id: task.id,
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send task added event");
            }
        }

        Ok(task)
    }

    /// Tasks belonging to an order
    #[instrument(skip(self))]
    pub async fn get_order_tasks(
        &self,
        order_id: i32,
    ) -> Result<Vec<service_task::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_order(order_id).await?;

        TaskEntity::find()
            .filter(service_task::Column::ServiceOrderId.eq(order_id))
            .order_by_asc(service_task::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Attaches a comment to an order, stamped with its author
    #[instrument(skip(self, request))]
    pub async fn add_comment(
        &self,
        order_id: i32,
        author_id: &str,
        request: AddCommentRequest,
    ) -> Result<comment::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        self.get_order(order_id).await?;

        let comment = comment::ActiveModel {
            content: Set(request.content),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now()),
            service_order_id: Set(order_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, comment_id = %comment.id, "Comment added");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::CommentAdded {
                    order_id,
                    comment_id: comment.id,
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send comment added event");
            }
        }

        Ok(comment)
    }

    /// Comments on an order, newest first
    #[instrument(skip(self))]
    pub async fn list_comments(&self, order_id: i32) -> Result<Vec<comment::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_order(order_id).await?;

        CommentEntity::find()
            .filter(comment::Column::ServiceOrderId.eq(order_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Every used-part line recorded against an order, across all its tasks
    #[instrument(skip(self))]
    pub async fn list_order_used_parts(
        &self,
        order_id: i32,
    ) -> Result<Vec<UsedPartLine>, ServiceError> {
        let db = &*self.db_pool;
        self.get_order(order_id).await?;

        let lines = UsedPartEntity::find()
            .filter(used_part::Column::ServiceOrderId.eq(order_id))
            .find_also_related(PartEntity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut result = Vec::with_capacity(lines.len());
        for (usage, maybe_part) in lines {
            let part = maybe_part.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "used-part record {} references a missing part",
                    usage.id
                ))
            })?;
            result.push(UsedPartLine {
                used_part: usage,
                part,
            });
        }

        Ok(result)
    }
}
