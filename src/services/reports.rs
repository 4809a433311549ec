use crate::{
    db::DbPool,
    entities::{
        customer::Entity as CustomerEntity,
        service_order::{self, Entity as OrderEntity, OrderStatus},
        vehicle::Entity as VehicleEntity,
    },
    errors::ServiceError,
    services::{costing::OrderAggregate, orders::OrderService},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// One part line inside a cost report
#[derive(Debug, Serialize)]
pub struct PartCostLine {
    pub part_id: i32,
    pub part_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_cost: Decimal,
}

/// One task inside a cost report
#[derive(Debug, Serialize)]
pub struct TaskCostLine {
    pub task_id: i32,
    pub description: String,
    pub labor_cost: Decimal,
    pub parts_cost: Decimal,
    pub parts: Vec<PartCostLine>,
}

/// Vehicle and owner header on a cost report
#[derive(Debug, Serialize)]
pub struct ReportHeader {
    pub vehicle_id: i32,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub registration_number: String,
    pub customer_id: i32,
    pub customer_name: String,
}

/// Itemized cost breakdown for a single order
#[derive(Debug, Serialize)]
pub struct OrderCostReport {
    pub order_id: i32,
    pub description: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub header: ReportHeader,
    pub tasks: Vec<TaskCostLine>,
    pub total_labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_cost: Decimal,
}

/// One order's contribution to a revenue summary
#[derive(Debug, Serialize)]
pub struct RevenueLine {
    pub order_id: i32,
    pub description: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub total_labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_cost: Decimal,
}

/// Revenue across orders created in a time window
#[derive(Debug, Serialize)]
pub struct RevenueSummary {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub orders: Vec<RevenueLine>,
    pub order_count: u64,
    pub total_labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_revenue: Decimal,
}

/// Read-only reporting over the order ledger. Rendering (PDF, spreadsheets)
/// is left to consumers of the JSON.
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    orders: OrderService,
}

impl ReportService {
    /// Creates a new report service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        let orders = OrderService::new(db_pool.clone(), None);
        Self { db_pool, orders }
    }

    async fn build_header(&self, vehicle_id: i32) -> Result<ReportHeader, ServiceError> {
        let db = &*self.db_pool;

        let vehicle = VehicleEntity::find_by_id(vehicle_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vehicle with ID {} not found", vehicle_id))
            })?;

        let customer = CustomerEntity::find_by_id(vehicle.customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Customer with ID {} not found",
                    vehicle.customer_id
                ))
            })?;

        Ok(ReportHeader {
            vehicle_id: vehicle.id,
            vehicle_make: vehicle.make,
            vehicle_model: vehicle.model,
            registration_number: vehicle.registration_number,
            customer_id: customer.id,
            customer_name: format!("{} {}", customer.first_name, customer.last_name),
        })
    }

    fn task_lines(aggregate: &OrderAggregate) -> Vec<TaskCostLine> {
        aggregate
            .tasks
            .iter()
            .map(|t| TaskCostLine {
                task_id: t.task.id,
                description: t.task.description.clone(),
                labor_cost: t.task.labor_cost,
                parts_cost: t.parts_cost(),
                parts: t
                    .parts
                    .iter()
                    .map(|line| PartCostLine {
                        part_id: line.part.id,
                        part_name: line.part.name.clone(),
                        quantity: line.used_part.quantity,
                        unit_price: line.part.unit_price,
                        line_cost: line.line_cost(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Itemized cost breakdown for one order, with the vehicle and owner in
    /// the header.
    #[instrument(skip(self))]
    pub async fn order_cost_report(&self, order_id: i32) -> Result<OrderCostReport, ServiceError> {
        let aggregate = self.orders.load_order_aggregate(order_id).await?;
        let header = self.build_header(aggregate.order.vehicle_id).await?;

        Ok(OrderCostReport {
            order_id: aggregate.order.id,
            description: aggregate.order.description.clone(),
            status: aggregate.order.status,
            created_at: aggregate.order.created_at,
            completed_at: aggregate.order.completed_at,
            header,
            tasks: Self::task_lines(&aggregate),
            total_labor_cost: aggregate.total_labor_cost(),
            total_parts_cost: aggregate.total_parts_cost(),
            total_cost: aggregate.total_cost(),
        })
    }

    /// Lists orders created inside the window with their derived totals and a
    /// grand total. Bounds are optional; an open bound means "since the
    /// beginning" or "until now".
    #[instrument(skip(self))]
    pub async fn revenue_summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<RevenueSummary, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find().order_by_asc(service_order::Column::CreatedAt);
        if let Some(from) = from {
            query = query.filter(service_order::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(service_order::Column::CreatedAt.lte(to));
        }

        let matched = query.all(db).await.map_err(ServiceError::DatabaseError)?;

        let mut lines = Vec::with_capacity(matched.len());
        let mut total_labor_cost = Decimal::ZERO;
        let mut total_parts_cost = Decimal::ZERO;

        for order in matched {
            let aggregate = self.orders.load_order_aggregate(order.id).await?;
            let labor = aggregate.total_labor_cost();
            let parts = aggregate.total_parts_cost();
            total_labor_cost += labor;
            total_parts_cost += parts;
            lines.push(RevenueLine {
                order_id: order.id,
                description: order.description,
                status: order.status,
                created_at: order.created_at,
                total_labor_cost: labor,
                total_parts_cost: parts,
                total_cost: labor + parts,
            });
        }

        Ok(RevenueSummary {
            from,
            to,
            order_count: lines.len() as u64,
            orders: lines,
            total_labor_cost,
            total_parts_cost,
            total_revenue: total_labor_cost + total_parts_cost,
        })
    }
}
