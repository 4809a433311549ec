use crate::{
    db::DbPool,
    entities::{
        customer::{self, Entity as CustomerEntity},
        vehicle::{self, Entity as VehicleEntity},
    },
    errors::ServiceError,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
}

/// Customer update carrying the version the caller last read. The write only
/// lands if no one else updated the row in between.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    pub version: i32,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    /// Creates a new customer service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let customer = customer::ActiveModel {
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            address: Set(request.address),
            version: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: i32) -> Result<customer::Model, ServiceError> {
        let db = &*self.db_pool;

        CustomerEntity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer with ID {} not found", customer_id))
            })
    }

    /// Lists customers with pagination
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<customer::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = CustomerEntity::find().paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let customers = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((customers, total))
    }

    /// Substring search over name and email
    #[instrument(skip(self))]
    pub async fn search_customers(&self, query: &str) -> Result<Vec<customer::Model>, ServiceError> {
        let db = &*self.db_pool;
        let pattern = format!("%{}%", query);

        CustomerEntity::find()
            .filter(
                Condition::any()
                    .add(customer::Column::FirstName.like(pattern.clone()))
                    .add(customer::Column::LastName.like(pattern.clone()))
                    .add(customer::Column::Email.like(pattern)),
            )
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Updates a customer, guarded by the version column. A stale version in
    /// the request means someone else saved first; the caller gets
    /// `ConcurrentModification` and must re-read before retrying.
    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        customer_id: i32,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let customer = self.get_customer(customer_id).await?;

        if customer.version != request.version {
            return Err(ServiceError::ConcurrentModification(format!(
                "Customer {} was modified by another request (expected version {}, found {})",
                customer_id, request.version, customer.version
            )));
        }

        let mut update = CustomerEntity::update_many()
            .col_expr(
                customer::Column::Version,
                Expr::col(customer::Column::Version).add(1),
            )
            .filter(customer::Column::Id.eq(customer_id))
            .filter(customer::Column::Version.eq(request.version));

        if let Some(first_name) = request.first_name {
            update = update.col_expr(customer::Column::FirstName, Expr::value(first_name));
        }
        if let Some(last_name) = request.last_name {
            update = update.col_expr(customer::Column::LastName, Expr::value(last_name));
        }
        if let Some(email) = request.email {
            update = update.col_expr(customer::Column::Email, Expr::value(email));
        }
        if let Some(phone_number) = request.phone_number {
            update = update.col_expr(customer::Column::PhoneNumber, Expr::value(phone_number));
        }
        if let Some(address) = request.address {
            update = update.col_expr(customer::Column::Address, Expr::value(address));
        }

        let result = update.exec(db).await.map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            // Lost the race between the read above and this write.
            return Err(ServiceError::ConcurrentModification(format!(
                "Customer {} was modified by another request",
                customer_id
            )));
        }

        let updated = self.get_customer(customer_id).await?;

        info!(customer_id = %customer_id, version = %updated.version, "Customer updated");
        Ok(updated)
    }

    /// Deletes a customer and their vehicles. Rejected while any vehicle still
    /// has service orders.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let customer = self.get_customer(customer_id).await?;

        let vehicles = VehicleEntity::find()
            .filter(vehicle::Column::CustomerId.eq(customer_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        for v in &vehicles {
            let order_count = crate::entities::service_order::Entity::find()
                .filter(crate::entities::service_order::Column::VehicleId.eq(v.id))
                .count(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if order_count > 0 {
                return Err(ServiceError::InvalidOperation(format!(
                    "Customer {} has vehicle {} with service history and cannot be deleted",
                    customer_id, v.id
                )));
            }
        }

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        VehicleEntity::delete_many()
            .filter(vehicle::Column::CustomerId.eq(customer_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        customer
            .delete(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(customer_id = %customer_id, "Customer deleted");
        Ok(())
    }
}
