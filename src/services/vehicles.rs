use crate::{
    db::DbPool,
    entities::{
        customer::Entity as CustomerEntity,
        service_order,
        vehicle::{self, Entity as VehicleEntity},
    },
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 17, message = "VIN must be between 1 and 17 characters"))]
    pub vin: String,
    #[validate(length(min = 1, max = 20))]
    pub registration_number: String,
    #[validate(length(min = 1, max = 50))]
    pub make: String,
    #[validate(length(min = 1, max = 50))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    pub customer_id: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 20))]
    pub registration_number: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub make: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

/// Service for managing vehicles
#[derive(Clone)]
pub struct VehicleService {
    db_pool: Arc<DbPool>,
}

impl VehicleService {
    /// Creates a new vehicle service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(vin = %request.vin))]
    pub async fn create_vehicle(
        &self,
        request: CreateVehicleRequest,
    ) -> Result<vehicle::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Customer with ID {} not found",
                    request.customer_id
                ))
            })?;

        let vehicle = vehicle::ActiveModel {
            vin: Set(request.vin),
            registration_number: Set(request.registration_number),
            make: Set(request.make),
            model: Set(request.model),
            year: Set(request.year),
            image_url: Set(request.image_url),
            customer_id: Set(request.customer_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create vehicle");
            ServiceError::DatabaseError(e)
        })?;

        info!(vehicle_id = %vehicle.id, "Vehicle created");
        Ok(vehicle)
    }

    #[instrument(skip(self))]
    pub async fn get_vehicle(&self, vehicle_id: i32) -> Result<vehicle::Model, ServiceError> {
        let db = &*self.db_pool;

        VehicleEntity::find_by_id(vehicle_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vehicle with ID {} not found", vehicle_id))
            })
    }

    /// Lists vehicles with pagination
    #[instrument(skip(self))]
    pub async fn list_vehicles(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<vehicle::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = VehicleEntity::find().paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let vehicles = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((vehicles, total))
    }

    /// Vehicles owned by one customer
    #[instrument(skip(self))]
    pub async fn get_customer_vehicles(
        &self,
        customer_id: i32,
    ) -> Result<Vec<vehicle::Model>, ServiceError> {
        let db = &*self.db_pool;

        VehicleEntity::find()
            .filter(vehicle::Column::CustomerId.eq(customer_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, request))]
    pub async fn update_vehicle(
        &self,
        vehicle_id: i32,
        request: UpdateVehicleRequest,
    ) -> Result<vehicle::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let vehicle = self.get_vehicle(vehicle_id).await?;

        let mut active: vehicle::ActiveModel = vehicle.into();
        if let Some(registration_number) = request.registration_number {
            active.registration_number = Set(registration_number);
        }
        if let Some(make) = request.make {
            active.make = Set(make);
        }
        if let Some(model) = request.model {
            active.model = Set(model);
        }
        if let Some(year) = request.year {
            active.year = Set(year);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(vehicle_id = %vehicle_id, "Vehicle updated");
        Ok(updated)
    }

    /// Deletes a vehicle. Rejected while service orders reference it; the
    /// service history stays queryable.
    #[instrument(skip(self))]
    pub async fn delete_vehicle(&self, vehicle_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let vehicle = self.get_vehicle(vehicle_id).await?;

        let order_count = service_order::Entity::find()
            .filter(service_order::Column::VehicleId.eq(vehicle_id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if order_count > 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Vehicle {} has {} service order(s) and cannot be deleted",
                vehicle_id, order_count
            )));
        }

        vehicle.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(vehicle_id = %vehicle_id, "Vehicle deleted");
        Ok(())
    }
}
