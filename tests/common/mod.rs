use rust_decimal::Decimal;
use std::sync::Arc;
use workshop_api::{
    db::{establish_connection, run_migrations, DbPool},
    services::{
        customers::{CreateCustomerRequest, CustomerService},
        orders::{AddTaskRequest, CreateOrderRequest, OrderService},
        parts::{CreatePartRequest, PartService},
        vehicles::{CreateVehicleRequest, VehicleService},
    },
};

/// Connects to a named in-memory database so each test file gets its own
/// schema while all connections in the pool still see the same data.
pub async fn setup_db(name: &str) -> Arc<DbPool> {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let pool = establish_connection(&url)
        .await
        .expect("Failed to create DB pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Arc::new(pool)
}

pub async fn seed_customer(db: &Arc<DbPool>) -> i32 {
    let service = CustomerService::new(db.clone());
    let customer = service
        .create_customer(CreateCustomerRequest {
            first_name: "Jan".into(),
            last_name: "Kowalski".into(),
            email: format!("jan.kowalski+{}@example.com", uuid::Uuid::new_v4()),
            phone_number: Some("+48 600 100 200".into()),
            address: None,
        })
        .await
        .expect("Failed to create customer");
    customer.id
}

pub async fn seed_vehicle(db: &Arc<DbPool>, customer_id: i32) -> i32 {
    let service = VehicleService::new(db.clone());
    let vehicle = service
        .create_vehicle(CreateVehicleRequest {
            vin: "WVWZZZ1JZXW000001".into(),
            registration_number: "WX 12345".into(),
            make: "Volkswagen".into(),
            model: "Golf".into(),
            year: 2019,
            image_url: None,
            customer_id,
        })
        .await
        .expect("Failed to create vehicle");
    vehicle.id
}

pub async fn seed_order(db: &Arc<DbPool>, vehicle_id: i32) -> i32 {
    let service = OrderService::new(db.clone(), None);
    let order = service
        .create_order(CreateOrderRequest {
            description: "Brake inspection and pad replacement".into(),
            vehicle_id,
        })
        .await
        .expect("Failed to create order");
    order.id
}

pub async fn seed_task(db: &Arc<DbPool>, order_id: i32, labor_cost: Decimal) -> i32 {
    let service = OrderService::new(db.clone(), None);
    let task = service
        .add_task(
            order_id,
            AddTaskRequest {
                description: "Replace front brake pads".into(),
                labor_cost,
                assigned_mechanic_id: None,
            },
        )
        .await
        .expect("Failed to add task");
    task.id
}

pub async fn seed_part(
    db: &Arc<DbPool>,
    name: &str,
    unit_price: Decimal,
    stock_quantity: Option<i32>,
) -> i32 {
    let service = PartService::new(db.clone(), None);
    let part = service
        .create_part(CreatePartRequest {
            name: name.into(),
            unit_price,
            description: None,
            part_number: None,
            stock_quantity,
        })
        .await
        .expect("Failed to create part");
    part.id
}
