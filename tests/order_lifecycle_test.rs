mod common;

use common::{seed_customer, seed_order, seed_part, seed_task, seed_vehicle, setup_db};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use workshop_api::{
    entities::{comment, service_order::OrderStatus, service_task, used_part},
    errors::ServiceError,
    services::{
        customers::{CustomerService, UpdateCustomerRequest},
        orders::{AddCommentRequest, CreateOrderRequest, OrderService},
        parts::PartService,
        tasks::{RecordUsedPartRequest, TaskService},
        vehicles::VehicleService,
    },
};

#[tokio::test]
async fn order_requires_an_existing_vehicle() {
    let db = setup_db("lifecycle_vehicle_guard").await;

    let orders = OrderService::new(db.clone(), None);
    let err = orders
        .create_order(CreateOrderRequest {
            description: "Ghost vehicle".into(),
            vehicle_id: 9999,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn assigning_a_mechanic_starts_the_order() {
    let db = setup_db("lifecycle_assign").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;

    let orders = OrderService::new(db.clone(), None);

    let order = orders.get_order(order_id).await.expect("Failed to load order");
    assert_eq!(order.status, OrderStatus::Created);
    assert!(order.status.is_active());

    let order = orders
        .assign_mechanic(order_id, "mech-42")
        .await
        .expect("Failed to assign mechanic");
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.assigned_mechanic_id.as_deref(), Some("mech-42"));

    let err = orders.assign_mechanic(order_id, "   ").await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn completing_stamps_and_reopening_clears_the_timestamp() {
    let db = setup_db("lifecycle_complete").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;

    let orders = OrderService::new(db.clone(), None);

    let order = orders
        .update_order_status(order_id, OrderStatus::Completed)
        .await
        .expect("Failed to complete order");
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());

    // Reopening is allowed and clears the completion stamp
    let order = orders
        .update_order_status(order_id, OrderStatus::InProgress)
        .await
        .expect("Failed to reopen order");
    assert_eq!(order.status, OrderStatus::InProgress);
    assert!(order.completed_at.is_none());

    let order = orders
        .cancel_order(order_id)
        .await
        .expect("Failed to cancel order");
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn active_listing_excludes_completed_and_cancelled() {
    let db = setup_db("lifecycle_active").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;

    let open_id = seed_order(&db, vehicle_id).await;
    let done_id = seed_order(&db, vehicle_id).await;
    let dropped_id = seed_order(&db, vehicle_id).await;

    let orders = OrderService::new(db.clone(), None);
    orders
        .update_order_status(done_id, OrderStatus::Completed)
        .await
        .expect("Failed to complete order");
    orders
        .cancel_order(dropped_id)
        .await
        .expect("Failed to cancel order");

    let active = orders.active_orders().await.expect("Failed to list active");
    let ids: Vec<i32> = active.iter().map(|o| o.id).collect();
    assert!(ids.contains(&open_id));
    assert!(!ids.contains(&done_id));
    assert!(!ids.contains(&dropped_id));
}

#[tokio::test]
async fn deleting_an_order_cascades_without_restoring_stock() {
    let db = setup_db("lifecycle_delete").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(60.00)).await;
    let part_id = seed_part(&db, "Alternator belt", dec!(35.00), Some(5)).await;

    let orders = OrderService::new(db.clone(), None);
    let tasks = TaskService::new(db.clone(), None);
    let parts = PartService::new(db.clone(), None);

    tasks
        .record_used_part(
            task_id,
            RecordUsedPartRequest {
                part_id,
                quantity: 2,
            },
        )
        .await
        .expect("Failed to record used part");
    orders
        .add_comment(
            order_id,
            "user-1",
            AddCommentRequest {
                content: "Customer approved the belt replacement".into(),
            },
        )
        .await
        .expect("Failed to add comment");

    orders.delete_order(order_id).await.expect("Failed to delete order");

    let err = orders.get_order(order_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let remaining_tasks = service_task::Entity::find()
        .filter(service_task::Column::ServiceOrderId.eq(order_id))
        .count(&*db)
        .await
        .expect("Failed to count tasks");
    assert_eq!(remaining_tasks, 0);

    let remaining_usage = used_part::Entity::find()
        .filter(used_part::Column::ServiceOrderId.eq(order_id))
        .count(&*db)
        .await
        .expect("Failed to count used parts");
    assert_eq!(remaining_usage, 0);

    let remaining_comments = comment::Entity::find()
        .filter(comment::Column::ServiceOrderId.eq(order_id))
        .count(&*db)
        .await
        .expect("Failed to count comments");
    assert_eq!(remaining_comments, 0);

    // The parts already left the shelf; deleting the paperwork does not put
    // them back.
    let part = parts.get_part(part_id).await.expect("Failed to load part");
    assert_eq!(part.stock_quantity, Some(3));
}

#[tokio::test]
async fn comments_list_newest_first() {
    let db = setup_db("lifecycle_comments").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;

    let orders = OrderService::new(db.clone(), None);
    for content in ["first note", "second note", "third note"] {
        orders
            .add_comment(
                order_id,
                "user-1",
                AddCommentRequest {
                    content: content.into(),
                },
            )
            .await
            .expect("Failed to add comment");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let comments = orders
        .list_comments(order_id)
        .await
        .expect("Failed to list comments");
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[0].content, "third note");
    assert_eq!(comments[2].content, "first note");
}

#[tokio::test]
async fn stale_customer_update_is_rejected() {
    let db = setup_db("lifecycle_customer_version").await;
    let customer_id = seed_customer(&db).await;

    let customers = CustomerService::new(db.clone());
    let customer = customers
        .get_customer(customer_id)
        .await
        .expect("Failed to load customer");
    assert_eq!(customer.version, 1);

    let updated = customers
        .update_customer(
            customer_id,
            UpdateCustomerRequest {
                first_name: None,
                last_name: None,
                email: None,
                phone_number: Some("+48 600 999 999".into()),
                address: None,
                version: customer.version,
            },
        )
        .await
        .expect("Failed to update customer");
    assert_eq!(updated.version, 2);

    // Replaying the same request with the old version loses
    let err = customers
        .update_customer(
            customer_id,
            UpdateCustomerRequest {
                first_name: None,
                last_name: None,
                email: None,
                phone_number: Some("+48 600 000 000".into()),
                address: None,
                version: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConcurrentModification(_)));

    let current = customers
        .get_customer(customer_id)
        .await
        .expect("Failed to reload customer");
    assert_eq!(current.phone_number.as_deref(), Some("+48 600 999 999"));
}

#[tokio::test]
async fn vehicle_with_service_history_cannot_be_deleted() {
    let db = setup_db("lifecycle_vehicle_delete").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    seed_order(&db, vehicle_id).await;

    let vehicles = VehicleService::new(db.clone());
    let err = vehicles.delete_vehicle(vehicle_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let customers = CustomerService::new(db.clone());
    let err = customers.delete_customer(customer_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn completing_a_task_is_idempotent() {
    let db = setup_db("lifecycle_task_complete").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(75.00)).await;

    let tasks = TaskService::new(db.clone(), None);

    let done = tasks.complete_task(task_id).await.expect("Failed to complete");
    assert!(done.is_completed);
    let stamp = done.completed_at.expect("completion stamp missing");

    let again = tasks.complete_task(task_id).await.expect("Second complete failed");
    assert_eq!(again.completed_at, Some(stamp));
}
