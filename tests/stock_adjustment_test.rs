mod common;

use common::{seed_customer, seed_order, seed_part, seed_task, seed_vehicle, setup_db};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use workshop_api::{
    entities::used_part,
    errors::ServiceError,
    services::{
        parts::PartService,
        tasks::{RecordUsedPartRequest, TaskService},
    },
};

#[tokio::test]
async fn recording_a_used_part_decrements_tracked_stock() {
    let db = setup_db("stock_decrement").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(100.00)).await;
    let part_id = seed_part(&db, "Brake pad set", dec!(25.00), Some(10)).await;

    let tasks = TaskService::new(db.clone(), None);
    let parts = PartService::new(db.clone(), None);

    let usage = tasks
        .record_used_part(
            task_id,
            RecordUsedPartRequest {
                part_id,
                quantity: 2,
            },
        )
        .await
        .expect("Failed to record used part");

    assert_eq!(usage.quantity, 2);
    assert_eq!(usage.service_task_id, task_id);
    assert_eq!(usage.service_order_id, order_id);

    let part = parts.get_part(part_id).await.expect("Failed to load part");
    assert_eq!(part.stock_quantity, Some(8));
}

#[tokio::test]
async fn sequential_recordings_accumulate_usage_and_cost() {
    let db = setup_db("stock_sequential").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(0.00)).await;
    let part_id = seed_part(&db, "Hose clamp", dec!(2.50), Some(10)).await;

    let tasks = TaskService::new(db.clone(), None);
    let parts = PartService::new(db.clone(), None);

    for quantity in [3, 4] {
        tasks
            .record_used_part(task_id, RecordUsedPartRequest { part_id, quantity })
            .await
            .expect("Failed to record used part");
    }

    let part = parts.get_part(part_id).await.expect("Failed to load part");
    assert_eq!(part.stock_quantity, Some(3));

    // 7 units at 2.50 across both ledger lines
    let aggregate = tasks
        .get_task_with_parts(task_id)
        .await
        .expect("Failed to load task");
    assert_eq!(aggregate.parts.len(), 2);
    assert_eq!(aggregate.parts_cost(), dec!(17.50));
}

#[tokio::test]
async fn insufficient_stock_rejects_and_leaves_ledger_untouched() {
    let db = setup_db("stock_insufficient").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(50.00)).await;
    let part_id = seed_part(&db, "Oil filter", dec!(15.00), Some(3)).await;

    let tasks = TaskService::new(db.clone(), None);
    let parts = PartService::new(db.clone(), None);

    let err = tasks
        .record_used_part(
            task_id,
            RecordUsedPartRequest {
                part_id,
                quantity: 5,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // Stock unchanged, no ledger row written
    let part = parts.get_part(part_id).await.expect("Failed to load part");
    assert_eq!(part.stock_quantity, Some(3));

    let ledger_rows = used_part::Entity::find()
        .filter(used_part::Column::PartId.eq(part_id))
        .count(&*db)
        .await
        .expect("Failed to count ledger rows");
    assert_eq!(ledger_rows, 0);
}

#[tokio::test]
async fn untracked_part_is_always_available_and_stays_untracked() {
    let db = setup_db("stock_untracked").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(80.00)).await;
    let part_id = seed_part(&db, "Shop consumables", dec!(1.50), None).await;

    let tasks = TaskService::new(db.clone(), None);
    let parts = PartService::new(db.clone(), None);

    assert!(parts
        .is_part_available(part_id, 1_000_000)
        .await
        .expect("availability check failed"));

    tasks
        .record_used_part(
            task_id,
            RecordUsedPartRequest {
                part_id,
                quantity: 40,
            },
        )
        .await
        .expect("Failed to record untracked part usage");

    let part = parts.get_part(part_id).await.expect("Failed to load part");
    assert_eq!(part.stock_quantity, None);
}

#[tokio::test]
async fn manual_adjustment_cannot_drive_stock_negative() {
    let db = setup_db("stock_adjust").await;
    let part_id = seed_part(&db, "Wiper blade", dec!(12.00), Some(4)).await;

    let parts = PartService::new(db.clone(), None);

    let updated = parts
        .adjust_stock(part_id, 6)
        .await
        .expect("Failed to receive stock");
    assert_eq!(updated.stock_quantity, Some(10));

    let updated = parts
        .adjust_stock(part_id, -10)
        .await
        .expect("Failed to issue stock");
    assert_eq!(updated.stock_quantity, Some(0));

    let err = parts.adjust_stock(part_id, -1).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let part = parts.get_part(part_id).await.expect("Failed to load part");
    assert_eq!(part.stock_quantity, Some(0));
}

#[tokio::test]
async fn adjusting_untracked_stock_is_rejected() {
    let db = setup_db("stock_adjust_untracked").await;
    let part_id = seed_part(&db, "Grease", dec!(5.00), None).await;

    let parts = PartService::new(db.clone(), None);

    let err = parts.adjust_stock(part_id, 5).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn setting_stock_enables_tracking() {
    let db = setup_db("stock_set").await;
    let part_id = seed_part(&db, "Cabin filter", dec!(18.00), None).await;

    let parts = PartService::new(db.clone(), None);

    let part = parts
        .set_stock_quantity(part_id, 7)
        .await
        .expect("Failed to set stock");
    assert_eq!(part.stock_quantity, Some(7));

    // Now tracked, so availability is finite
    assert!(!parts
        .is_part_available(part_id, 8)
        .await
        .expect("availability check failed"));

    let err = parts.set_stock_quantity(part_id, -1).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn low_stock_listing_uses_threshold_and_skips_untracked() {
    let db = setup_db("stock_low").await;
    let low_id = seed_part(&db, "Spark plug", dec!(8.00), Some(5)).await;
    let ok_id = seed_part(&db, "Air filter", dec!(22.00), Some(6)).await;
    let untracked_id = seed_part(&db, "Degreaser", dec!(4.00), None).await;

    let parts = PartService::new(db.clone(), None);
    let low = parts.low_stock_parts().await.expect("Failed to list low stock");

    let ids: Vec<i32> = low.iter().map(|p| p.id).collect();
    assert!(ids.contains(&low_id));
    assert!(!ids.contains(&ok_id));
    assert!(!ids.contains(&untracked_id));
}

#[tokio::test]
async fn part_referenced_by_ledger_cannot_be_deleted() {
    let db = setup_db("stock_delete_guard").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(30.00)).await;
    let used_id = seed_part(&db, "Timing belt", dec!(45.00), Some(2)).await;
    let unused_id = seed_part(&db, "Coolant hose", dec!(9.00), Some(2)).await;

    let tasks = TaskService::new(db.clone(), None);
    let parts = PartService::new(db.clone(), None);

    tasks
        .record_used_part(
            task_id,
            RecordUsedPartRequest {
                part_id: used_id,
                quantity: 1,
            },
        )
        .await
        .expect("Failed to record used part");

    let err = parts.delete_part(used_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    parts
        .delete_part(unused_id)
        .await
        .expect("Unreferenced part should be deletable");
    let err = parts.get_part(unused_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
