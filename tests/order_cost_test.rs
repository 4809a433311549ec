mod common;

use common::{seed_customer, seed_order, seed_part, seed_task, seed_vehicle, setup_db};
use rust_decimal_macros::dec;
use workshop_api::{
    entities::service_order::OrderStatus,
    services::{
        orders::OrderService,
        reports::ReportService,
        tasks::{RecordUsedPartRequest, TaskService},
    },
};

#[tokio::test]
async fn order_totals_are_derived_from_tasks_and_used_parts() {
    let db = setup_db("cost_totals").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;

    let task_a = seed_task(&db, order_id, dec!(100.00)).await;
    let task_b = seed_task(&db, order_id, dec!(49.99)).await;
    let pads = seed_part(&db, "Brake pad set", dec!(25.00), Some(10)).await;
    let clips = seed_part(&db, "Retaining clip", dec!(0.10), Some(100)).await;

    let tasks = TaskService::new(db.clone(), None);
    tasks
        .record_used_part(
            task_a,
            RecordUsedPartRequest {
                part_id: pads,
                quantity: 2,
            },
        )
        .await
        .expect("Failed to record pads");
    tasks
        .record_used_part(
            task_b,
            RecordUsedPartRequest {
                part_id: clips,
                quantity: 3,
            },
        )
        .await
        .expect("Failed to record clips");

    let orders = OrderService::new(db.clone(), None);
    let with_totals = orders
        .get_order_with_totals(order_id)
        .await
        .expect("Failed to load order with totals");

    assert_eq!(with_totals.total_labor_cost, dec!(149.99));
    assert_eq!(with_totals.total_parts_cost, dec!(50.30));
    assert_eq!(with_totals.total_cost, dec!(200.29));
}

#[tokio::test]
async fn totals_reflect_the_current_ledger_not_a_cache() {
    let db = setup_db("cost_recompute").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(100.00)).await;
    let part_id = seed_part(&db, "Brake pad set", dec!(25.00), Some(10)).await;

    let orders = OrderService::new(db.clone(), None);
    let tasks = TaskService::new(db.clone(), None);

    let before = orders
        .get_order_with_totals(order_id)
        .await
        .expect("Failed to load order");
    assert_eq!(before.total_cost, dec!(100.00));

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

    let after = orders
        .get_order_with_totals(order_id)
        .await
        .expect("Failed to reload order");
    assert_eq!(after.total_parts_cost, dec!(50.00));
    assert_eq!(after.total_cost, dec!(150.00));
}

#[tokio::test]
async fn cost_report_itemizes_tasks_and_part_lines() {
    let db = setup_db("cost_report").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    let task_id = seed_task(&db, order_id, dec!(100.00)).await;
    let part_id = seed_part(&db, "Brake pad set", dec!(25.00), Some(10)).await;

    let tasks = TaskService::new(db.clone(), None);
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

    let reports = ReportService::new(db.clone());
    let report = reports
        .order_cost_report(order_id)
        .await
        .expect("Failed to build report");

    assert_eq!(report.order_id, order_id);
    assert_eq!(report.header.vehicle_id, vehicle_id);
    assert_eq!(report.header.customer_id, customer_id);
    assert_eq!(report.header.customer_name, "Jan Kowalski");
    assert_eq!(report.tasks.len(), 1);

    let task_line = &report.tasks[0];
    assert_eq!(task_line.labor_cost, dec!(100.00));
    assert_eq!(task_line.parts_cost, dec!(50.00));
    assert_eq!(task_line.parts.len(), 1);
    assert_eq!(task_line.parts[0].quantity, 2);
    assert_eq!(task_line.parts[0].unit_price, dec!(25.00));
    assert_eq!(task_line.parts[0].line_cost, dec!(50.00));

    assert_eq!(report.total_cost, dec!(150.00));
}

#[tokio::test]
async fn revenue_summary_sums_per_order_totals() {
    let db = setup_db("cost_revenue").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;

    let done_id = seed_order(&db, vehicle_id).await;
    let open_id = seed_order(&db, vehicle_id).await;
    seed_task(&db, done_id, dec!(200.00)).await;
    seed_task(&db, open_id, dec!(500.00)).await;

    let orders = OrderService::new(db.clone(), None);
    orders
        .update_order_status(done_id, OrderStatus::Completed)
        .await
        .expect("Failed to complete order");

    let reports = ReportService::new(db.clone());
    let summary = reports
        .revenue_summary(None, None)
        .await
        .expect("Failed to build revenue summary");

    assert_eq!(summary.order_count, 2);
    assert_eq!(summary.total_labor_cost, dec!(700.00));
    assert_eq!(summary.total_parts_cost, dec!(0));
    assert_eq!(summary.total_revenue, dec!(700.00));

    let done_line = summary
        .orders
        .iter()
        .find(|l| l.order_id == done_id)
        .expect("completed order missing from summary");
    assert_eq!(done_line.status, OrderStatus::Completed);
    assert_eq!(done_line.total_cost, dec!(200.00));
}

#[tokio::test]
async fn revenue_summary_respects_the_time_window() {
    let db = setup_db("cost_revenue_window").await;
    let customer_id = seed_customer(&db).await;
    let vehicle_id = seed_vehicle(&db, customer_id).await;
    let order_id = seed_order(&db, vehicle_id).await;
    seed_task(&db, order_id, dec!(120.00)).await;

    let reports = ReportService::new(db.clone());

    let far_past = chrono::Utc::now() - chrono::Duration::days(365);
    let in_window = reports
        .revenue_summary(Some(far_past), None)
        .await
        .expect("Failed to build summary");
    assert_eq!(in_window.order_count, 1);
    assert_eq!(in_window.total_revenue, dec!(120.00));

    let before_everything = reports
        .revenue_summary(None, Some(far_past))
        .await
        .expect("Failed to build summary");
    assert_eq!(before_everything.order_count, 0);
    assert!(before_everything.orders.is_empty());
    assert_eq!(before_everything.total_revenue, dec!(0));
}
