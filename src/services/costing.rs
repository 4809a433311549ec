//! Read-side cost projection over a fully loaded order subtree.
//!
//! Totals are never persisted; they are recomputed from the aggregate on
//! every read so there is no cache to invalidate. All arithmetic is exact
//! `Decimal` — floats never touch currency.

use crate::entities::{part, service_order, service_task, used_part};
use rust_decimal::Decimal;
use serde::Serialize;

/// One used-part line joined with the part it consumed.
#[derive(Debug, Clone, Serialize)]
pub struct UsedPartLine {
    pub used_part: used_part::Model,
    pub part: part::Model,
}

impl UsedPartLine {
    /// quantity × unit price
    pub fn line_cost(&self) -> Decimal {
        Decimal::from(self.used_part.quantity) * self.part.unit_price
    }
}

/// A task together with its used-part lines.
#[derive(Debug, Clone, Serialize)]
pub struct TaskAggregate {
    pub task: service_task::Model,
    pub parts: Vec<UsedPartLine>,
}

impl TaskAggregate {
    pub fn parts_cost(&self) -> Decimal {
        self.parts.iter().map(|line| line.line_cost()).sum()
    }
}

/// The whole order subtree: order, tasks, used-part lines and the referenced
/// parts, loaded together so the totals below are always computed from a
/// consistent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct OrderAggregate {
    pub order: service_order::Model,
    pub tasks: Vec<TaskAggregate>,
}

impl OrderAggregate {
    pub fn total_labor_cost(&self) -> Decimal {
        self.tasks.iter().map(|t| t.task.labor_cost).sum()
    }

    pub fn total_parts_cost(&self) -> Decimal {
        self.tasks.iter().map(|t| t.parts_cost()).sum()
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_labor_cost() + self.total_parts_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::service_order::OrderStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: i32) -> service_order::Model {
        service_order::Model {
            id,
            description: "brake service".into(),
            created_at: Utc::now(),
            completed_at: None,
            status: OrderStatus::Created,
            assigned_mechanic_id: None,
            vehicle_id: 1,
        }
    }

    fn task(id: i32, order_id: i32, labor_cost: Decimal) -> service_task::Model {
        service_task::Model {
            id,
            description: "replace pads".into(),
            labor_cost,
            is_completed: false,
            completed_at: None,
            assigned_mechanic_id: None,
            service_order_id: order_id,
        }
    }

    fn line(task_id: i32, part_id: i32, quantity: i32, unit_price: Decimal) -> UsedPartLine {
        UsedPartLine {
            used_part: used_part::Model {
                id: 0,
                quantity,
                service_task_id: task_id,
                part_id,
                service_order_id: 1,
            },
            part: part::Model {
                id: part_id,
                name: "brake pad".into(),
                unit_price,
                description: None,
                part_number: None,
                stock_quantity: Some(10),
            },
        }
    }

    #[test]
    fn empty_order_totals_are_zero() {
        let agg = OrderAggregate {
            order: order(1),
            tasks: vec![],
        };

        assert_eq!(agg.total_labor_cost(), Decimal::ZERO);
        assert_eq!(agg.total_parts_cost(), Decimal::ZERO);
        assert_eq!(agg.total_cost(), Decimal::ZERO);
    }

    #[test]
    fn total_is_labor_plus_parts_exactly() {
        let agg = OrderAggregate {
            order: order(1),
            tasks: vec![
                TaskAggregate {
                    task: task(1, 1, dec!(100.00)),
                    parts: vec![line(1, 1, 2, dec!(25.00))],
                },
                TaskAggregate {
                    task: task(2, 1, dec!(49.99)),
                    parts: vec![line(2, 2, 3, dec!(0.10))],
                },
            ],
        };

        assert_eq!(agg.total_labor_cost(), dec!(149.99));
        assert_eq!(agg.total_parts_cost(), dec!(50.30));
        assert_eq!(agg.total_cost(), dec!(200.29));
        assert_eq!(
            agg.total_cost(),
            agg.total_labor_cost() + agg.total_parts_cost()
        );
    }

    #[test]
    fn single_task_with_parts() {
        // Part 25.00, task labor 100.00, 2 units used
        let agg = OrderAggregate {
            order: order(1),
            tasks: vec![TaskAggregate {
                task: task(1, 1, dec!(100.00)),
                parts: vec![line(1, 1, 2, dec!(25.00))],
            }],
        };

        assert_eq!(agg.tasks[0].parts_cost(), dec!(50.00));
        assert_eq!(agg.total_cost(), dec!(150.00));
    }

    #[test]
    fn decimal_arithmetic_does_not_drift() {
        // 0.1 + 0.2 style cases that break floats
        let agg = OrderAggregate {
            order: order(1),
            tasks: vec![TaskAggregate {
                task: task(1, 1, dec!(0.10)),
                parts: vec![line(1, 1, 1, dec!(0.20))],
            }],
        };

        assert_eq!(agg.total_cost(), dec!(0.30));
    }
}
