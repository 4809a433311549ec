use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "service_tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[validate(length(min = 1, max = 200, message = "Description must be between 1 and 200 characters"))]
    pub description: String,

    pub labor_cost: Decimal,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_mechanic_id: Option<String>,
    pub service_order_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_order::Entity",
        from = "Column::ServiceOrderId",
        to = "super::service_order::Column::Id"
    )]
    ServiceOrder,
    #[sea_orm(has_many = "super::used_part::Entity")]
    UsedParts,
}

impl Related<super::service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrder.def()
    }
}

impl Related<super::used_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsedParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
