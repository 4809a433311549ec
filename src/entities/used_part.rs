use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One line of part consumption: `quantity` units of `part_id` used by
/// `service_task_id`. The order id is carried redundantly so order-level
/// lookups do not have to join through tasks.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "used_parts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub quantity: i32,
    pub service_task_id: i32,
    pub part_id: i32,
    pub service_order_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_task::Entity",
        from = "Column::ServiceTaskId",
        to = "super::service_task::Column::Id"
    )]
    ServiceTask,
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id"
    )]
    Part,
    #[sea_orm(
        belongs_to = "super::service_order::Entity",
        from = "Column::ServiceOrderId",
        to = "super::service_order::Column::Id"
    )]
    ServiceOrder,
}

impl Related<super::service_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTask.def()
    }
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl Related<super::service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
