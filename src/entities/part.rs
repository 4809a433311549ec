use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "parts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[validate(length(min = 1, max = 100, message = "Part name must be between 1 and 100 characters"))]
    pub name: String,

    pub unit_price: Decimal,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(max = 50))]
    pub part_number: Option<String>,

    /// None means stock is not tracked for this part
    pub stock_quantity: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::used_part::Entity")]
    UsedParts,
}

impl Related<super::used_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsedParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
