//! Plan entity - Budgeted amount for one category in one calendar month.
//!
//! The table is sparse: a row exists only once a budget was set for that
//! (category, month, year). The triple is unique; the index is created
//! alongside the table in [`crate::config::database::create_tables`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    /// Unique identifier for the plan row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category this budget applies to
    pub category_id: i64,
    /// Budgeted amount
    #[sea_orm(column_name = "plan_amount")]
    pub amount: f64,
    /// Month of the budget, 1..=12
    #[sea_orm(column_name = "plan_month")]
    pub month: i32,
    /// Year of the budget
    #[sea_orm(column_name = "plan_year")]
    pub year: i32,
}

/// Defines relationships between Plan and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each plan belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
