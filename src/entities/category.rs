//! Category entity - Top-level classification of transactions.
//!
//! Every category is either an income or an expense category. Only expense
//! categories take part in plan-vs-actual summaries and distributions; both
//! kinds feed the monthly dynamics series.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a category collects income or spending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryType {
    /// Money coming in (salary, refunds, ...)
    #[sea_orm(string_value = "INCOME")]
    Income,
    /// Money going out (food, rent, ...)
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

impl CategoryType {
    /// Stored representation, `"INCOME"` or `"EXPENSE"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across all categories (e.g. "Food", "Salary")
    #[sea_orm(unique)]
    pub name: String,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    pub category_type: CategoryType,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many subcategories
    #[sea_orm(has_many = "super::subcategory::Entity")]
    Subcategories,
    /// One category has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One category has many monthly plans
    #[sea_orm(has_many = "super::plan::Entity")]
    Plans,
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategories.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
