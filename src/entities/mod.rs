//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the directory tables, the transaction ledger and the
//! sparse plan table. Each entity has a Model struct for data and an Entity
//! struct for operations.

pub mod category;
pub mod currency;
pub mod plan;
pub mod subcategory;
pub mod transaction;
pub mod wallet;

// Re-export specific types to avoid conflicts
pub use category::{
    CategoryType, Column as CategoryColumn, Entity as Category, Model as CategoryModel,
};
pub use currency::{Column as CurrencyColumn, Entity as Currency, Model as CurrencyModel};
pub use plan::{Column as PlanColumn, Entity as Plan, Model as PlanModel};
pub use subcategory::{
    Column as SubcategoryColumn, Entity as Subcategory, Model as SubcategoryModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
