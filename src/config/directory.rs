//! Directory seed configuration loading from config.toml
//!
//! This module loads the initial categories, subcategories, currencies and
//! wallets from a TOML configuration file. Seeding only inserts entries whose
//! name (or code) is not stored yet, so it is safe to run on every start.

use crate::core::directory;
use crate::entities::CategoryType;
use crate::errors::{Error, Result};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Categories to seed, each with optional subcategories
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Currencies to seed
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
    /// Wallets to seed
    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// `"INCOME"` or `"EXPENSE"`
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Names of subcategories under this category
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// Configuration for a single currency
#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    /// Currency code (e.g. "EUR")
    pub code: String,
    /// Full name
    pub name: String,
}

/// Configuration for a single wallet
#[derive(Debug, Deserialize, Clone)]
pub struct WalletConfig {
    /// Name of the wallet
    pub name: String,
}

/// Loads directory configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads directory configuration from the default location (./config.toml).
///
/// A missing file yields an empty configuration.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        debug!("No config.toml found, starting with an empty directory seed");
        return Ok(Config::default());
    }
    load_config(path)
}

/// Inserts every configured entry that is not stored yet.
///
/// Returns the number of inserted rows.
#[instrument(skip_all)]
pub async fn seed_directory(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let existing = directory::load_snapshot(db).await?;
    let mut inserted = 0;

    for category in &config.categories {
        let category_id = match existing.resolve_category_id(&category.name) {
            Ok(id) => id,
            Err(_) => {
                inserted += 1;
                directory::create_category(db, &category.name, category.category_type)
                    .await?
                    .id
            }
        };

        for subcategory in &category.subcategories {
            if existing.resolve_subcategory_id(subcategory).is_err() {
                directory::create_subcategory(db, category_id, subcategory).await?;
                inserted += 1;
            }
        }
    }

    for currency in &config.currencies {
        if existing.resolve_currency_id(&currency.code).is_err() {
            directory::create_currency(db, &currency.code, &currency.name).await?;
            inserted += 1;
        }
    }

    for wallet in &config.wallets {
        if existing.resolve_wallet_id(&wallet.name).is_err() {
            directory::create_wallet(db, &wallet.name).await?;
            inserted += 1;
        }
    }

    info!("Directory seeded with {inserted} new entries");
    Ok(inserted)
}
