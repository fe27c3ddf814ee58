/// Database configuration and connection management
pub mod database;

/// Directory seed configuration loading from config.toml
pub mod directory;
