//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod schema;
pub mod store;

pub use config::{AnalysisSettings, AppConfig, ConfigError, StorageSettings, UserProfile};
pub use database::{Database, DatabaseError};
pub use store::ActivityStore;
