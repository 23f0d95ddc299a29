//! Configuration module - Runtime settings loaded from the environment.

use crate::errors::Result;

/// Database configuration and connection management
pub mod database;

/// Application configuration assembled from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection URL for the backing `SQLite` database
    pub database_url: String,
}

/// Loads the application configuration from the environment.
///
/// Call after `dotenvy::dotenv()` so values from a local `.env` file are
/// visible. Missing variables fall back to development defaults.
pub fn load_app_configuration() -> Result<AppConfig> {
    let database_url = database::get_database_url()?;
    Ok(AppConfig { database_url })
}
