//! Handles settings for the application.
//!
//! Values are read from `settings.toml` (or the file named by
//! `REPORTING_CONFIG`) and can be overridden by `REPORTING__<SECTION>__<KEY>`
//! environment variables. Every key has a default, so the file is optional.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE_VAR: &str = "REPORTING_CONFIG";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Fixtures {
    /// Seed the demo rows when the `users` table is empty.
    pub load: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub fixtures: Fixtures,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| "settings".to_string());

        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("fixtures.load", true)?
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::with_prefix("REPORTING").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
