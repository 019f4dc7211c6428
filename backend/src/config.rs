use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection string. Absent means the in-process memory
    /// store backs the service.
    pub database_url: Option<String>,
    /// Time zone used to interpret calendar dates from the API.
    pub time_zone: Tz,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        Ok(Config {
            database_url,
            time_zone,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            time_zone: chrono_tz::UTC,
        }
    }
}
