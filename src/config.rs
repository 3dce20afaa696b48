//! Environment-derived configuration.

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub media_root: String,
}

impl Config {
    /// Reads configuration from the environment. `DATABASE_URL` is the only
    /// required variable.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a number")?;
        let nats_url = std::env::var("NATS_URL").ok();
        let media_root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        Ok(Self { database_url, port, nats_url, media_root })
    }
}
