use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("Missing required env var: DATABASE_URL")?;
        let bind_addr =
            std::env::var("SPLITD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Fail fast, fail loud.
        if database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }

        Ok(Self {
            database_url,
            bind_addr,
        })
    }
}
