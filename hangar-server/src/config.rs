//! Server configuration loaded from the environment.

use std::str::FromStr;

/// Which ship store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Diesel over PostgreSQL.
    Postgres,
    /// Process-local store, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown HANGAR_STORE backend: {other}")),
        }
    }
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Store backend.
    pub store: StoreBackend,
    /// PostgreSQL URL, required for the postgres backend.
    pub database_url: Option<String>,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Build the configuration from `HANGAR_*` and `DATABASE_URL` variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("HANGAR_STORE") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set for the postgres store".to_string());
        }
        let port = match lookup("HANGAR_PORT") {
            Some(value) => u16::from_str(value.trim())
                .map_err(|_| format!("HANGAR_PORT must be a u16 number, got {value}"))?,
            None => 8080,
        };
        let origins = lookup("HANGAR_UI_ORIGINS")
            .unwrap_or_else(|| "http://127.0.0.1:4200,http://localhost:4200".to_string());
        let allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            store,
            database_url,
            host: lookup("HANGAR_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            allowed_origins,
        })
    }
}
