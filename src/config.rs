use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory { seed: Vec<String> },
    Sqlite { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub backend: Backend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// `DATABASE_URL=memory` picks the in-process store (optionally seeded from
    /// the comma separated `SEED_TODOS`), anything else is handed to SQLite.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = match lookup("PORT") {
            Some(port) => port.parse::<u16>().with_context(|| format!("PORT must be a port number, got {port:?}"))?,
            None => 3000,
        };
        let addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .with_context(|| format!("HOST must be an IP address, got {host:?}"))?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let backend = if database_url == "memory" {
            let seed: Vec<String> = lookup("SEED_TODOS")
                .map(|titles| titles.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect())
                .unwrap_or_default();
            Backend::Memory { seed }
        } else {
            Backend::Sqlite { url: database_url }
        };
        Ok(Self { addr, backend })
    }
}
