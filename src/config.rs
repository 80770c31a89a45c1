use std::env;
use std::fmt;
use std::str::FromStr;

use crate::fetcher::DEFAULT_CWA_API_URL;
use crate::services::batch_writer::DEFAULT_CHUNK_SIZE;

/// Marker left in `.env` templates; such values count as unset
const PLACEHOLDER_MARKER: &str = "YOUR_";

#[derive(Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_connect_retries: usize,
    pub server_host: String,
    pub server_port: u16,
    pub cwa_api_url: String,
    pub cwa_api_token: Option<String>,
    pub sync_interval_minutes: u64,
    pub sync_chunk_size: usize,
    pub sync_write_concurrency: usize,
    pub sync_scheduler_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing or invalid values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            database_url: configured(lookup("DATABASE_URL")),
            database_max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(5),
            database_connect_retries: parse_var(&lookup, "DATABASE_CONNECT_RETRIES").unwrap_or(5),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(3001),
            cwa_api_url: lookup("CWA_API_URL").unwrap_or_else(|| DEFAULT_CWA_API_URL.to_string()),
            cwa_api_token: configured(lookup("CWA_API_TOKEN")),
            sync_interval_minutes: parse_var::<u64>(&lookup, "SYNC_INTERVAL_MINUTES")
                .filter(|minutes| *minutes > 0)
                .unwrap_or(60),
            sync_chunk_size: parse_var::<usize>(&lookup, "SYNC_CHUNK_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            sync_write_concurrency: parse_var::<usize>(&lookup, "SYNC_WRITE_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(1),
            sync_scheduler_enabled: parse_var(&lookup, "SYNC_SCHEDULER_ENABLED").unwrap_or(true),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

fn configured(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.contains(PLACEHOLDER_MARKER))
}

// Secrets stay out of the startup log
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("Config")
            .field("database_url", &redacted(&self.database_url))
            .field("database_max_connections", &self.database_max_connections)
            .field("database_connect_retries", &self.database_connect_retries)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cwa_api_url", &self.cwa_api_url)
            .field("cwa_api_token", &redacted(&self.cwa_api_token))
            .field("sync_interval_minutes", &self.sync_interval_minutes)
            .field("sync_chunk_size", &self.sync_chunk_size)
            .field("sync_write_concurrency", &self.sync_write_concurrency)
            .field("sync_scheduler_enabled", &self.sync_scheduler_enabled)
            .finish()
    }
}
