use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub frontend: FrontendConfig,
    pub cache: CacheConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
    /// Name of the event table
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing static frontend files
    /// If None, only the JSON API is served
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: u64,
    /// Query cache TTL; 0 disables the cache
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Event loaded when a request names neither event id nor operation
    pub default_event_id: Option<String>,
    pub map_center_lat: f64,
    pub map_center_lon: f64,
    pub map_zoom: u8,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_event_id: None,
            map_center_lat: 41.368918,
            map_center_lon: 2.147618,
            map_zoom: 20,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or(key, default)
        .parse::<T>()
        .with_context(|| format!("{key} is not a valid value"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str = env_or("DATABASE_BACKEND", "sqlite");

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = env_or("DATABASE_URL", "sqlite://./wristtrack.db?mode=rwc");
        let max_connections = parse_env::<u32>("DATABASE_MAX_CONNECTIONS", "10")?;
        let table = env_or("EVENTS_TABLE", "event_records");

        let api_host = env_or("API_HOST", "127.0.0.1");
        let api_port = parse_env::<u16>("API_PORT", "8080")?;

        let frontend_static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        let cache = CacheConfig {
            max_entries: parse_env("CACHE_MAX_ENTRIES", "1000")?,
            ttl_secs: parse_env("CACHE_TTL_SECS", "30")?,
        };

        let defaults = DashboardConfig::default();
        let dashboard = DashboardConfig {
            default_event_id: std::env::var("DEFAULT_EVENT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            map_center_lat: parse_env("MAP_CENTER_LAT", &defaults.map_center_lat.to_string())?,
            map_center_lon: parse_env("MAP_CENTER_LON", &defaults.map_center_lon.to_string())?,
            map_zoom: parse_env("MAP_ZOOM", &defaults.map_zoom.to_string())?,
        };

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
                table,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
            cache,
            dashboard,
        })
    }
}
