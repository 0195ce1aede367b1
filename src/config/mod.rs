use std::env;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_EXTRACT_WORKERS: usize = 4;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub is_dev: bool,
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    /// Threads in the pinned pool that runs extractions.
    pub extract_workers: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(8080),
            is_dev: env::var("APP_ENV").as_deref() != Ok("production"),
            fetch_timeout: parse_var("FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT),
            cache_ttl: parse_var("CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CACHE_TTL),
            extract_workers: parse_var("EXTRACT_WORKERS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_EXTRACT_WORKERS),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
