use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub database_url: String,
    /// Shared secret the gateway signs webhook bodies with. Required at
    /// startup: a missing secret is a configuration error, never a
    /// per-request branch.
    pub webhook_secret: SecretString,
    pub gateway_url: Url,
    pub gateway_key_id: String,
    pub gateway_key_secret: SecretString,
    pub gateway_timeout: Duration,
    /// Optional path to a JSON catalog file; the built-in catalog is used
    /// when unset.
    pub catalog_path: Option<String>,
}

fn get_env(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
}

fn get_env_default(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001")
            .parse()
            .expect("BIND_ADDR must be a valid socket address");
        let cors_origin: HeaderValue = get_env_default("CORS_ORIGIN", "http://localhost:3000")
            .parse()
            .expect("CORS_ORIGIN must be a valid header value");
        let database_url = get_env("DATABASE_URL");
        let webhook_secret = SecretString::new(get_env("WEBHOOK_SECRET").into());
        let gateway_url: Url = get_env_default("GATEWAY_URL", "https://api.gateway.example/v1")
            .parse()
            .expect("GATEWAY_URL must be a valid URL");
        let gateway_key_id = get_env("GATEWAY_KEY_ID");
        let gateway_key_secret = SecretString::new(get_env("GATEWAY_KEY_SECRET").into());
        let gateway_timeout_secs: u64 = get_env_default("GATEWAY_TIMEOUT_SECS", "10")
            .parse()
            .expect("GATEWAY_TIMEOUT_SECS must be an integer");
        let catalog_path = std::env::var("CATALOG_PATH").ok();

        Self {
            bind_addr,
            cors_origin,
            database_url,
            webhook_secret,
            gateway_url,
            gateway_key_id,
            gateway_key_secret,
            gateway_timeout: Duration::from_secs(gateway_timeout_secs),
            catalog_path,
        }
    }
}
