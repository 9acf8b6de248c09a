//! Backend entry-point: reads configuration from the environment and starts
//! the HTTP server.

mod server;

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use backend::domain::UserId;
use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, create_server};

fn env_error(name: &str, detail: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("invalid {name}: {detail}"))
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn parse_bind_addr() -> std::io::Result<SocketAddr> {
    match env::var("BIND_ADDR") {
        Ok(raw) => raw.parse().map_err(|e| env_error("BIND_ADDR", e)),
        Err(_) => Ok(SocketAddr::from(([0, 0, 0, 0], 8080))),
    }
}

fn parse_push_endpoint() -> std::io::Result<Option<Url>> {
    match env::var("PUSH_ENDPOINT") {
        Ok(raw) => Url::parse(&raw)
            .map(Some)
            .map_err(|e| env_error("PUSH_ENDPOINT", e)),
        Err(_) => Ok(None),
    }
}

/// Parse a comma-separated environment variable into values of type `T`.
fn parse_list<T>(name: &str, parse: impl Fn(&str) -> std::io::Result<T>) -> std::io::Result<Vec<T>> {
    let Ok(raw) = env::var(name) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse)
        .collect()
}

fn parse_admin_recipients() -> std::io::Result<Vec<UserId>> {
    parse_list("ADMIN_RECIPIENTS", |entry| {
        UserId::new(entry).map_err(|e| env_error("ADMIN_RECIPIENTS", format!("{entry}: {e}")))
    })
}

fn parse_allowed_ws_origins() -> std::io::Result<Vec<Url>> {
    parse_list("WS_ALLOWED_ORIGINS", |entry| {
        Url::parse(entry).map_err(|e| env_error("WS_ALLOWED_ORIGINS", format!("{entry}: {e}")))
    })
}

async fn build_config() -> std::io::Result<ServerConfig> {
    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr = parse_bind_addr()?;

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr)
        .with_admin_recipients(parse_admin_recipients()?)
        .with_allowed_ws_origins(parse_allowed_ws_origins()?);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|e| std::io::Error::other(format!("database pool construction: {e}")))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("DATABASE_URL not set; serving fixture data");
    }

    if let Some(endpoint) = parse_push_endpoint()? {
        config = config.with_push_endpoint(endpoint);
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = build_config().await?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
