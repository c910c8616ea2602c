//! Runtime configuration from the environment (optionally loaded from `.env`).
//!
//! HOST, PORT, DATABASE_URL, DATABASE_MAX_CONNECTIONS, SKIP_MIGRATIONS.

use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub skip_migrations: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://tournament.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| default_host()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or_else(default_max_connections),
            skip_migrations: env::var("SKIP_MIGRATIONS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            skip_migrations: false,
        }
    }
}
