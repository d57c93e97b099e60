//! Runtime configuration read from the environment (and `.env`, via dotenvy).

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9966";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub security_enabled: bool,
    /// `None` allows any origin.
    pub cors_allowed_origin: Option<HeaderValue>,
    pub admin: Option<AdminCredentials>,
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let security_enabled = match lookup("PETCLINIC_SECURITY_ENABLE") {
            Some(value) => parse_bool("PETCLINIC_SECURITY_ENABLE", &value)?,
            None => true,
        };

        let cors_allowed_origin = match lookup("CORS_ALLOWED_ORIGIN") {
            Some(origin) if origin != "*" => Some(HeaderValue::from_str(&origin).map_err(|_| {
                ConfigError::Invalid {
                    name: "CORS_ALLOWED_ORIGIN",
                    value: origin.clone(),
                }
            })?),
            _ => None,
        };

        let admin = match (
            lookup("PETCLINIC_ADMIN_USERNAME"),
            lookup("PETCLINIC_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("PETCLINIC_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("PETCLINIC_ADMIN_USERNAME")),
        };

        Ok(Self {
            database_url,
            bind_addr,
            security_enabled,
            cors_allowed_origin,
            admin,
        })
    }
}
