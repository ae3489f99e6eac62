use axum::http::HeaderValue;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::*;

/// What happens to a user's incomes and expenses when the user is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Refuse to delete a user who still owns records.
    #[default]
    Restrict,
    /// Delete the user's incomes and expenses along with the user.
    Cascade,
}

impl FromStr for DeletePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "restrict" => Ok(DeletePolicy::Restrict),
            "cascade" => Ok(DeletePolicy::Cascade),
            _ => Err(ConfigError::InvalidDeletePolicy(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub data_path: String,
    pub cors_origin: HeaderValue,
    pub delete_policy: DeletePolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
    #[error("Invalid user delete policy: {0} (expected 'restrict' or 'cascade')")]
    InvalidDeletePolicy(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("SERVER_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let data_path = env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        // Validate port is a valid number
        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(port));
        }

        let cors_origin = HeaderValue::from_str(&cors_origin)
            .map_err(|_| ConfigError::InvalidCorsOrigin(cors_origin))?;

        let delete_policy = match env::var("USER_DELETE_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => DeletePolicy::default(),
        };

        Ok(Config {
            host,
            port,
            data_path,
            cors_origin,
            delete_policy,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
