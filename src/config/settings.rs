//! Application settings from config.toml and the environment.
//!
//! An optional `config.toml` supplies defaults for the bind address and
//! database URL; `BIND_ADDR` and `DATABASE_URL` environment variables take
//! precedence. Everything falls back to built-in defaults so the service
//! starts with zero configuration.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Parsed contents of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,
}

/// `[server]` section of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    /// Address to bind the HTTP listener to
    pub bind_addr: Option<String>,
}

/// `[database]` section of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: Option<String>,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Database connection URL
    pub database_url: String,
}

/// Loads settings from a TOML file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration from `./config.toml` (if present)
/// and the environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let settings = if Path::new("config.toml").exists() {
        load_settings("config.toml")?
    } else {
        Settings::default()
    };

    Ok(resolve(
        settings,
        std::env::var("BIND_ADDR").ok(),
        std::env::var("DATABASE_URL").ok(),
    ))
}

/// Merges file settings with environment overrides and built-in defaults.
/// Environment variables win over the file; the file wins over defaults.
fn resolve(settings: Settings, env_bind: Option<String>, env_db: Option<String>) -> AppConfig {
    let bind_addr = env_bind
        .or(settings.server.bind_addr)
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let database_url = env_db
        .or(settings.database.url)
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    AppConfig {
        bind_addr,
        database_url,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            [server]
            bind_addr = "127.0.0.1:8080"

            [database]
            url = "sqlite://test.sqlite"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(
            settings.server.bind_addr.as_deref(),
            Some("127.0.0.1:8080")
        );
        assert_eq!(settings.database.url.as_deref(), Some("sqlite://test.sqlite"));
    }

    #[test]
    fn test_parse_settings_sections_optional() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.server.bind_addr.is_none());
        assert!(settings.database.url.is_none());
    }

    #[test]
    fn test_resolve_precedence() {
        let settings = Settings {
            server: ServerSettings {
                bind_addr: Some("file:1".to_string()),
            },
            database: DatabaseSettings {
                url: Some("file-db".to_string()),
            },
        };

        // Environment wins over file.
        let config = resolve(settings, Some("env:1".to_string()), None);
        assert_eq!(config.bind_addr, "env:1");
        assert_eq!(config.database_url, "file-db");

        // Defaults apply when neither is set.
        let config = resolve(Settings::default(), None, None);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }
}
