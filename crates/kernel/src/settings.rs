use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKING_ENV";
const CONFIG_DIR_ENV: &str = "BOOKING_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKING";

/// Plain variables honoured on top of every other source.
const PORT_ENV: &str = "PORT";
const MONGO_URI_ENV: &str = "MONGO_URI";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub bookings: BookingSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `BOOKING_*` variables and finally `PORT` / `MONGO_URI`.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            // Default to repo root `config` directory.
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_filename = format!("{}.toml", environment);
        let environment_path = config_dir.join(environment_filename);

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // Override environment field with parsed enum variant.
        settings.environment = parse_environment(&environment)?;
        settings.apply_overrides(|key| std::env::var(key).ok())?;

        Ok(settings)
    }

    /// Apply `PORT` and `MONGO_URI` from `lookup`, which take precedence over
    /// file and prefixed sources.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV).filter(|value| !value.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {PORT_ENV} value '{port}'"))?;
        }

        if let Some(uri) = lookup(MONGO_URI_ENV).filter(|value| !value.trim().is_empty()) {
            self.database.uri = Some(uri);
        }

        Ok(())
    }
}

fn parse_environment(value: &str) -> anyhow::Result<Environment> {
    match value {
        "local" => Ok(Environment::Local),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(anyhow!(
            "unsupported environment '{}'; expected local/staging/production",
            other
        )),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// MongoDB connection string. Required at startup.
    #[serde(default)]
    pub uri: Option<String>,
    /// Database used when the connection string names none.
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
}

impl DatabaseSettings {
    fn default_name() -> String {
        "booking".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            uri: None,
            name: Self::default_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Fallback filter directive when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingSettings {
    /// Largest party accepted for a single booking.
    #[serde(default = "BookingSettings::default_max_party_size")]
    pub max_party_size: u32,
}

impl BookingSettings {
    fn default_max_party_size() -> u32 {
        20
    }
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            max_party_size: Self::default_max_party_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_port_is_5000() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn database_uri_has_no_default() {
        let settings = Settings::default();
        assert!(settings.database.uri.is_none());
        assert_eq!(settings.database.name, "booking");
    }

    #[test]
    fn port_and_mongo_uri_override() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup_from(&[
                ("PORT", "8081"),
                ("MONGO_URI", "mongodb://db:27017/reservations"),
            ]))
            .unwrap();

        assert_eq!(settings.server.port, 8081);
        assert_eq!(
            settings.database.uri.as_deref(),
            Some("mongodb://db:27017/reservations")
        );
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup_from(&[("PORT", " "), ("MONGO_URI", "")]))
            .unwrap();

        assert_eq!(settings.server.port, 5000);
        assert!(settings.database.uri.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(lookup_from(&[("PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid PORT"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert_eq!(
            parse_environment("production").unwrap(),
            Environment::Production
        );
        assert!(parse_environment("qa").is_err());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "server": { "port": 7000 },
            "bookings": {}
        }))
        .unwrap();

        assert_eq!(settings.server.port, 7000);
        assert_eq!(settings.server.request_timeout_ms, 15000);
        assert_eq!(settings.bookings.max_party_size, 20);
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
    }
}
