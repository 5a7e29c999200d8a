use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub payhere: PayHereConfig,
    #[serde(default)]
    pub notifications: Option<NotificationConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PayHereConfig {
    pub merchant_id: Option<String>,
    pub merchant_secret: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub enabled: bool,
}

fn default_currency() -> String {
    "LKR".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("payhere.currency", "LKR")?
            .set_default("payhere.enabled", false)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with TURFBOOK__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TURFBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://turfbook.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
            },
            payhere: PayHereConfig {
                merchant_id: None,
                merchant_secret: None,
                currency: "LKR".to_string(),
                enabled: false,
            },
            notifications: None,
        }
    }
}
