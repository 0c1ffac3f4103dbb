use serde::Deserialize;
use slipway_booking::schedule::ScheduleRules;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub email: EmailConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub schedule: ScheduleRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Hosted-checkout payment provider settings.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub public_key: String,
    pub secret_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub failure_url: String,
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,
}

fn default_currency() -> String {
    "ZAR".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}

/// Transactional mail provider settings.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    pub admin_address: Option<String>,
    #[serde(default = "default_mail_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_mail_retry_delay")]
    pub retry_delay_seconds: u64,
}

fn default_from_name() -> String {
    "Jet Ski & More".to_string()
}

fn default_mail_attempts() -> u32 {
    3
}

fn default_mail_retry_delay() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Dashboard credentials. Admin routes reject everything until both are set.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Then the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Then a local file that shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Finally environment variables with a SLIPWAY prefix,
            // e.g. SLIPWAY__DATABASE__URL
            .add_source(config::Environment::with_prefix("SLIPWAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
