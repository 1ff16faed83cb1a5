use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL, without the `/bot<token>` part
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_telegram_timeout")]
    pub timeout_seconds: u64,
}

/// Where the plugin parameters (token, substitutions, saved chat ids) live.
#[derive(Debug, Clone, Deserialize)]
pub struct ParametersConfig {
    /// "memory", "redis" or "postgres"
    #[serde(default = "default_parameters_backend")]
    pub backend: String,
    /// Prefix of the plugin-owned keys (`{namespace}_token`, ...)
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Host-owned key holding the site base URL
    #[serde(default = "default_homepage_key")]
    pub homepage_key: String,
    /// Redis hash holding the parameters (redis backend)
    #[serde(default = "default_parameters_redis_prefix")]
    pub redis_prefix: String,
    /// Values written to the store on start when the key is still unset
    #[serde(default)]
    pub seed: ParameterSeed,
}

/// Start-up values for the plugin parameters, mapped onto the namespaced keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterSeed {
    pub token: Option<String>,
    pub replaces: Option<String>,
    pub recipients: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Pub/Sub channels carrying host events; empty disables the Redis trigger
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Per event type rendering switches.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Append the admin deep link to order messages
    #[serde(default = "default_true")]
    pub order_deep_link: bool,
    /// Append the admin deep link to form messages
    #[serde(default)]
    pub form_deep_link: bool,
    #[serde(default = "default_order_excluded_fields")]
    pub order_excluded_fields: Vec<String>,
    #[serde(default = "default_form_excluded_fields")]
    pub form_excluded_fields: Vec<String>,
}

/// OpenTelemetry exporter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout() -> u64 {
    10
}

fn default_parameters_backend() -> String {
    "memory".to_string()
}

fn default_namespace() -> String {
    "Form2TelegramPlugin".to_string()
}

fn default_homepage_key() -> String {
    "common_homepage".to_string()
}

fn default_parameters_redis_prefix() -> String {
    "f2t:parameters".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_order_excluded_fields() -> Vec<String> {
    vec!["recaptcha".to_string(), "payment".to_string()]
}

fn default_form_excluded_fields() -> Vec<String> {
    vec!["recaptcha".to_string()]
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "form2telegram".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // F2T_SERVER__PORT, F2T_TELEGRAM__TIMEOUT_SECONDS, F2T_API__KEY, ...
            .add_source(
                Environment::with_prefix("F2T")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("redis.channels")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("dispatch.order_excluded_fields")
                    .with_list_parse_key("dispatch.form_excluded_fields"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_seconds: default_telegram_timeout(),
        }
    }
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            backend: default_parameters_backend(),
            namespace: default_namespace(),
            homepage_key: default_homepage_key(),
            redis_prefix: default_parameters_redis_prefix(),
            seed: ParameterSeed::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            channels: vec![],
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            order_deep_link: true,
            form_deep_link: false,
            order_excluded_fields: default_order_excluded_fields(),
            form_excluded_fields: default_form_excluded_fields(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8082);

        let telegram = TelegramConfig::default();
        assert_eq!(telegram.api_base_url, "https://api.telegram.org");
        assert_eq!(telegram.timeout_seconds, 10);
    }

    #[test]
    fn test_dispatch_defaults_keep_form_link_off() {
        let dispatch = DispatchConfig::default();
        assert!(dispatch.order_deep_link);
        assert!(!dispatch.form_deep_link);
        assert_eq!(dispatch.order_excluded_fields, vec!["recaptcha", "payment"]);
        assert_eq!(dispatch.form_excluded_fields, vec!["recaptcha"]);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let settings: Settings = Config::builder()
            .set_default("server.port", 9000)
            .unwrap()
            .set_default("parameters.backend", "redis")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.parameters.backend, "redis");
        assert_eq!(settings.parameters.namespace, "Form2TelegramPlugin");
        assert!(settings.database.is_none());
        assert!(!settings.otel.enabled);
    }
}
