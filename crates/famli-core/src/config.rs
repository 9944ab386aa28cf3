//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `famli.toml` configuration file
//! 3. Built-in defaults
//!
//! `${VAR_NAME}` references inside the configuration file are expanded from
//! the environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default configuration file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "famli.toml";

/// Main configuration for the Famli gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the HTTP server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// JWT settings shared with the rest of the Famli backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Lifetime of freshly issued tokens
    pub token_ttl_hours: i64,

    /// Tokens with less than this much lifetime left are renewed
    pub renew_window_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            renew_window_hours: default_renew_window_hours(),
        }
    }
}

/// Twilio WhatsApp channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    pub enabled: bool,
    pub account_sid: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    /// Sender number, E.164 without the `whatsapp:` prefix
    pub phone_number: String,
    /// Public URL Twilio posts to; also the base string for signature checks
    pub webhook_url: String,
    pub verify_signature: bool,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_sid: String::new(),
            auth_token: String::new(),
            phone_number: String::new(),
            webhook_url: String::new(),
            verify_signature: true,
            api_base_url: default_twilio_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WhatsAppConfig {
    /// Whether the channel is switched on and has usable credentials
    pub fn is_active(&self) -> bool {
        self.enabled
            && !self.account_sid.is_empty()
            && !self.auth_token.is_empty()
            && !self.phone_number.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database file
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Fixed-window rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_renew_window_hours() -> i64 {
    6
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_db_path() -> String {
    "data/famli.db".to_string()
}

impl Config {
    /// Expand `${VAR_NAME}` references; unknown variables expand to nothing.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Parse configuration from TOML text (after `${VAR}` expansion).
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let toml: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        Ok(Self::from_toml_config(toml))
    }

    /// Load from `famli.toml` when present, otherwise from the environment only.
    pub fn load() -> crate::Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let server = toml.server.unwrap_or_default();
        let auth = toml.auth.unwrap_or_default();
        let whatsapp = toml.whatsapp.unwrap_or_default();
        let storage = toml.storage.unwrap_or_default();
        let rate_limit = toml.rate_limit.unwrap_or_default();

        let default_limits = RateLimitSettings::default();

        Config {
            server: ServerConfig {
                port: server.port.unwrap_or_else(default_port),
            },
            auth: AuthConfig {
                jwt_secret: auth.jwt_secret.unwrap_or_default(),
                token_ttl_hours: auth.token_ttl_hours.unwrap_or_else(default_token_ttl_hours),
                renew_window_hours: auth
                    .renew_window_hours
                    .unwrap_or_else(default_renew_window_hours),
            },
            whatsapp: WhatsAppConfig {
                enabled: whatsapp.enabled.unwrap_or(false),
                account_sid: whatsapp.account_sid.unwrap_or_default(),
                auth_token: whatsapp.auth_token.unwrap_or_default(),
                phone_number: whatsapp.phone_number.unwrap_or_default(),
                webhook_url: whatsapp.webhook_url.unwrap_or_default(),
                verify_signature: whatsapp.verify_signature.unwrap_or(true),
                api_base_url: whatsapp.api_base_url.unwrap_or_else(default_twilio_base_url),
                timeout_secs: whatsapp.timeout_secs.unwrap_or_else(default_timeout_secs),
            },
            storage: StorageConfig {
                db_path: storage.db_path.unwrap_or_else(default_db_path),
            },
            rate_limit: RateLimitSettings {
                max_requests: rate_limit.max_requests.unwrap_or(default_limits.max_requests),
                window_secs: rate_limit.window_secs.unwrap_or(default_limits.window_secs),
            },
        }
    }

    /// Override settings with environment variables
    fn apply_env_overrides(&mut self) {
        if let Some(port) = env_parse("PORT") {
            self.server.port = port;
        }

        if let Some(secret) = env_non_empty("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(sid) = env_non_empty("TWILIO_ACCOUNT_SID") {
            self.whatsapp.account_sid = sid;
        }
        if let Some(token) = env_non_empty("TWILIO_AUTH_TOKEN") {
            self.whatsapp.auth_token = token;
        }
        if let Some(number) = env_non_empty("TWILIO_WHATSAPP_NUMBER") {
            self.whatsapp.phone_number = number;
        }
        if let Some(url) = env_non_empty("WHATSAPP_WEBHOOK_URL") {
            self.whatsapp.webhook_url = url;
        }
        if let Some(enabled) = env_non_empty("WHATSAPP_ENABLED") {
            self.whatsapp.enabled = parse_flag(&enabled);
        }
        if let Some(verify) = env_non_empty("WHATSAPP_VERIFY_SIGNATURE") {
            self.whatsapp.verify_signature = parse_flag(&verify);
        }

        if let Some(path) = env_non_empty("DB_PATH") {
            self.storage.db_path = path;
        }

        if let Some(max) = env_parse("RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = max;
        }
        if let Some(window) = env_parse("RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit.window_secs = window;
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_non_empty(key).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off")
}

// ============================================================================
// TOML file structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    server: Option<TomlServerConfig>,
    auth: Option<TomlAuthConfig>,
    whatsapp: Option<TomlWhatsAppConfig>,
    storage: Option<TomlStorageConfig>,
    rate_limit: Option<TomlRateLimitConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlServerConfig {
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlAuthConfig {
    jwt_secret: Option<String>,
    token_ttl_hours: Option<i64>,
    renew_window_hours: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlWhatsAppConfig {
    enabled: Option<bool>,
    account_sid: Option<String>,
    auth_token: Option<String>,
    phone_number: Option<String>,
    webhook_url: Option<String>,
    verify_signature: Option<bool>,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlStorageConfig {
    db_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlRateLimitConfig {
    max_requests: Option<u32>,
    window_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.db_path, "data/famli.db");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.rate_limit.max_requests, 60);
        assert!(config.whatsapp.verify_signature);
        assert!(!config.whatsapp.is_active());
    }

    #[test]
    fn test_whatsapp_is_active_requires_credentials() {
        let mut wa = WhatsAppConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(!wa.is_active());

        wa.account_sid = "AC123".to_string();
        wa.auth_token = "secret".to_string();
        wa.phone_number = "+14155238886".to_string();
        assert!(wa.is_active());

        wa.enabled = false;
        assert!(!wa.is_active());
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("FAMLI_CONFIG_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${FAMLI_CONFIG_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${FAMLI_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("FAMLI_CONFIG_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_passthrough() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("cost: $5"), "cost: $5");
        assert_eq!(Config::expand_env_vars("${}_content"), "_content");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[server]
port = 9090

[auth]
jwt_secret = "s3cret"
token_ttl_hours = 12

[whatsapp]
enabled = true
account_sid = "AC123"
auth_token = "token"
phone_number = "+14155238886"
webhook_url = "https://famli.example.com/webhook"
verify_signature = false

[storage]
db_path = "/tmp/famli-test.db"

[rate_limit]
max_requests = 10
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_hours, 12);
        assert_eq!(config.auth.renew_window_hours, 6);
        assert!(config.whatsapp.is_active());
        assert!(!config.whatsapp.verify_signature);
        assert_eq!(config.whatsapp.api_base_url, "https://api.twilio.com");
        assert_eq!(config.storage.db_path, "/tmp/famli-test.db");
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_toml_config_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.whatsapp.enabled);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("OFF"));
    }
}
