use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub places: PlacesSettings,
    #[serde(default)]
    pub valuation: ValuationSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub static_files: StaticFileSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }

/// Address autocomplete provider (Google Places)
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    #[serde(default = "default_places_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            endpoint: default_places_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_places_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

/// Property valuation provider (Zillow)
#[derive(Debug, Clone, Deserialize)]
pub struct ValuationSettings {
    #[serde(default = "default_valuation_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            endpoint: default_valuation_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_valuation_endpoint() -> String {
    "https://www.zillow.com/webservice".to_string()
}

fn default_timeout_secs() -> u64 { 30 }

/// SMTP relay credentials
///
/// Every field is optional here: the email route checks them when it is
/// called, so the rest of the service runs without mail configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailSettings {
    pub host: Option<String>,
    /// Kept as text so a bad value only breaks the email route
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub sender_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticFileSettings {
    #[serde(default = "default_static_root")]
    pub root: String,
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for StaticFileSettings {
    fn default() -> Self {
        Self {
            root: default_static_root(),
            index: default_index(),
        }
    }
}

fn default_static_root() -> String { "client/build".to_string() }
fn default_index() -> String { "index.html".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Plain environment variables mapped onto config keys.
///
/// These are the names the deployment already uses, so they win over the
/// `GATEWAY__` prefixed form.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("GOOGLE_PLACES_API_KEY", "places.api_key"),
    ("ZILLOW_API_KEY", "valuation.api_key"),
    ("EMAIL_HOST", "email.host"),
    ("EMAIL_PORT", "email.port"),
    ("EMAIL_USER", "email.user"),
    ("EMAIL_PASSWORD", "email.password"),
    ("EMAIL_SENDER_ADDRESS", "email.sender_address"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with GATEWAY__)
    /// 4. Plain environment variables such as EMAIL_HOST or ZILLOW_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., GATEWAY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let lookup = |name: &str| std::env::var(name).ok();
        apply_env_overrides(settings, lookup)?.try_deserialize()
    }
}

/// Apply the plain environment variables in [`ENV_OVERRIDES`] on top of `settings`
fn apply_env_overrides<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
