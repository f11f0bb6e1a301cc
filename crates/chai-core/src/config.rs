//! Configuration management for the Chai admin console

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Application identity
    #[serde(default)]
    pub app: AppConfig,

    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Navigation and menu configuration
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Title appended to every document title
    #[serde(default = "default_app_title")]
    pub title: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Endpoint returning the permission node list
    #[serde(default = "default_menu_endpoint")]
    pub menu_endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Navigation and menu configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Login page
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Not-found page
    #[serde(default = "default_not_found_path")]
    pub not_found_path: String,

    /// Forbidden page
    #[serde(default = "default_forbidden_path")]
    pub forbidden_path: String,

    /// Server error page
    #[serde(default = "default_server_error_path")]
    pub server_error_path: String,

    /// Default landing page after login
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Paths reachable without authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Deepest tree level kept by the tree builder
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Registry key of the view mounted when a component cannot be resolved
    #[serde(default = "default_not_found_view")]
    pub not_found_view: String,

    /// Title of the synthetic home menu entry
    #[serde(default = "default_home_title")]
    pub home_title: String,

    /// Icon of the synthetic home menu entry
    #[serde(default = "default_home_icon")]
    pub home_icon: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines
    #[default]
    Json,
    /// Human readable text
    Text,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_app_title() -> String {
    "Chai Admin".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_menu_endpoint() -> String {
    "/sys/menu/router".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_not_found_path() -> String {
    "/404".to_string()
}

fn default_forbidden_path() -> String {
    "/403".to_string()
}

fn default_server_error_path() -> String {
    "/500".to_string()
}

fn default_landing_path() -> String {
    "/dashboard".to_string()
}

fn default_public_paths() -> Vec<String> {
    vec![
        default_login_path(),
        default_forbidden_path(),
        default_not_found_path(),
        default_server_error_path(),
    ]
}

const fn default_max_depth() -> usize {
    10
}

fn default_not_found_view() -> String {
    "error/404View".to_string()
}

fn default_home_title() -> String {
    "Dashboard".to_string()
}

fn default_home_icon() -> String {
    "Odometer".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: default_app_title(),
            version: default_app_version(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            menu_endpoint: default_menu_endpoint(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            not_found_path: default_not_found_path(),
            forbidden_path: default_forbidden_path(),
            server_error_path: default_server_error_path(),
            landing_path: default_landing_path(),
            public_paths: default_public_paths(),
            max_depth: default_max_depth(),
            not_found_view: default_not_found_view(),
            home_title: default_home_title(),
            home_icon: default_home_icon(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl RouterConfig {
    /// Whether a path is reachable without authentication
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| public == path)
    }
}

impl ConsoleConfig {
    /// Load configuration from an optional `console` file and `CHAI_` environment variables
    ///
    /// Nested keys use a double underscore, e.g. `CHAI_API__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> Result<Self> {
        Self::load_from("console")
    }

    /// Load configuration from the named file (extension optional) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load_from(file: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("CHAI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("router.public_paths"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.api.menu_endpoint.trim().is_empty() {
            return Err(Error::configuration("api.menu_endpoint must not be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::configuration("api.timeout_secs must be positive"));
        }
        if self.router.max_depth == 0 {
            return Err(Error::configuration("router.max_depth must be positive"));
        }

        let router = &self.router;
        for (name, path) in [
            ("router.login_path", &router.login_path),
            ("router.not_found_path", &router.not_found_path),
            ("router.forbidden_path", &router.forbidden_path),
            ("router.server_error_path", &router.server_error_path),
            ("router.landing_path", &router.landing_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::configuration(format!(
                    "{name} must be an absolute path, got {path:?}"
                )));
            }
        }
        Ok(())
    }
}
