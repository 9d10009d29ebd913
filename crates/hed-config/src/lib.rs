//! Configuration management for the Health Equity Dashboard.
//!
//! Parses `hed.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `auth.username`
//! - `auth.password`
//! - `uploads.base_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override database file.
    pub database: Option<PathBuf>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "hed.toml";

/// Default upload size limit (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration (path is a relative string from TOML).
    database: DatabaseConfigRaw,
    /// Login credentials.
    pub auth: AuthConfig,
    /// Upload configuration (directory is a relative string from TOML).
    uploads: UploadsConfigRaw,
    /// Site titles.
    pub site: SiteConfig,

    /// Resolved database configuration (set after loading).
    #[serde(skip)]
    pub database_resolved: DatabaseConfig,
    /// Resolved uploads configuration (set after loading).
    #[serde(skip)]
    pub uploads_resolved: UploadsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DatabaseConfigRaw {
    path: Option<String>,
}

/// Resolved database configuration.
#[derive(Debug, Default)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
}

/// Shared-secret login configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Admin username.
    pub username: String,
    /// Admin password. Empty means unset.
    pub password: String,
    /// Realm announced in `WWW-Authenticate`.
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_owned(),
            password: String::new(),
            realm: "Health Equity Dashboard".to_owned(),
        }
    }
}

impl AuthConfig {
    /// Validate that credentials are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if username or password is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.username, "auth.username")?;
        require_non_empty(&self.password, "auth.password")?;
        require_non_empty(&self.realm, "auth.realm")?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct UploadsConfigRaw {
    dir: Option<String>,
    base_url: Option<String>,
    max_bytes: Option<usize>,
}

/// Resolved upload configuration.
#[derive(Debug)]
pub struct UploadsConfig {
    /// Directory uploaded images are written to.
    pub dir: PathBuf,
    /// Public URL prefix for uploaded images.
    pub base_url: String,
    /// Largest accepted upload in bytes.
    pub max_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            base_url: "/uploads".to_owned(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Site titles shown by clients.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Site subtitle.
    pub subtitle: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Health Equity Dashboard".to_owned(),
            subtitle: "Monthly Insights".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`auth.password`").
        field: String,
        /// Error message (e.g., "${`HED_PASSWORD`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL prefix to be site-relative or use http:// or https://.
fn require_url_prefix(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with('/') && !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with /, http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `hed.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(database) = &settings.database {
            self.database_resolved.path.clone_from(database);
        }
    }

    /// Get validated login configuration.
    ///
    /// Use this instead of accessing the `auth` field directly when the
    /// command serves protected routes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if username or password is unset.
    pub fn require_auth(&self) -> Result<&AuthConfig, ConfigError> {
        self.auth.validate()?;
        Ok(&self.auth)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfigRaw::default(),
            auth: AuthConfig::default(),
            uploads: UploadsConfigRaw::default(),
            site: SiteConfig::default(),
            database_resolved: DatabaseConfig {
                path: base.join("hed.db"),
            },
            uploads_resolved: UploadsConfig {
                dir: base.join("uploads"),
                ..UploadsConfig::default()
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file. Credentials are not
    /// checked here; see [`Config::require_auth`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_uploads()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_uploads(&self) -> Result<(), ConfigError> {
        let uploads = &self.uploads_resolved;
        require_non_empty(&uploads.base_url, "uploads.base_url")?;
        require_url_prefix(&uploads.base_url, "uploads.base_url")?;

        if uploads.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "uploads.max_bytes must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.auth.username = expand::expand_env(&self.auth.username, "auth.username")?;
        self.auth.password = expand::expand_env(&self.auth.password, "auth.password")?;

        if let Some(ref url) = self.uploads.base_url {
            self.uploads.base_url = Some(expand::expand_env(url, "uploads.base_url")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.database_resolved = DatabaseConfig {
            path: resolve(self.database.path.as_deref(), "hed.db"),
        };

        let defaults = UploadsConfig::default();
        self.uploads_resolved = UploadsConfig {
            dir: resolve(self.uploads.dir.as_deref(), "uploads"),
            base_url: self
                .uploads
                .base_url
                .as_deref()
                .map_or(defaults.base_url, |url| url.trim_end_matches('/').to_owned()),
            max_bytes: self.uploads.max_bytes.unwrap_or(defaults.max_bytes),
        };
    }
}
