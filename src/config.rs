// src/config.rs
use crate::types::{Backend, BearingCatalog};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base name of the optional config file (the `config` crate picks the extension).
pub const CONFIG_BASENAME: &str = "config/app";
pub const CONFIG_FILE: &str = "config/app.toml";
pub const ENV_PREFIX: &str = "BEARING";

/// Immutable application configuration, loaded once at startup and shared as `Arc<AppConfig>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ui: UiConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub probe: ProbeConfig,
    pub forecast: ForecastConfig,
    pub bearings: BearingCatalog,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// "ru" or "en".
    pub language: String,
    /// Extra font appended to the egui font families (e.g. a system font with wider coverage).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: "ru".to_owned(),
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false the app opens straight on the main window without a database session.
    pub required: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { required: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 5432,
            dbname: "bearing_db".to_owned(),
            connect_timeout_secs: 10,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "www.google.com".to_owned(),
            port: 80,
            timeout_secs: 5,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandKind {
    /// Constant half-width around each value.
    Fixed,
    /// Prediction interval from the series' standard deviation.
    Interval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub points: u32,
    pub band: BandKind,
    pub half_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            points: 10,
            band: BandKind::Fixed,
            half_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub backend: Backend,
    pub timeout_secs: u64,
    pub mail: MailConfig,
    pub telegram: TelegramConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Mail,
            timeout_secs: 20,
            mail: MailConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl NotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub password_file: PathBuf,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_owned(),
            smtp_port: 587,
            sender: "monitoring@example.com".to_owned(),
            recipient: "maintenance@example.com".to_owned(),
            subject: "Замена подшипника".to_owned(),
            password_file: PathBuf::from("secrets/mail_password.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token_file: PathBuf,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_owned(),
            token_file: PathBuf::from("secrets/bot_token.txt"),
        }
    }
}

impl AppConfig {
    fn validate(self) -> Result<Self> {
        if self.bearings.is_empty() {
            anyhow::bail!("configuration must list at least one bearing");
        }
        if self.forecast.points == 0 {
            anyhow::bail!("forecast.points must be at least 1");
        }
        Ok(self)
    }
}

/// Loads `config/app.toml` (optional) with `BEARING_*` environment overrides,
/// e.g. `BEARING_PROBE__HOST=example.org`.
pub fn load_app_config() -> Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_BASENAME).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to read configuration")?;

    let cfg: AppConfig = settings
        .try_deserialize()
        .context("failed to parse configuration")?;
    cfg.validate()
}

/// Parses a TOML document on top of the defaults.
pub fn parse_app_config(raw: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(raw).context("invalid TOML configuration")?;
    cfg.validate()
}

/// Writes the default configuration to `path` unless a file is already there.
///
/// Returns `true` when a new file was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = toml::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
