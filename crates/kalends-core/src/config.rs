use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub expansion: ExpansionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// PRODID emitted on every generated VCALENDAR.
    pub prodid: String,
    /// iCalendar VERSION string.
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpansionConfig {
    /// Hard cap on occurrences generated from a single rule.
    pub max_instances: usize,
    /// Default query-window span, in days, when the host gives none.
    pub default_window_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("calendar.prodid", "-//Kalends//Kalends Scheduling Engine//EN")?
            .set_default("calendar.version", "2.0")?
            .set_default("expansion.max_instances", 10_000)?
            .set_default("expansion.default_window_days", 42)?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig {
                prodid: "-//Kalends//Kalends Scheduling Engine//EN".to_string(),
                version: "2.0".to_string(),
            },
            expansion: ExpansionConfig {
                max_instances: 10_000,
                default_window_days: 42,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        prodid = %settings.calendar.prodid,
        max_instances = settings.expansion.max_instances,
        "configuration loaded"
    );
    Ok(settings)
}
