pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{
    validate_country_code, validate_file_extension, validate_non_empty_string, validate_path,
    validate_range, validate_url, Validate,
};
use chrono::{DateTime, NaiveDate, Utc};
#[cfg(feature = "cli")]
use clap::Parser;
use std::time::Duration;
use toml_config::TomlConfig;

pub const ESMA_CSV_URL: &str = "https://www.esma.europa.eu/sites/default/files/2024-12/CASPS.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "index.html";
pub const DEFAULT_FOCUS_COUNTRY: &str = "NL";
// ESMA rejects requests without a browser-like agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 600;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Values that can be set on the command line; each wins over the TOML file.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct Overrides {
    /// Path to a local register CSV (skips the download)
    #[cfg_attr(feature = "cli", arg(long))]
    pub csv: Option<String>,

    /// Output HTML file [default: index.html]
    #[cfg_attr(feature = "cli", arg(short, long))]
    pub output: Option<String>,

    /// Register CSV URL [default: the ESMA CASP register]
    #[cfg_attr(feature = "cli", arg(long))]
    pub source_url: Option<String>,

    /// Member state with its own tab [default: NL]
    #[cfg_attr(feature = "cli", arg(long))]
    pub focus_country: Option<String>,

    /// Date printed in the footer, YYYY-MM-DD
    #[cfg_attr(feature = "cli", arg(long))]
    pub generated_on: Option<String>,

    /// Also write the aggregated figures as JSON to this path
    #[cfg_attr(feature = "cli", arg(long))]
    pub summary: Option<String>,

    /// Download timeout in seconds [default: 30]
    #[cfg_attr(feature = "cli", arg(long))]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header for the download
    #[cfg_attr(feature = "cli", arg(long))]
    pub user_agent: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "casp-dashboard")]
#[command(about = "Builds a static dashboard from the ESMA register of crypto-asset service providers")]
pub struct CliConfig {
    #[command(flatten)]
    pub overrides: Overrides,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Resolves flags, the optional TOML file and `SOURCE_DATE_EPOCH` into settings.
    pub fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Some(TomlConfig::from_file(path)?)
            }
            None => None,
        };
        let epoch = std::env::var("SOURCE_DATE_EPOCH").ok();
        Settings::resolve(&self.overrides, file.as_ref(), epoch.as_deref())
    }
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source_url: String,
    pub csv_path: Option<String>,
    pub output_path: String,
    pub summary_path: Option<String>,
    pub focus_country: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub generated_on: Option<NaiveDate>,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DashboardError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("Expected YYYY-MM-DD: {}", e),
        }
    })
}

fn date_from_epoch(value: &str) -> Result<NaiveDate> {
    let invalid = |reason: &str| DashboardError::InvalidConfigValueError {
        field: "SOURCE_DATE_EPOCH".to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let seconds: i64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("Expected a Unix timestamp in seconds"))?;
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| invalid("Timestamp out of range"))
}

impl Settings {
    /// Command line > TOML file > built-in defaults. The footer date falls back
    /// to `SOURCE_DATE_EPOCH` so scheduled runs stay reproducible.
    pub fn resolve(
        overrides: &Overrides,
        file: Option<&TomlConfig>,
        source_date_epoch: Option<&str>,
    ) -> Result<Self> {
        let source = file.map(|f| &f.source);
        let output = file.map(|f| &f.output);
        let dashboard = file.map(|f| &f.dashboard);

        let generated_on = match overrides
            .generated_on
            .as_deref()
            .or_else(|| dashboard.and_then(|d| d.generated_on.as_deref()))
        {
            Some(date) => Some(parse_date("generated_on", date)?),
            None => match source_date_epoch {
                Some(epoch) if !epoch.trim().is_empty() => Some(date_from_epoch(epoch)?),
                _ => None,
            },
        };

        Ok(Self {
            source_url: overrides
                .source_url
                .clone()
                .or_else(|| source.and_then(|s| s.url.clone()))
                .unwrap_or_else(|| ESMA_CSV_URL.to_string()),
            csv_path: overrides
                .csv
                .clone()
                .or_else(|| source.and_then(|s| s.csv_path.clone())),
            output_path: overrides
                .output
                .clone()
                .or_else(|| output.and_then(|o| o.path.clone()))
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            summary_path: overrides
                .summary
                .clone()
                .or_else(|| output.and_then(|o| o.summary_path.clone())),
            focus_country: overrides
                .focus_country
                .clone()
                .or_else(|| dashboard.and_then(|d| d.focus_country.clone()))
                .unwrap_or_else(|| DEFAULT_FOCUS_COUNTRY.to_string())
                .trim()
                .to_ascii_uppercase(),
            user_agent: overrides
                .user_agent
                .clone()
                .or_else(|| source.and_then(|s| s.user_agent.clone()))
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout_seconds: overrides
                .timeout_seconds
                .or_else(|| source.and_then(|s| s.timeout_seconds))
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            generated_on,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: ESMA_CSV_URL.to_string(),
            csv_path: None,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            summary_path: None,
            focus_country: DEFAULT_FOCUS_COUNTRY.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            generated_on: None,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("source_url", &self.source_url)?;
        if let Some(csv) = &self.csv_path {
            validate_path("csv", csv)?;
        }
        validate_path("output", &self.output_path)?;
        if let Some(summary) = &self.summary_path {
            validate_path("summary", summary)?;
            validate_file_extension("summary", summary, &["json"])?;
        }
        validate_country_code("focus_country", &self.focus_country)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, MAX_TIMEOUT_SECONDS)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn csv_path(&self) -> Option<&str> {
        self.csv_path.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn summary_path(&self) -> Option<&str> {
        self.summary_path.as_deref()
    }

    fn focus_country(&self) -> &str {
        &self.focus_country
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn generated_on(&self) -> Option<NaiveDate> {
        self.generated_on
    }
}
