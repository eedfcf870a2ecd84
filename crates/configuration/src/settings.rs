use rust_decimal::Decimal;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so the service starts without a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub insights: InsightSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for the HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    /// Browser origins allowed to call the API (CORS).
    pub allowed_origins: Vec<String>,
    /// Maximum accepted request body, in bytes.
    pub body_limit_bytes: usize,
}

/// Locations of the CSV files served by the dashboard endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub directory: PathBuf,
    pub subscriptions_file: String,
    pub kpi_summary_file: String,
    pub monthly_mrr_file: String,
    /// How many subscription rows the raw preview returns.
    pub preview_rows: usize,
}

/// Parameters for insight sentences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    pub currency_symbol: String,
    /// Churn rates strictly above this percentage get the cautionary wording.
    pub churn_alert_threshold_pct: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("../data"),
            subscriptions_file: "subscriptions.csv".to_string(),
            kpi_summary_file: "kpi_summary.csv".to_string(),
            monthly_mrr_file: "kpi_monthly_mrr.csv".to_string(),
            preview_rows: 50,
        }
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            churn_alert_threshold_pct: Decimal::TEN,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
            directory: None,
            file_prefix: "revpulse.log".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Settings {
    /// Checks the values serde cannot: ranges and origin syntax.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.preview_rows == 0 {
            return Err(ConfigError::ValidationError(
                "data.preview_rows must be greater than zero".to_string(),
            ));
        }
        if self.insights.churn_alert_threshold_pct.is_sign_negative() {
            return Err(ConfigError::ValidationError(
                "insights.churn_alert_threshold_pct must not be negative".to_string(),
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "server.body_limit_bytes must be greater than zero".to_string(),
            ));
        }
        for origin in &self.server.allowed_origins {
            let valid = (origin.starts_with("http://") || origin.starts_with("https://"))
                && !origin.trim_end_matches('/').ends_with(':')
                && !origin.contains(char::is_whitespace);
            if !valid {
                return Err(ConfigError::ValidationError(format!(
                    "server.allowed_origins contains an invalid origin: '{}'",
                    origin
                )));
            }
        }
        Ok(())
    }
}
