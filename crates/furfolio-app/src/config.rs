//! Configuration management for furfolio
//!
//! Config stored at: ~/.config/furfolio/config.json

use std::path::{Path, PathBuf};

use furfolio_domain::service::{ChurnModel, LoyaltyProgram, RetentionThresholds, TrendOptions};
use furfolio_types::{ConfigError, OutputFormat, Result, MAX_SPAN_DAYS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the CSV exports (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub retention: RetentionThresholds,

    #[serde(default)]
    pub churn: ChurnModel,

    #[serde(default)]
    pub trends: TrendOptions,

    /// Exponential smoothing factor for booking forecasts
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,

    /// Days of booking history fed into the forecast
    #[serde(default = "default_forecast_history_days")]
    pub forecast_history_days: u32,

    #[serde(default = "default_forecast_horizon_days")]
    pub forecast_horizon_days: u32,

    #[serde(default)]
    pub loyalty: LoyaltyProgram,

    /// TOML file overriding the built-in behavior keywords
    #[serde(default)]
    pub keyword_rules: Option<PathBuf>,

    /// Maximum number of retained audit events
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_smoothing_alpha() -> f64 {
    0.3
}

fn default_forecast_history_days() -> u32 {
    60
}

fn default_forecast_horizon_days() -> u32 {
    7
}

fn default_audit_capacity() -> usize {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            output_format: default_output_format(),
            retention: RetentionThresholds::default(),
            churn: ChurnModel::default(),
            trends: TrendOptions::default(),
            smoothing_alpha: default_smoothing_alpha(),
            forecast_history_days: default_forecast_history_days(),
            forecast_horizon_days: default_forecast_horizon_days(),
            loyalty: LoyaltyProgram::default(),
            keyword_rules: None,
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("furfolio");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("furfolio");
        Ok(data_dir)
    }

    /// Load config from the default location, or fall back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.retention.validate()?;
        self.churn.validate()?;
        self.loyalty.validate()?;
        if !(0.0..=1.0).contains(&self.smoothing_alpha) {
            return Err(ConfigError::Invalid(format!(
                "smoothing_alpha must be within [0, 1], got {}",
                self.smoothing_alpha
            )));
        }
        let spans = [
            ("trends.window_days", self.trends.window_days, 1),
            ("forecast_history_days", self.forecast_history_days, 1),
            ("forecast_horizon_days", self.forecast_horizon_days, 0),
        ];
        for (name, days, min) in spans {
            if days < min || days > MAX_SPAN_DAYS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within {}..={}, got {}",
                    name, min, MAX_SPAN_DAYS, days
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Furfolio Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Data dir:          {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:     {}", self.output_format)?;
        writeln!(
            f,
            "Retention days:    new {} / active {} / at-risk {} / inactive {}",
            self.retention.new_customer_days,
            self.retention.active_days,
            self.retention.at_risk_days,
            self.retention.inactive_days
        )?;
        writeln!(
            f,
            "Churn weights:     R {:.2} / F {:.2} / M {:.2} (lookback {} days)",
            self.churn.recency_weight,
            self.churn.frequency_weight,
            self.churn.monetary_weight,
            self.churn.lookback_days
        )?;
        writeln!(
            f,
            "Trend window:      {} days (steady within ±{:.1}%)",
            self.trends.window_days, self.trends.steady_band_percent
        )?;
        writeln!(
            f,
            "Forecast:          alpha {:.2}, {} days history, {} days ahead",
            self.smoothing_alpha, self.forecast_history_days, self.forecast_horizon_days
        )?;
        writeln!(
            f,
            "Loyalty:           reward every {} visits",
            self.loyalty.visits_per_reward
        )?;
        writeln!(
            f,
            "Keyword rules:     {}",
            self.keyword_rules
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:       {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "retention": { "at_risk_days": 100 }, "smoothing_alpha": 0.5 }"#,
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.retention.at_risk_days, 100);
        assert_eq!(config.retention.inactive_days, 180);
        assert_eq!(config.smoothing_alpha, 0.5);
        assert_eq!(config.trends.window_days, 30);
        assert_eq!(config.output_format, OutputFormat::Table);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/furfolio")),
            forecast_horizon_days: 14,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config {
            smoothing_alpha: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "retention": { "at_risk_days": 500 } }"#).unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_oversized_day_spans_rejected() {
        let mut config = Config::default();
        config.trends.window_days = 4_000_000_000;
        assert!(config.validate().is_err());

        for config in [
            Config {
                forecast_history_days: 4_000_000_000,
                ..Config::default()
            },
            Config {
                forecast_horizon_days: MAX_SPAN_DAYS + 1,
                ..Config::default()
            },
        ] {
            assert!(config.validate().is_err());
        }

        let mut config = Config::default();
        config.churn.lookback_days = MAX_SPAN_DAYS + 1;
        assert!(config.validate().is_err());

        let config = Config {
            forecast_horizon_days: MAX_SPAN_DAYS,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config {
            data_dir: Some(PathBuf::from("exports")),
            ..Config::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("exports"));
    }
}
