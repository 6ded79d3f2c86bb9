use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::calibrate::CalibrationRequest;
use crate::kalshi::rest::VALID_PERIODS;
use crate::monitor::MonitorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub kalshi: KalshiConfig,
    pub monitor: MonitorSection,
    pub calibration: CalibrationSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KalshiConfig {
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    pub model_path: String,
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_skip_secs")]
    pub skip_interval_secs: u64,
    #[serde(default = "default_poll_secs")]
    pub base_retry_secs: u64,
    #[serde(default = "default_max_retry_secs")]
    pub max_retry_secs: u64,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationSection {
    pub ticker_x: String,
    pub ticker_y: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub mixing_factor: f64,
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_poll_secs() -> u64 {
    10
}

fn default_skip_secs() -> u64 {
    5
}

fn default_max_retry_secs() -> u64 {
    300
}

fn default_error_threshold() -> u32 {
    3
}

fn default_period_minutes() -> u32 {
    60
}

impl MonitorSection {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            skip_interval: Duration::from_secs(self.skip_interval_secs),
            base_retry_delay: Duration::from_secs(self.base_retry_secs),
            max_retry_delay: Duration::from_secs(self.max_retry_secs),
            error_threshold: self.error_threshold,
        }
    }
}

impl CalibrationSection {
    pub fn request(&self) -> CalibrationRequest {
        CalibrationRequest {
            ticker_x: self.ticker_x.clone(),
            ticker_y: self.ticker_y.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            mixing_factor: self.mixing_factor,
            period_minutes: self.period_minutes,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Path::new("config/default.toml");
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config: Config =
            toml::from_str(&config_str).context("failed to parse config/default.toml")?;

        if let Ok(base) = std::env::var("KALSHI_API_BASE") {
            config.kalshi.api_base = base;
        }
        if let Ok(path) = std::env::var("MODEL_PATH") {
            config.monitor.model_path = path;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !VALID_PERIODS.contains(&self.calibration.period_minutes) {
            bail!(
                "calibration.period_minutes must be one of {:?}, got {}",
                VALID_PERIODS,
                self.calibration.period_minutes
            );
        }
        if self.monitor.poll_interval_secs == 0 {
            bail!("monitor.poll_interval_secs must be > 0");
        }
        if self.monitor.max_retry_secs < self.monitor.base_retry_secs {
            bail!("monitor.max_retry_secs must be >= monitor.base_retry_secs");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[kalshi]
api_base = "https://api.elections.kalshi.com/trade-api/v2"

[monitor]
model_path = "model.json"
poll_interval_secs = 10
skip_interval_secs = 5
base_retry_secs = 10
max_retry_secs = 300
error_threshold = 3

[calibration]
ticker_x = "KXSPACEXCOUNT-25-140"
ticker_y = "KXHURCTOTMAJ-25DEC01-T5"
start = "-60d"
end = "now"
mixing_factor = 0.0
period_minutes = 60

[logging]
level = "info"
"#;

    #[test]
    fn parse_default_toml() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.monitor.model_path, "model.json");
        assert_eq!(config.calibration.period_minutes, 60);
        assert!((config.calibration.mixing_factor - 0.0).abs() < f64::EPSILON);
        assert_eq!(config.monitor.monitor_config().poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let minimal = r#"
[kalshi]
api_base = "https://example.com"

[monitor]
model_path = "model.json"

[calibration]
ticker_x = "X"
ticker_y = "Y"
start = "-30d"
end = "now"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(minimal).unwrap();
        config.validate().unwrap();
        assert_eq!(config.monitor.poll_interval_secs, 10);
        assert_eq!(config.monitor.skip_interval_secs, 5);
        assert_eq!(config.monitor.max_retry_secs, 300);
        assert_eq!(config.monitor.error_threshold, 3);
        assert_eq!(config.calibration.mixing_factor, 0.0);
        assert_eq!(config.calibration.period_minutes, 60);
    }

    #[test]
    fn bad_period_is_rejected_at_load() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.calibration.period_minutes = 15;
        assert!(config.validate().is_err());
    }

    #[test]
    fn backoff_ceiling_below_baseline_is_rejected() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.monitor.max_retry_secs = 5;
        assert!(config.validate().is_err());
    }
}
