use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::approx::{ApproximationEngine, ChineseApproximator, HijriAnchor, HijriApproximator};
use crate::error::ConfigError;

/// Top-level configuration, usually read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub hijri: HijriConfig,

    #[serde(default)]
    pub chinese: ChineseConfig,

    #[serde(default)]
    pub holidays: HolidaysConfig,
}

/// Conversion service endpoints and the switch that allows calling them.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_hijri_base_url")]
    pub hijri_base_url: String,
    #[serde(default = "default_chinese_base_url")]
    pub chinese_base_url: String,
    #[serde(default)]
    pub chinese_api_key: Option<String>,
    #[serde(default)]
    pub chinese_api_host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

/// Extra Hijri anchors on top of 1 August 2025 = 7 Safar 1447.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HijriConfig {
    #[serde(default)]
    pub anchors: Vec<HijriAnchor>,
}

/// Chinese New Year dates, keyed by Gregorian year.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChineseConfig {
    #[serde(default)]
    pub new_years: BTreeMap<String, NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HolidaysConfig {
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}
fn default_timeout_ms() -> u64 {
    2_500
}
fn default_hijri_base_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_chinese_base_url() -> String {
    "https://chinese-lunar-calendar.p.rapidapi.com".to_string()
}
fn default_ttl_hours() -> u32 {
    24
}
fn default_max_in_flight() -> usize {
    42
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            timeout_ms: default_timeout_ms(),
            hijri_base_url: default_hijri_base_url(),
            chinese_base_url: default_chinese_base_url(),
            chinese_api_key: None,
            chinese_api_host: None,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl CalendarConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CalendarConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.timeout_ms == 0 {
            return Err(ConfigError::Invalid("remote.timeout_ms must be positive".into()));
        }
        if self.cache.ttl_hours == 0 {
            return Err(ConfigError::Invalid("cache.ttl_hours must be positive".into()));
        }
        if self.batch.max_in_flight == 0 {
            return Err(ConfigError::Invalid("batch.max_in_flight must be at least 1".into()));
        }
        for anchor in &self.hijri.anchors {
            if !(1..=30).contains(&anchor.day) || !(1..=12).contains(&anchor.month) {
                return Err(ConfigError::Invalid(format!(
                    "hijri anchor {} has day {} month {}",
                    anchor.gregorian, anchor.day, anchor.month
                )));
            }
        }
        for (year, date) in &self.chinese.new_years {
            let year: i32 = year.parse().map_err(|_| {
                ConfigError::Invalid(format!("chinese.new_years key `{}` is not a year", year))
            })?;
            if date.year() != year {
                return Err(ConfigError::Invalid(format!(
                    "chinese new year for {} falls in {}",
                    year,
                    date.year()
                )));
            }
        }
        Ok(())
    }

    /// Approximation engine with the configured anchors layered over the defaults.
    pub fn approximation_engine(&self) -> ApproximationEngine {
        let hijri = self
            .hijri
            .anchors
            .iter()
            .fold(HijriApproximator::default(), |approx, anchor| approx.with_anchor(*anchor));
        let chinese = self
            .chinese
            .new_years
            .values()
            .fold(ChineseApproximator::default(), |approx, date| approx.with_new_year(*date));
        ApproximationEngine::new(hijri, chinese)
    }
}
