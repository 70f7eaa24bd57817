use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_key::to_key;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayKind {
    National,
    Religious,
    State,
    Observance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub name: String,
    pub kind: HolidayKind,
    pub description: String,
}

/// Anything that can list the holidays of a Gregorian year, keyed by date key.
pub trait HolidaySource: Send + Sync {
    fn holidays_for(&self, year: i32) -> HashMap<String, Holiday>;

    fn holiday_on(&self, date: NaiveDate) -> Option<Holiday> {
        self.holidays_for(date.year()).remove(&to_key(date))
    }
}

/// One `[[holiday]]` entry of a holiday file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HolidayEntry {
    date: NaiveDate,
    name: String,
    #[serde(default = "default_kind")]
    kind: HolidayKind,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HolidayFile {
    #[serde(default)]
    holiday: Vec<HolidayEntry>,
}

fn default_kind() -> HolidayKind {
    HolidayKind::National
}

/// Holidays held in memory, built in code or read from TOML.
#[derive(Debug, Clone, Default)]
pub struct HolidayTable {
    days: BTreeMap<NaiveDate, Holiday>,
}

impl HolidayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the holiday on `date`. A missing description falls back to the name.
    pub fn insert(
        &mut self,
        date: NaiveDate,
        name: impl Into<String>,
        kind: HolidayKind,
        description: Option<String>,
    ) {
        let name = name.into();
        let description = description.unwrap_or_else(|| name.clone());
        self.days.insert(date, Holiday { name, kind, description });
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: HolidayFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut table = Self::new();
        for entry in file.holiday {
            table.insert(entry.date, entry.name, entry.kind, entry.description);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }
}

impl HolidaySource for HolidayTable {
    fn holidays_for(&self, year: i32) -> HashMap<String, Holiday> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return HashMap::new();
        };
        self.days
            .range(start..=end)
            .map(|(date, holiday)| (to_key(*date), holiday.clone()))
            .collect()
    }

    fn holiday_on(&self, date: NaiveDate) -> Option<Holiday> {
        self.days.get(&date).cloned()
    }
}
