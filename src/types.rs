use std::fmt;

use serde::Serialize;

/// Islamic month names, Muharram first.
pub const HIJRI_MONTHS: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi al-Awwal",
    "Rabi al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

/// Chinese lunar month names, 正月 first.
pub const CHINESE_MONTHS: [&str; 12] = [
    "正月", "二月", "三月", "四月", "五月", "六月",
    "七月", "八月", "九月", "十月", "十一月", "腊月",
];

/// Clamps a day into `[1, 30]`.
pub(crate) fn clamp_day(day: i64) -> u32 {
    day.clamp(1, 30) as u32
}

/// Clamps a month into `[1, 12]`.
pub(crate) fn clamp_month(month: i64) -> u32 {
    month.clamp(1, 12) as u32
}

/// Which conversion a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarSystem {
    Hijri,
    Chinese,
}

impl fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarSystem::Hijri => write!(f, "hijri"),
            CalendarSystem::Chinese => write!(f, "chinese"),
        }
    }
}

/// Where a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Remote,
    Approximation,
}

// ---------- HIJRI DATE ----------

/// A date in the Islamic calendar. Day and month are always in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HijriDate {
    pub day: u32,
    pub month: u32,
    pub month_name: String,
    pub year: i32,
    /// English weekday name, only present on remote results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(skip)]
    pub source: Source,
}

impl HijriDate {
    /// Builds a date from raw values, clamping day and month and taking the
    /// name from [`HIJRI_MONTHS`].
    pub fn approximate(day: i64, month: i64, year: i32) -> Self {
        let month = clamp_month(month);
        Self {
            day: clamp_day(day),
            month,
            month_name: HIJRI_MONTHS[(month - 1) as usize].to_string(),
            year,
            weekday: None,
            source: Source::Approximation,
        }
    }

}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month_name, self.year)
    }
}

// ---------- CHINESE LUNAR DATE ----------

/// A date in the Chinese lunisolar calendar. Day and month are always in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChineseLunarDate {
    pub day: u32,
    pub month: u32,
    pub month_name: String,
    pub year: i32,
    /// Zodiac animal of the lunar year, only present on remote results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zodiac: Option<String>,
    #[serde(skip)]
    pub source: Source,
}

impl ChineseLunarDate {
    pub fn approximate(day: i64, month: i64, year: i32) -> Self {
        let month = clamp_month(month);
        Self {
            day: clamp_day(day),
            month,
            month_name: CHINESE_MONTHS[(month - 1) as usize].to_string(),
            year,
            zodiac: None,
            source: Source::Approximation,
        }
    }
}

impl fmt::Display for ChineseLunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}, {}", self.month_name, self.day, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_clamps_out_of_range() {
        let hijri = HijriDate::approximate(45, 0, 1447);
        assert_eq!(hijri.day, 30);
        assert_eq!(hijri.month, 1);
        assert_eq!(hijri.month_name, "Muharram");

        let lunar = ChineseLunarDate::approximate(-3, 13, 2025);
        assert_eq!(lunar.day, 1);
        assert_eq!(lunar.month, 12);
        assert_eq!(lunar.month_name, "腊月");
    }

    #[test]
    fn test_display() {
        let hijri = HijriDate::approximate(7, 2, 1447);
        assert_eq!(hijri.to_string(), "7 Safar 1447");

        let lunar = ChineseLunarDate::approximate(1, 1, 2025);
        assert_eq!(lunar.to_string(), "正月1, 2025");
    }

    #[test]
    fn test_serializes_month_name_in_camel_case() {
        let hijri = HijriDate::approximate(14, 2, 1447);
        let json = serde_json::to_value(&hijri).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"day": 14, "month": 2, "monthName": "Safar", "year": 1447})
        );
    }

    #[test]
    fn test_remote_extras_serialize_when_present() {
        let mut lunar = ChineseLunarDate::approximate(1, 1, 2025);
        assert!(lunar.zodiac.is_none());
        lunar.zodiac = Some("Snake".to_string());
        let json = serde_json::to_value(&lunar).unwrap();
        assert_eq!(json["zodiac"], "Snake");

        let mut hijri = HijriDate::approximate(7, 2, 1447);
        hijri.weekday = Some("Al Juma'a".to_string());
        assert_eq!(serde_json::to_value(&hijri).unwrap()["weekday"], "Al Juma'a");
    }
}
