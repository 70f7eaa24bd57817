//! Offline approximations of Hijri and Chinese lunar dates.
//!
//! Both approximations count whole days from a hand-verified anchor and map
//! the offset onto a fixed month structure. They never fail and never return
//! an out-of-range day or month, but they drift as the date moves away from
//! its anchor.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::types::{ChineseLunarDate, HijriDate};

/// Approximate Hijri month lengths, Muharram first.
pub const HIJRI_MONTH_LENGTHS: [i64; 12] = [30, 29, 30, 29, 30, 29, 30, 29, 30, 29, 30, 29];

/// Days in one pass through [`HIJRI_MONTH_LENGTHS`].
pub const HIJRI_TABLE_YEAR: i64 = 354;

/// Known first days of the Chinese lunar year.
const CHINESE_NEW_YEARS: [(i32, u32, u32); 11] = [
    (2020, 1, 25),
    (2021, 2, 12),
    (2022, 2, 1),
    (2023, 1, 22),
    (2024, 2, 10),
    (2025, 1, 29),
    (2026, 2, 17),
    (2027, 2, 6),
    (2028, 1, 26),
    (2029, 2, 13),
    (2030, 2, 3),
];

lazy_static! {
    static ref DEFAULT_NEW_YEARS: HashMap<i32, NaiveDate> = CHINESE_NEW_YEARS
        .iter()
        .filter_map(|&(year, month, day)| {
            NaiveDate::from_ymd_opt(year, month, day).map(|date| (year, date))
        })
        .collect();
}

// ---------- HIJRI ----------

/// A Gregorian date paired with its Hijri equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HijriAnchor {
    pub gregorian: NaiveDate,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl HijriAnchor {
    /// 1 August 2025 = 7 Safar 1447.
    pub fn reference() -> Self {
        Self {
            gregorian: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap_or_default(),
            day: 7,
            month: 2,
            year: 1447,
        }
    }

    /// Day index of the anchor inside its Hijri year, 0 for 1 Muharram.
    fn day_of_year(&self) -> i64 {
        let month = self.month.clamp(1, 12) as usize;
        let before: i64 = HIJRI_MONTH_LENGTHS[..month - 1].iter().sum();
        before + i64::from(self.day) - 1
    }
}

/// Anchor-based Hijri approximation with month carry and borrow.
#[derive(Debug, Clone)]
pub struct HijriApproximator {
    anchors: Vec<HijriAnchor>,
}

impl HijriApproximator {
    pub fn new(anchor: HijriAnchor) -> Self {
        Self {
            anchors: vec![anchor],
        }
    }

    /// Adds another anchor. The anchor closest to the requested date wins.
    pub fn with_anchor(mut self, anchor: HijriAnchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn anchors(&self) -> &[HijriAnchor] {
        &self.anchors
    }

    fn nearest_anchor(&self, date: NaiveDate) -> HijriAnchor {
        self.anchors
            .iter()
            .min_by_key(|anchor| (date - anchor.gregorian).num_days().abs())
            .copied()
            .unwrap_or_else(HijriAnchor::reference)
    }

    pub fn approximate(&self, date: NaiveDate) -> HijriDate {
        let anchor = self.nearest_anchor(date);
        let days_diff = (date - anchor.gregorian).num_days();

        // Carrying forward month by month and borrowing backward month by
        // month both reduce to a position inside the 354-day table year.
        let position = anchor.day_of_year() + days_diff;
        let year = anchor.year + position.div_euclid(HIJRI_TABLE_YEAR) as i32;
        let mut remaining = position.rem_euclid(HIJRI_TABLE_YEAR);

        let mut month = 1;
        for length in HIJRI_MONTH_LENGTHS {
            if remaining < length {
                break;
            }
            remaining -= length;
            month += 1;
        }

        HijriDate::approximate(remaining + 1, month, year)
    }
}

impl Default for HijriApproximator {
    fn default() -> Self {
        Self::new(HijriAnchor::reference())
    }
}

// ---------- CHINESE ----------

/// Chinese lunar approximation anchored on each year's New Year.
///
/// The anchor is the New Year of the date's own Gregorian year, taken from a
/// table of known dates; years outside the table use 1 February.
#[derive(Debug, Clone)]
pub struct ChineseApproximator {
    new_years: BTreeMap<i32, NaiveDate>,
}

impl ChineseApproximator {
    /// An approximator with no known New Year dates.
    pub fn empty() -> Self {
        Self {
            new_years: BTreeMap::new(),
        }
    }

    pub fn with_new_year(mut self, new_year: NaiveDate) -> Self {
        self.new_years.insert(new_year.year(), new_year);
        self
    }

    /// The New Year anchor used for dates in `year`.
    pub fn anchor_for(&self, year: i32) -> NaiveDate {
        self.new_years
            .get(&year)
            .copied()
            .or_else(|| NaiveDate::from_ymd_opt(year, 2, 1))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn approximate(&self, date: NaiveDate) -> ChineseLunarDate {
        let anchor = self.anchor_for(date.year());
        let anchor_year = anchor.year();
        let days_diff = (date - anchor).num_days();

        if days_diff < 0 {
            // Still inside the previous lunar year.
            let days = (365 + days_diff).max(0);
            ChineseLunarDate::approximate(days % 30 + 1, days / 30 + 1, anchor_year - 1)
        } else {
            // floor(days / 29.5) without going through floats.
            let month = (days_diff * 2) / 59 + 1;
            ChineseLunarDate::approximate(days_diff % 30 + 1, month, anchor_year)
        }
    }
}

impl Default for ChineseApproximator {
    fn default() -> Self {
        Self {
            new_years: DEFAULT_NEW_YEARS
                .iter()
                .map(|(&year, &date)| (year, date))
                .collect(),
        }
    }
}

// ---------- ENGINE ----------

/// Both approximations behind one handle.
#[derive(Debug, Clone, Default)]
pub struct ApproximationEngine {
    pub hijri: HijriApproximator,
    pub chinese: ChineseApproximator,
}

impl ApproximationEngine {
    pub fn new(hijri: HijriApproximator, chinese: ChineseApproximator) -> Self {
        Self { hijri, chinese }
    }

    pub fn hijri(&self, date: NaiveDate) -> HijriDate {
        self.hijri.approximate(date)
    }

    pub fn chinese(&self, date: NaiveDate) -> ChineseLunarDate {
        self.chinese.approximate(date)
    }
}

/// Hijri approximation from the default anchor.
pub fn approximate_hijri(date: NaiveDate) -> HijriDate {
    HijriApproximator::default().approximate(date)
}

/// Chinese lunar approximation from the default New Year table.
pub fn approximate_chinese(date: NaiveDate) -> ChineseLunarDate {
    ChineseApproximator::default().approximate(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_hijri_anchor_day() {
        let hijri = approximate_hijri(ymd(2025, 8, 1));
        assert_eq!((hijri.day, hijri.month, hijri.year), (7, 2, 1447));
        assert_eq!(hijri.month_name, "Safar");
    }

    #[test]
    fn test_hijri_week_after_anchor() {
        let hijri = approximate_hijri(ymd(2025, 8, 8));
        assert_eq!((hijri.day, hijri.month, hijri.year), (14, 2, 1447));
        assert_eq!(hijri.month_name, "Safar");
    }

    #[test]
    fn test_hijri_rolls_into_next_month() {
        // Safar has 29 days in the table: 7 Safar + 23 days = 1 Rabi al-Awwal.
        let hijri = approximate_hijri(ymd(2025, 8, 24));
        assert_eq!((hijri.day, hijri.month, hijri.year), (1, 3, 1447));
        assert_eq!(hijri.month_name, "Rabi al-Awwal");
    }

    #[test]
    fn test_hijri_borrows_into_previous_year() {
        // 7 Safar - 37 days = 29 Dhu al-Hijjah of the previous year.
        let hijri = approximate_hijri(ymd(2025, 6, 25));
        assert_eq!((hijri.day, hijri.month, hijri.year), (29, 12, 1446));
        assert_eq!(hijri.month_name, "Dhu al-Hijjah");
    }

    #[test]
    fn test_hijri_matches_stepwise_carry() {
        // Walk one day at a time from the anchor and compare with the closed form.
        let approximator = HijriApproximator::default();
        let anchor = HijriAnchor::reference();
        let (mut day, mut month, mut year) =
            (anchor.day as i64, anchor.month as usize, anchor.year);
        for offset in 1..800 {
            day += 1;
            if day > HIJRI_MONTH_LENGTHS[month - 1] {
                day = 1;
                month += 1;
                if month > 12 {
                    month = 1;
                    year += 1;
                }
            }
            let hijri = approximator.approximate(anchor.gregorian + Duration::days(offset));
            assert_eq!((hijri.day as i64, hijri.month as usize, hijri.year), (day, month, year));
        }
    }

    #[test]
    fn test_hijri_nearest_anchor_wins() {
        let approximator = HijriApproximator::default().with_anchor(HijriAnchor {
            gregorian: ymd(2030, 1, 1),
            day: 1,
            month: 9,
            year: 1451,
        });
        let hijri = approximator.approximate(ymd(2030, 1, 3));
        assert_eq!((hijri.day, hijri.month, hijri.year), (3, 9, 1451));
        assert_eq!(hijri.month_name, "Ramadan");

        let near_default = approximator.approximate(ymd(2025, 8, 8));
        assert_eq!((near_default.day, near_default.month), (14, 2));
    }

    #[test]
    fn test_chinese_new_year_is_first_day() {
        let lunar = approximate_chinese(ymd(2025, 1, 29));
        assert_eq!((lunar.day, lunar.month, lunar.year), (1, 1, 2025));
        assert_eq!(lunar.month_name, "正月");
    }

    #[test]
    fn test_chinese_day_before_new_year_is_previous_year() {
        let lunar = approximate_chinese(ymd(2025, 1, 28));
        assert_eq!(lunar.year, 2024);
        // 364 days into the previous year overflows to month 13 and clamps.
        assert_eq!(lunar.month, 12);
        assert_eq!(lunar.day, 5);
        assert_eq!(lunar.month_name, "腊月");
    }

    #[test]
    fn test_chinese_month_uses_half_day_length() {
        // 59 days after New Year is exactly two 29.5-day months.
        let lunar = approximate_chinese(ymd(2025, 1, 29) + Duration::days(59));
        assert_eq!(lunar.month, 3);
        assert_eq!(lunar.day, 59 % 30 + 1);

        let lunar = approximate_chinese(ymd(2025, 1, 29) + Duration::days(58));
        assert_eq!(lunar.month, 2);
    }

    #[test]
    fn test_chinese_uses_each_years_anchor() {
        let lunar = approximate_chinese(ymd(2026, 2, 17));
        assert_eq!((lunar.day, lunar.month, lunar.year), (1, 1, 2026));

        let lunar = approximate_chinese(ymd(2026, 2, 16));
        assert_eq!(lunar.year, 2025);
    }

    #[test]
    fn test_chinese_unknown_year_defaults_to_february_first() {
        let approximator = ChineseApproximator::empty();
        assert_eq!(approximator.anchor_for(2040), ymd(2040, 2, 1));

        let lunar = approximator.approximate(ymd(2040, 2, 1));
        assert_eq!((lunar.day, lunar.month, lunar.year), (1, 1, 2040));

        let custom = ChineseApproximator::empty().with_new_year(ymd(2040, 2, 12));
        assert_eq!(custom.anchor_for(2040), ymd(2040, 2, 12));
    }

    #[test]
    fn test_always_in_range() {
        let engine = ApproximationEngine::default();
        let dates = [
            ymd(1, 1, 1),
            ymd(622, 7, 16),
            ymd(1900, 1, 31),
            ymd(2024, 12, 31),
            ymd(2100, 6, 15),
            ymd(9999, 12, 31),
        ];
        for date in dates {
            let hijri = engine.hijri(date);
            assert!((1..=30).contains(&hijri.day), "{} -> {:?}", date, hijri);
            assert!((1..=12).contains(&hijri.month), "{} -> {:?}", date, hijri);

            let lunar = engine.chinese(date);
            assert!((1..=30).contains(&lunar.day), "{} -> {:?}", date, lunar);
            assert!((1..=12).contains(&lunar.month), "{} -> {:?}", date, lunar);
        }

        let start = ymd(2023, 1, 1);
        for offset in 0..(366 * 4) {
            let date = start + Duration::days(offset);
            let lunar = engine.chinese(date);
            assert!((1..=30).contains(&lunar.day));
            assert!((1..=12).contains(&lunar.month));
        }
    }
}
