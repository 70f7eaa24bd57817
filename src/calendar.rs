//! Month and year views: a 6×7 grid of Gregorian days, each in-month day
//! annotated with its Hijri and Chinese lunar dates and any holiday.

use std::time::Instant;

use chrono::{Datelike, Duration, Month, NaiveDate, Weekday};
use serde::Serialize;
use tracing::info;

use crate::converter::CalendarConverter;
use crate::date_key::to_key;
use crate::holidays::{Holiday, HolidaySource};
use crate::types::{ChineseLunarDate, HijriDate};

pub const GRID_WEEKS: usize = 6;
pub const GRID_CELLS: usize = GRID_WEEKS * 7;

/// The 42 days shown for a month, starting on the Sunday on or before the
/// 1st. Empty when `month` is not 1 to 12.
pub fn month_grid(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    start.iter_days().take(GRID_CELLS).collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAnnotation {
    pub date: NaiveDate,
    pub key: String,
    pub in_month: bool,
    pub hijri: Option<HijriDate>,
    pub chinese: Option<ChineseLunarDate>,
    pub holiday: Option<Holiday>,
}

impl DayAnnotation {
    pub fn is_sunday(&self) -> bool {
        self.date.weekday() == Weekday::Sun
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub days: Vec<DayAnnotation>,
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayAnnotation]> {
        self.days.chunks(7)
    }

    pub fn in_month_days(&self) -> impl Iterator<Item = &DayAnnotation> {
        self.days.iter().filter(|day| day.in_month)
    }
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Builds the annotated grid for one month. In-month days are converted
/// through the converter's batch path, so at most `max_in_flight` dates are
/// looked up at once.
pub async fn annotate_month(
    converter: &CalendarConverter,
    holidays: Option<&dyn HolidaySource>,
    year: i32,
    month: u32,
) -> MonthView {
    let start = Instant::now();
    let grid = month_grid(year, month);
    let in_month: Vec<NaiveDate> = grid
        .iter()
        .copied()
        .filter(|date| date.month() == month && date.year() == year)
        .collect();

    let mut conversions = converter.convert_batch(&in_month).await.into_iter();
    let mut by_key = holidays.map(|source| source.holidays_for(year)).unwrap_or_default();

    let days = grid
        .into_iter()
        .map(|date| {
            let key = to_key(date);
            let in_month = date.month() == month && date.year() == year;
            let (hijri, chinese, holiday) = if in_month {
                let (hijri, chinese) = conversions
                    .next()
                    .map_or((None, None), |(h, c)| (Some(h), Some(c)));
                (hijri, chinese, by_key.remove(&key))
            } else {
                (None, None, None)
            };
            DayAnnotation {
                date,
                key,
                in_month,
                hijri,
                chinese,
                holiday,
            }
        })
        .collect();

    info!(
        target: "calendar",
        "Annotated {}-{:02} in {}µs",
        year,
        month,
        start.elapsed().as_micros()
    );

    MonthView {
        year,
        month,
        month_name: month_name(month),
        days,
    }
}

/// All twelve months of `year`, January first.
pub async fn annotate_year(
    converter: &CalendarConverter,
    holidays: Option<&dyn HolidaySource>,
    year: i32,
) -> Vec<MonthView> {
    let mut months = Vec::with_capacity(12);
    for month in 1..=12 {
        months.push(annotate_month(converter, holidays, year, month).await);
    }
    months
}
