//! Gregorian dates annotated with their Hijri (Islamic) and Chinese lunar
//! equivalents, as shown on a Malaysian calendar.
//!
//! [`converter::CalendarConverter`] is the entry point. It consults a TTL
//! cache, then the remote conversion services, and falls back to offline
//! approximations so a lookup always yields a value.

pub mod approx;
pub mod cache;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod converter;
pub mod date_key;
pub mod error;
pub mod holidays;
pub mod metrics;
pub mod remote;
pub mod types;

pub use approx::{approximate_chinese, approximate_hijri, ApproximationEngine};
pub use cache::ConversionCache;
pub use calendar::{annotate_month, annotate_year, month_grid, DayAnnotation, MonthView};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CalendarConfig;
pub use converter::CalendarConverter;
pub use date_key::to_key;
pub use error::{ConfigError, RemoteError};
pub use holidays::{Holiday, HolidayKind, HolidaySource, HolidayTable};
pub use remote::{ConversionService, HttpConversionClient};
pub use types::{ChineseLunarDate, HijriDate, Source};
