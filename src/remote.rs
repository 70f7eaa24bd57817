//! Remote Hijri and Chinese lunar conversion services.
//!
//! The client issues exactly one request per call and does not time out on
//! its own; the converter races each call against its own deadline.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::types::{ChineseLunarDate, HijriDate, Source};

/// A service that knows the authoritative conversion for a date.
#[async_trait::async_trait]
pub trait ConversionService: Send + Sync {
    async fn fetch_hijri(&self, date: NaiveDate) -> Result<HijriDate, RemoteError>;

    async fn fetch_chinese(&self, date: NaiveDate) -> Result<ChineseLunarDate, RemoteError>;

    /// Name used in log lines.
    fn name(&self) -> &str {
        "ConversionService"
    }
}

// ---------- WIRE SHAPES ----------

#[derive(Deserialize)]
struct HijriEnvelope {
    data: Option<HijriData>,
}

#[derive(Deserialize)]
struct HijriData {
    hijri: Option<HijriPayload>,
}

#[derive(Deserialize)]
struct HijriPayload {
    day: Option<Value>,
    month: Option<HijriMonth>,
    year: Option<Value>,
    weekday: Option<HijriWeekday>,
}

#[derive(Deserialize)]
struct HijriWeekday {
    en: Option<String>,
}

#[derive(Deserialize)]
struct HijriMonth {
    number: Option<Value>,
    en: Option<String>,
}

#[derive(Deserialize)]
struct LunarEnvelope {
    data: Option<LunarData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LunarData {
    lunar_date: Option<LunarPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LunarPayload {
    day: Option<Value>,
    month: Option<Value>,
    month_name: Option<String>,
    year: Option<Value>,
    zodiac: Option<String>,
}

/// Reads an integer that the service may send as a number or a numeric string.
fn integer_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required(url: &str, field: &str, value: Option<&Value>) -> Result<i64, RemoteError> {
    integer_field(value)
        .ok_or_else(|| RemoteError::malformed(url, format!("missing or non-numeric `{}`", field)))
}

fn check_range(url: &str, day: i64, month: i64) -> Result<(u32, u32), RemoteError> {
    if !(1..=30).contains(&day) {
        return Err(RemoteError::malformed(url, format!("day {} out of range", day)));
    }
    if !(1..=12).contains(&month) {
        return Err(RemoteError::malformed(url, format!("month {} out of range", month)));
    }
    Ok((day as u32, month as u32))
}

fn check_year(url: &str, year: i64) -> Result<i32, RemoteError> {
    i32::try_from(year)
        .map_err(|_| RemoteError::malformed(url, format!("year {} out of range", year)))
}

/// Extracts a Hijri date from a `gToH` response body.
pub fn parse_hijri_response(url: &str, body: &str) -> Result<HijriDate, RemoteError> {
    let envelope: HijriEnvelope =
        serde_json::from_str(body).map_err(|e| RemoteError::malformed(url, e.to_string()))?;
    let hijri = envelope
        .data
        .and_then(|data| data.hijri)
        .ok_or_else(|| RemoteError::malformed(url, "missing `data.hijri`"))?;
    let month = hijri
        .month
        .ok_or_else(|| RemoteError::malformed(url, "missing `data.hijri.month`"))?;

    let day = required(url, "data.hijri.day", hijri.day.as_ref())?;
    let month_number = required(url, "data.hijri.month.number", month.number.as_ref())?;
    let year = required(url, "data.hijri.year", hijri.year.as_ref())?;
    let month_name = month
        .en
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| RemoteError::malformed(url, "missing `data.hijri.month.en`"))?;

    let (day, month_number) = check_range(url, day, month_number)?;
    Ok(HijriDate {
        day,
        month: month_number,
        month_name,
        year: check_year(url, year)?,
        weekday: hijri.weekday.and_then(|weekday| weekday.en),
        source: Source::Remote,
    })
}

/// Extracts a Chinese lunar date from a lunar-calendar response body.
pub fn parse_chinese_response(url: &str, body: &str) -> Result<ChineseLunarDate, RemoteError> {
    let envelope: LunarEnvelope =
        serde_json::from_str(body).map_err(|e| RemoteError::malformed(url, e.to_string()))?;
    let lunar = envelope
        .data
        .and_then(|data| data.lunar_date)
        .ok_or_else(|| RemoteError::malformed(url, "missing `data.lunarDate`"))?;

    let day = required(url, "data.lunarDate.day", lunar.day.as_ref())?;
    let month = required(url, "data.lunarDate.month", lunar.month.as_ref())?;
    let year = required(url, "data.lunarDate.year", lunar.year.as_ref())?;
    let month_name = lunar
        .month_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| RemoteError::malformed(url, "missing `data.lunarDate.monthName`"))?;

    let (day, month) = check_range(url, day, month)?;
    Ok(ChineseLunarDate {
        day,
        month,
        month_name,
        year: check_year(url, year)?,
        zodiac: lunar.zodiac.filter(|zodiac| !zodiac.trim().is_empty()),
        source: Source::Remote,
    })
}

// ---------- HTTP CLIENT ----------

/// `reqwest`-backed client for the Aladhan `gToH` endpoint and the
/// RapidAPI Chinese lunar calendar.
pub struct HttpConversionClient {
    client: reqwest::Client,
    hijri_base_url: String,
    chinese_base_url: String,
    chinese_api_key: Option<String>,
    chinese_api_host: Option<String>,
}

impl HttpConversionClient {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::builder().build().unwrap_or_default(),
            hijri_base_url: config.hijri_base_url.trim_end_matches('/').to_string(),
            chinese_base_url: config.chinese_base_url.trim_end_matches('/').to_string(),
            chinese_api_key: config.chinese_api_key.clone(),
            chinese_api_host: config.chinese_api_host.clone(),
        }
    }

    pub fn hijri_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/gToH/{:02}-{:02}-{:04}",
            self.hijri_base_url,
            date.day(),
            date.month(),
            date.year()
        )
    }

    pub fn chinese_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/api/v1/date/{}/{}/{}",
            self.chinese_base_url,
            date.year(),
            date.month(),
            date.day()
        )
    }

    async fn fetch_body(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<String, RemoteError> {
        let response = request.send().await.map_err(|source| RemoteError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| RemoteError::Network {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl ConversionService for HttpConversionClient {
    async fn fetch_hijri(&self, date: NaiveDate) -> Result<HijriDate, RemoteError> {
        let url = self.hijri_url(date);
        debug!(target: "remote", "GET {}", url);
        let body = self.fetch_body(self.client.get(&url), &url).await?;
        parse_hijri_response(&url, &body)
    }

    async fn fetch_chinese(&self, date: NaiveDate) -> Result<ChineseLunarDate, RemoteError> {
        let url = self.chinese_url(date);
        debug!(target: "remote", "GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.chinese_api_key {
            request = request.header("X-RapidAPI-Key", key);
        }
        if let Some(host) = &self.chinese_api_host {
            request = request.header("X-RapidAPI-Host", host);
        }

        let body = self.fetch_body(request, &url).await?;
        parse_chinese_response(&url, &body)
    }

    fn name(&self) -> &str {
        "HttpConversionClient"
    }
}
