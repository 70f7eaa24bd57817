use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use malaysia_calendar::config::RemoteConfig;
use malaysia_calendar::{
    CalendarConverter, ConversionService, HttpConversionClient, RemoteError, Source,
};

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn client_for(server: &MockServer) -> HttpConversionClient {
    let config = RemoteConfig {
        hijri_base_url: format!("{}/v1", server.uri()),
        chinese_base_url: server.uri(),
        chinese_api_key: Some("test-key".to_string()),
        chinese_api_host: Some("lunar.test".to_string()),
        ..RemoteConfig::default()
    };
    HttpConversionClient::new(&config)
}

fn aladhan_body() -> serde_json::Value {
    serde_json::json!({
        "code": 200,
        "status": "OK",
        "data": {
            "hijri": {
                "date": "07-02-1447",
                "day": "07",
                "weekday": { "en": "Al Juma'a" },
                "month": { "number": 2, "en": "Ṣafar", "ar": "صَفَر" },
                "year": "1447"
            }
        }
    })
}

#[tokio::test]
async fn test_fetch_hijri_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gToH/01-08-2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(aladhan_body()))
        .expect(1)
        .mount(&server)
        .await;

    let hijri = client_for(&server).fetch_hijri(ymd(2025, 8, 1)).await.unwrap();
    assert_eq!((hijri.day, hijri.month, hijri.year), (7, 2, 1447));
    assert_eq!(hijri.month_name, "Ṣafar");
    assert_eq!(hijri.weekday.as_deref(), Some("Al Juma'a"));
    assert_eq!(hijri.source, Source::Remote);
}

#[tokio::test]
async fn test_fetch_chinese_sends_rapidapi_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/date/2025/1/29"))
        .and(header("X-RapidAPI-Key", "test-key"))
        .and(header("X-RapidAPI-Host", "lunar.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "lunarDate": {
                    "day": 1, "month": 1, "monthName": "正月", "year": 2025, "zodiac": "Snake"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lunar = client_for(&server).fetch_chinese(ymd(2025, 1, 29)).await.unwrap();
    assert_eq!((lunar.day, lunar.month, lunar.year), (1, 1, 2025));
    assert_eq!(lunar.month_name, "正月");
    assert_eq!(lunar.zodiac.as_deref(), Some("Snake"));
}

#[tokio::test]
async fn test_server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_hijri(ymd(2025, 8, 1)).await.unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 500, .. }), "{}", err);
}

#[tokio::test]
async fn test_unexpected_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "code": 200, "data": {} })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_chinese(ymd(2025, 3, 1)).await.unwrap_err();
    assert!(err.is_malformed(), "{}", err);
}

#[tokio::test]
async fn test_converter_uses_remote_then_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gToH/01-08-2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(aladhan_body()))
        .expect(1)
        .mount(&server)
        .await;

    let converter = CalendarConverter::builder()
        .service(Arc::new(client_for(&server)))
        .timeout(Duration::from_secs(5))
        .build();

    let first = converter.hijri_for(ymd(2025, 8, 1)).await;
    let second = converter.hijri_for(ymd(2025, 8, 1)).await;
    assert_eq!(first, second);
    assert_eq!(first.source, Source::Remote);
    assert_eq!(first.month_name, "Ṣafar");
}

#[tokio::test]
async fn test_converter_falls_back_on_slow_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(aladhan_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let converter = CalendarConverter::builder()
        .service(Arc::new(client_for(&server)))
        .timeout(Duration::from_millis(100))
        .build();

    let hijri = converter.hijri_for(ymd(2025, 8, 8)).await;
    assert_eq!(hijri.source, Source::Approximation);
    assert_eq!((hijri.day, hijri.month, hijri.year), (14, 2, 1447));
    assert_eq!(hijri.month_name, "Safar");
    assert_eq!(converter.metrics().fallbacks(), 1);
}
