use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use coinlens_core::common::CurrencyPair;
use coinlens_core::config::AlphaVantageConfig;
use coinlens_core::market::error::MarketError;
use coinlens_core::market::port::DigitalCurrencyProvider;
use coinlens_feed::alphavantage::{AlphaVantageProvider, parse_daily_response};
use std::collections::HashMap;
use tokio::net::TcpListener;

const FIXTURE: &str = include_str!("fixtures/btc_usd_daily.json");

/// # Summary
/// 在随机端口启动一个模拟的 AlphaVantage 查询入口。
///
/// # Logic
/// 1. 仅当参数完整且 apikey 正确时返回夹具数据。
/// 2. symbol 为 `FAIL` 时返回 500，为 `BAD` 时返回业务错误信息。
async fn spawn_fake_upstream() -> anyhow::Result<String> {
    async fn query(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
        let get = |k: &str| params.get(k).map(String::as_str);
        if get("function") != Some("DIGITAL_CURRENCY_DAILY") || get("apikey") != Some("test-key") {
            return (StatusCode::BAD_REQUEST, "{}".to_string());
        }
        match (get("symbol"), get("market")) {
            (Some("FAIL"), _) => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            (Some("BAD"), _) => (
                StatusCode::OK,
                r#"{"Error Message": "Invalid API call."}"#.to_string(),
            ),
            (Some("BTC"), Some("USD")) => (StatusCode::OK, FIXTURE.to_string()),
            _ => (StatusCode::NOT_FOUND, String::new()),
        }
    }

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route("/query", get(query));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("fake upstream stopped: {}", e);
        }
    });
    Ok(format!("http://{}/query", addr))
}

fn provider_for(base_url: String) -> AlphaVantageProvider {
    AlphaVantageProvider::new(&AlphaVantageConfig {
        api_key: "test-key".to_string(),
        base_url,
        timeout_secs: 5,
    })
    .unwrap()
}

#[test]
fn test_parse_fixture() {
    let payload = parse_daily_response(FIXTURE).unwrap();
    assert_eq!(payload.metadata.digital_currency_code, "BTC");
    assert_eq!(payload.metadata.digital_currency_name, "Bitcoin");
    assert_eq!(payload.metadata.market_code, "USD");
    assert_eq!(payload.metadata.last_refreshed, "2024-01-15 00:00:00");

    let dates: Vec<&str> = payload.entries.iter().map(|(d, _)| d).collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-14", "2024-01-13"]);
}

#[test]
fn test_parse_provider_error_messages() {
    assert_eq!(
        parse_daily_response(r#"{"Error Message": "Invalid API call."}"#).unwrap_err(),
        MarketError::Api("Invalid API call.".to_string())
    );
    assert_eq!(
        parse_daily_response(r#"{"Note": "5 calls per minute"}"#).unwrap_err(),
        MarketError::RateLimited("5 calls per minute".to_string())
    );
    assert_eq!(
        parse_daily_response(r#"{"Information": "premium endpoint"}"#).unwrap_err(),
        MarketError::RateLimited("premium endpoint".to_string())
    );
    assert!(matches!(
        parse_daily_response("<html>oops</html>"),
        Err(MarketError::Parse(_))
    ));
}

#[test]
fn test_parse_missing_sections_yields_empty_payload() {
    let payload = parse_daily_response("{}").unwrap();
    assert!(payload.entries.is_empty());
    assert_eq!(payload.metadata.digital_currency_code, "");
}

#[tokio::test]
async fn test_fetch_daily_over_http() {
    let base_url = spawn_fake_upstream().await.unwrap();
    let provider = provider_for(base_url);

    let pair = CurrencyPair::parse("btc", "usd").unwrap();
    let payload = provider.fetch_daily(&pair).await.unwrap();
    assert_eq!(payload.entries.len(), 3);
    assert_eq!(payload.metadata.market_name, "United States Dollar");
    assert_eq!(provider.name(), "alphavantage");
}

#[tokio::test]
async fn test_fetch_daily_maps_http_and_api_errors() {
    let base_url = spawn_fake_upstream().await.unwrap();
    let provider = provider_for(base_url);

    let failing = CurrencyPair::parse("FAIL", "USD").unwrap();
    let err = provider.fetch_daily(&failing).await.unwrap_err();
    assert!(matches!(err, MarketError::Network(ref msg) if msg.contains("500")));

    let bad = CurrencyPair::parse("BAD", "USD").unwrap();
    let err = provider.fetch_daily(&bad).await.unwrap_err();
    assert_eq!(err, MarketError::Api("Invalid API call.".to_string()));
}

#[tokio::test]
async fn test_connection_error_does_not_leak_api_key() {
    // 绑定后立即释放端口，使连接被拒绝
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = provider_for(format!("http://{}/query", addr));
    let pair = CurrencyPair::parse("BTC", "USD").unwrap();
    let err = provider.fetch_daily(&pair).await.unwrap_err();
    assert!(matches!(err, MarketError::Network(_)));
    assert!(!err.to_string().contains("test-key"));
}
