use coinlens_api::server::{AppState, build_router};
use coinlens_api::types::{ApiErrorResponse, CurrencyResponse, HealthResponse, IndexResponse};
use coinlens_core::common::CurrencyPair;
use coinlens_core::market::error::MarketError;
use coinlens_core::market::mock::StaticProvider;
use coinlens_core::series::entity::RawDailyPayload;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

const FIXTURE: &str = include_str!("fixtures/btc_usd_daily.json");

fn fixture_payload() -> anyhow::Result<RawDailyPayload> {
    let v: Value = serde_json::from_str(FIXTURE)?;
    Ok(RawDailyPayload {
        metadata: serde_json::from_value(v["Meta Data"].clone())?,
        entries: serde_json::from_value(v["Time Series (Digital Currency Daily)"].clone())?,
    })
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server(provider: Arc<StaticProvider>) -> anyhow::Result<String> {
    // 同一进程内只有首个测试能安装成功
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init()
        .ok();
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok();

    let state = AppState {
        provider,
        default_pair: CurrencyPair::parse("BTC", "USD")?,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = build_router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn test_system_endpoints() {
    let provider = Arc::new(StaticProvider::new(fixture_payload().unwrap()));
    let base_url = spawn_test_server(provider).await.unwrap();
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let health: HealthResponse = res.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "coinlens");
    assert!(!health.version.is_empty());

    let res = client.get(format!("{}/", base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let index: IndexResponse = res.json().await.unwrap();
    assert!(index.endpoints.contains_key("/dashboard"));
    assert!(index.endpoints.contains_key("/currency/{symbol}"));

    let res = client
        .get(format!("{}/api-docs/openapi.json", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await.unwrap();
    assert!(doc["paths"]["/currency/{symbol}"].is_object());
    assert!(doc["paths"]["/dashboard"].is_object());
}

#[tokio::test]
async fn test_home_returns_default_pair_report() {
    let provider = Arc::new(StaticProvider::new(fixture_payload().unwrap()));
    let base_url = spawn_test_server(provider.clone()).await.unwrap();

    let res = reqwest::get(format!("{}/home", base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: CurrencyResponse = res.json().await.unwrap();

    assert_eq!(body.metadata.digital_currency_code, "BTC");
    assert_eq!(body.metadata.market_name, "United States Dollar");
    assert_eq!(body.metrics.latest_price, 42500.0);
    assert_eq!(body.metrics.latest_date, "2024-01-15");
    assert_eq!(body.metrics.daily_change, 700.0);
    assert_eq!(body.metrics.daily_change_percent, 1.67);
    assert_eq!(body.metrics.weekly_avg, 41766.67);
    assert_eq!(body.metrics.weekly_high, 42500.0);
    assert_eq!(body.metrics.weekly_low, 41000.0);

    let dates: Vec<&str> = body.recent_data.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-14", "2024-01-13"]);
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test]
async fn test_currency_route_validates_pair() {
    let provider = Arc::new(StaticProvider::new(fixture_payload().unwrap()));
    let base_url = spawn_test_server(provider.clone()).await.unwrap();

    let res = reqwest::get(format!("{}/currency/btc?market=usd", base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // 缺省 market 为 USD
    let res = reqwest::get(format!("{}/currency/eth", base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::get(format!("{}/currency/WAYTOOLONGSYMBOL", base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: ApiErrorResponse = res.json().await.unwrap();
    assert!(!err.success);
    assert!(err.error.contains("symbol"));

    // 非法交易对不触达上游
    assert_eq!(provider.fetch_count(), 2);
}

#[tokio::test]
async fn test_upstream_errors_map_to_status_codes() {
    let cases = [
        (MarketError::Api("Invalid API call.".into()), StatusCode::BAD_REQUEST),
        (MarketError::RateLimited("5 calls per minute".into()), StatusCode::TOO_MANY_REQUESTS),
        (MarketError::Network("HTTP 503".into()), StatusCode::BAD_GATEWAY),
        (MarketError::Parse("expected value".into()), StatusCode::BAD_GATEWAY),
        (MarketError::NotFound, StatusCode::NOT_FOUND),
    ];

    for (err, status) in cases {
        let provider = Arc::new(StaticProvider::failing(err.clone()));
        let base_url = spawn_test_server(provider).await.unwrap();

        let res = reqwest::get(format!("{}/currency/BTC", base_url)).await.unwrap();
        assert_eq!(res.status(), status, "unexpected status for {:?}", err);
        let body: ApiErrorResponse = res.json().await.unwrap();
        assert!(!body.success);
        assert!(!body.error.is_empty());
    }
}

#[tokio::test]
async fn test_empty_series_is_not_found() {
    let provider = Arc::new(StaticProvider::new(RawDailyPayload::default()));
    let base_url = spawn_test_server(provider).await.unwrap();

    let res = reqwest::get(format!("{}/home", base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: ApiErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "no data available");
}

#[tokio::test]
async fn test_dashboard_renders_report() {
    let provider = Arc::new(StaticProvider::new(fixture_payload().unwrap()));
    let base_url = spawn_test_server(provider.clone()).await.unwrap();

    let res = reqwest::get(format!("{}/dashboard", base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let html = res.text().await.unwrap();
    assert!(html.contains("Bitcoin"));
    assert!(html.contains("United States Dollar"));
    assert!(html.contains("<svg"));
    assert!(html.contains("+700.00 (+1.67%)"));
    assert!(html.contains("41766.67"));
    assert_eq!(provider.invalidate_count(), 0);

    let res = reqwest::get(format!(
        "{}/dashboard?symbol=eth&market=eur&refresh=true",
        base_url
    ))
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.contains("<option selected>ETH</option>"));
    assert!(html.contains("<option selected>EUR</option>"));
    assert_eq!(provider.invalidate_count(), 1);
}

#[tokio::test]
async fn test_dashboard_shows_error_panel() {
    let provider = Arc::new(StaticProvider::failing(MarketError::RateLimited(
        "5 calls per minute".into(),
    )));
    let base_url = spawn_test_server(provider).await.unwrap();

    let res = reqwest::get(format!("{}/dashboard?symbol=BTC", base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("5 calls per minute"));
    assert!(!html.contains("<svg"));
}
