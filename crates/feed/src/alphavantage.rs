use async_trait::async_trait;
use coinlens_core::common::CurrencyPair;
use coinlens_core::config::AlphaVantageConfig;
use coinlens_core::market::error::MarketError;
use coinlens_core::market::port::DigitalCurrencyProvider;
use coinlens_core::series::entity::{RawDailyPayload, RawEntries, RawMetadata};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// AlphaVantage 数字货币日线接口的 function 参数
pub const DAILY_FUNCTION: &str = "DIGITAL_CURRENCY_DAILY";

/// # Summary
/// AlphaVantage 数字货币行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - API Key 只出现在请求参数中，不进入日志与错误信息。
#[derive(Clone)]
pub struct AlphaVantageProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 查询入口，如 `https://www.alphavantage.co/query`
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    /// # Summary
    /// 根据配置创建一个新的 AlphaVantageProvider 实例。
    ///
    /// # Logic
    /// 1. 确保进程级 rustls 加密后端已安装。
    /// 2. 按配置设置请求超时与 User-Agent。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `config`: AlphaVantage 接入参数。
    ///
    /// # Returns
    /// 成功返回 provider，客户端构建失败返回 `MarketError::Network`。
    pub fn new(config: &AlphaVantageConfig) -> Result<Self, MarketError> {
        install_crypto_provider();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("coinlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

/// 重复安装会返回 Err，属于预期情况
fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// # Summary
/// AlphaVantage 响应顶层结构。
///
/// # Invariants
/// - 成功响应包含 `Meta Data` 与时间序列；
///   失败时以 `Error Message`、`Note` 或 `Information` 字段返回 200 状态码。
#[derive(Deserialize, Debug)]
struct AlphaVantageEnvelope {
    #[serde(rename = "Meta Data")]
    meta: Option<RawMetadata>,
    #[serde(rename = "Time Series (Digital Currency Daily)")]
    series: Option<RawEntries>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    // 免费额度限流提示
    #[serde(rename = "Note")]
    note: Option<String>,
    // 额度或付费接口提示
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// # Summary
/// 解析 `DIGITAL_CURRENCY_DAILY` 响应体。
///
/// # Logic
/// 1. 响应体必须是 JSON 对象，否则返回 `Parse`。
/// 2. 存在 `Error Message` 返回 `Api`；存在 `Note` / `Information` 返回 `RateLimited`。
/// 3. 缺失的元数据或时间序列视为空，由核心归一化判定为无数据。
///
/// # Arguments
/// * `body`: 原始响应文本。
///
/// # Returns
/// 成功返回 `RawDailyPayload`。
pub fn parse_daily_response(body: &str) -> Result<RawDailyPayload, MarketError> {
    let envelope: AlphaVantageEnvelope =
        serde_json::from_str(body).map_err(|e| MarketError::Parse(e.to_string()))?;

    if let Some(msg) = envelope.error_message {
        return Err(MarketError::Api(msg));
    }
    if let Some(msg) = envelope.note.or(envelope.information) {
        return Err(MarketError::RateLimited(msg));
    }

    let entries = envelope.series.unwrap_or_default();
    if entries.is_empty() {
        warn!("AlphaVantage response contains no time series");
    }

    Ok(RawDailyPayload {
        metadata: envelope.meta.unwrap_or_default(),
        entries,
    })
}

#[async_trait]
impl DigitalCurrencyProvider for AlphaVantageProvider {
    /// # Summary
    /// 从 AlphaVantage 抓取数字货币日线原始载荷。
    ///
    /// # Logic
    /// 1. 以查询参数形式拼装 function / symbol / market / apikey。
    /// 2. 非 2xx 状态码视为网络层错误。
    /// 3. 交由 `parse_daily_response` 识别业务错误并解析。
    async fn fetch_daily(&self, pair: &CurrencyPair) -> Result<RawDailyPayload, MarketError> {
        debug!("Fetching {} daily series from AlphaVantage", pair);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", DAILY_FUNCTION),
                ("symbol", pair.symbol()),
                ("market", pair.market()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            // 去掉 URL，避免 apikey 出现在错误信息中
            .map_err(|e| MarketError::Network(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MarketError::Network(e.without_url().to_string()))?;

        let payload = parse_daily_response(&body)?;
        debug!(
            "Fetched {} raw entries for {}",
            payload.entries.len(),
            pair
        );
        Ok(payload)
    }

    fn name(&self) -> &str {
        "alphavantage"
    }
}
