use crate::common::CurrencyPair;
use crate::market::error::MarketError;
use crate::series::entity::RawDailyPayload;
use async_trait::async_trait;

/// # Summary
/// 数字货币日线数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 实现者负责传输层问题（超时、HTTP 状态码、JSON 格式、限流），
///   返回的载荷只可能存在数据层面的损坏。
/// - 返回的载荷未经任何归一化，字段保持提供方原样。
#[async_trait]
pub trait DigitalCurrencyProvider: Send + Sync {
    /// # Summary
    /// 获取指定交易对的日线原始载荷。
    ///
    /// # Logic
    /// 1. 构建数据源请求。
    /// 2. 执行网络请求并识别提供方的业务错误信息。
    /// 3. 解析为 `RawDailyPayload`。
    ///
    /// # Arguments
    /// * `pair`: 已规范化的交易对。
    ///
    /// # Returns
    /// 成功返回原始载荷，失败返回 `MarketError`。
    async fn fetch_daily(&self, pair: &CurrencyPair) -> Result<RawDailyPayload, MarketError>;

    /// # Summary
    /// 丢弃该交易对的任何本地缓存，使下一次调用直达上游。
    ///
    /// # Logic
    /// 1. 无缓存的实现无需任何操作。
    async fn invalidate(&self, _pair: &CurrencyPair) -> Result<(), MarketError> {
        Ok(())
    }

    /// 数据源名称，用于日志与健康检查
    fn name(&self) -> &str;
}
