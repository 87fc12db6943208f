//! # DTO (Data Transfer Object) 层
//!
//! 将核心领域模型转化为面向客户端 JSON 输出的结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use coinlens_core::metrics::entity::MetricsBundle;
use coinlens_core::report::CurrencyReport;
use coinlens_core::series::entity::{DailyBar, Metadata};

/// 对外日期格式
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================
//  行情相关 DTO
// ============================================================

/// 数字货币元数据 DTO（上游原样透传）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetadataResponse {
    #[schema(example = "Daily Prices and Volumes for Digital Currency")]
    pub information: String,
    #[schema(example = "BTC")]
    pub digital_currency_code: String,
    #[schema(example = "Bitcoin")]
    pub digital_currency_name: String,
    #[schema(example = "USD")]
    pub market_code: String,
    #[schema(example = "United States Dollar")]
    pub market_name: String,
    #[schema(example = "2024-01-15 00:00:00")]
    pub last_refreshed: String,
    #[schema(example = "UTC")]
    pub time_zone: String,
}

/// 派生指标 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    /// 最新收盘价
    #[schema(example = 42500.0)]
    pub latest_price: f64,
    /// 最新成交量
    #[schema(example = 1234.5678)]
    pub latest_volume: f64,
    /// 最新交易日 (YYYY-MM-DD)
    #[schema(example = "2024-01-15")]
    pub latest_date: String,
    /// 较前一交易日的收盘价变动
    #[schema(example = 700.0)]
    pub daily_change: f64,
    /// 较前一交易日的变动百分比
    #[schema(example = 1.67)]
    pub daily_change_percent: f64,
    /// 最近 7 个交易日收盘均价
    #[schema(example = 41766.67)]
    pub weekly_avg: f64,
    pub weekly_high: f64,
    pub weekly_low: f64,
    /// 最近 30 个交易日收盘均价
    #[schema(example = 41766.67)]
    pub monthly_avg: f64,
    pub monthly_high: f64,
    pub monthly_low: f64,
}

/// 单日 OHLCV DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeSeriesPoint {
    #[schema(example = "2024-01-15")]
    pub date: String,
    #[schema(example = 41800.0)]
    pub open: f64,
    #[schema(example = 42600.0)]
    pub high: f64,
    #[schema(example = 41500.0)]
    pub low: f64,
    #[schema(example = 42500.0)]
    pub close: f64,
    #[schema(example = 1234.5678)]
    pub volume: f64,
}

/// 行情查询的完整响应：元数据 + 指标 + 最近 10 日数据（最新在前）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyResponse {
    pub metadata: MetadataResponse,
    pub metrics: MetricsResponse,
    pub recent_data: Vec<TimeSeriesPoint>,
}

// ============================================================
//  系统相关 DTO
// ============================================================

/// 健康检查 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "coinlens")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// 根路径欢迎信息 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndexResponse {
    pub message: String,
    /// 路径 → 说明
    pub endpoints: BTreeMap<String, String>,
}

/// 构建失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

impl From<&Metadata> for MetadataResponse {
    fn from(m: &Metadata) -> Self {
        Self {
            information: m.information.clone(),
            digital_currency_code: m.digital_currency_code.clone(),
            digital_currency_name: m.digital_currency_name.clone(),
            market_code: m.market_code.clone(),
            market_name: m.market_name.clone(),
            last_refreshed: m.last_refreshed.clone(),
            time_zone: m.time_zone.clone(),
        }
    }
}

impl From<&MetricsBundle> for MetricsResponse {
    fn from(m: &MetricsBundle) -> Self {
        Self {
            latest_price: m.latest_price,
            latest_volume: m.latest_volume,
            latest_date: m.latest_date.format(DATE_FORMAT).to_string(),
            daily_change: m.daily_change,
            daily_change_percent: m.daily_change_percent,
            weekly_avg: m.weekly_avg,
            weekly_high: m.weekly_high,
            weekly_low: m.weekly_low,
            monthly_avg: m.monthly_avg,
            monthly_high: m.monthly_high,
            monthly_low: m.monthly_low,
        }
    }
}

impl From<&DailyBar> for TimeSeriesPoint {
    fn from(b: &DailyBar) -> Self {
        Self {
            date: b.date.format(DATE_FORMAT).to_string(),
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        }
    }
}

impl From<&CurrencyReport> for CurrencyResponse {
    fn from(r: &CurrencyReport) -> Self {
        Self {
            metadata: (&r.metadata).into(),
            metrics: (&r.metrics).into(),
            recent_data: r.recent_data.bars().iter().map(Into::into).collect(),
        }
    }
}
