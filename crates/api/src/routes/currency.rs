//! # 行情报告路由
//!
//! 抓取原始载荷并交由核心管线生成报告，JSON 形式返回。

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use utoipa::IntoParams;

use coinlens_core::common::CurrencyPair;
use coinlens_core::report::{CurrencyReport, build_report};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CurrencyResponse};

/// 未指定 market 时使用的默认计价货币
pub const DEFAULT_MARKET: &str = "USD";

#[derive(Debug, Deserialize, IntoParams)]
pub struct MarketQuery {
    /// 计价货币代码，默认 USD
    pub market: Option<String>,
}

/// # Summary
/// API 与看板共用的报告加载流程。
///
/// # Logic
/// 1. `refresh` 为真时先让数据源失效缓存。
/// 2. 抓取原始载荷。
/// 3. 归一化并派生指标。
///
/// # Returns
/// 成功返回 `CurrencyReport`，失败统一映射为 `ApiError`。
pub async fn load_report(
    state: &AppState,
    pair: &CurrencyPair,
    refresh: bool,
) -> Result<CurrencyReport, ApiError> {
    if refresh {
        tracing::info!("Refreshing cached data for {}", pair);
        state.provider.invalidate(pair).await?;
    }

    let payload = state.provider.fetch_daily(pair).await?;
    let report = build_report(&payload)?;
    tracing::debug!(
        "Built report for {}: {} accepted, {} dropped",
        pair,
        report.diagnostics.accepted,
        report.diagnostics.dropped()
    );
    Ok(report)
}

/// 默认交易对的行情报告
#[utoipa::path(
    get,
    path = "/home",
    tag = "行情 (Currency)",
    responses(
        (status = 200, description = "默认交易对报告", body = CurrencyResponse),
        (status = 404, description = "无可用数据", body = ApiErrorResponse),
        (status = 429, description = "上游限流", body = ApiErrorResponse),
        (status = 502, description = "上游不可达", body = ApiErrorResponse)
    )
)]
pub async fn home(State(state): State<AppState>) -> Result<Json<CurrencyResponse>, ApiError> {
    let report = load_report(&state, &state.default_pair, false).await?;
    Ok(Json(CurrencyResponse::from(&report)))
}

/// 任意交易对的行情报告
#[utoipa::path(
    get,
    path = "/currency/{symbol}",
    tag = "行情 (Currency)",
    params(
        ("symbol" = String, Path, description = "数字货币代码，如 BTC"),
        MarketQuery
    ),
    responses(
        (status = 200, description = "交易对报告", body = CurrencyResponse),
        (status = 400, description = "交易对非法或上游拒绝", body = ApiErrorResponse),
        (status = 404, description = "无可用数据", body = ApiErrorResponse),
        (status = 429, description = "上游限流", body = ApiErrorResponse),
        (status = 502, description = "上游不可达", body = ApiErrorResponse)
    )
)]
pub async fn get_currency(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<CurrencyResponse>, ApiError> {
    let market = query.market.as_deref().unwrap_or(DEFAULT_MARKET);
    let pair = CurrencyPair::parse(&symbol, market)?;
    let report = load_report(&state, &pair, false).await?;
    Ok(Json(CurrencyResponse::from(&report)))
}
