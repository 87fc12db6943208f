use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use utoipa::IntoParams;

use coinlens_core::common::CurrencyPair;

use crate::dashboard::{render_dashboard, render_error};
use crate::error::ApiError;
use crate::routes::currency::load_report;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// 数字货币代码，缺省使用服务默认值
    pub symbol: Option<String>,
    /// 计价货币代码，缺省使用服务默认值
    pub market: Option<String>,
    /// 为 true 时先清除缓存再抓取
    #[serde(default)]
    pub refresh: bool,
}

/// HTML 行情看板
///
/// 失败时仍返回 200，页面内展示错误面板。
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "看板 (Dashboard)",
    params(DashboardQuery),
    responses(
        (status = 200, description = "HTML 看板页面", content_type = "text/html", body = String)
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let symbol = query
        .symbol
        .as_deref()
        .unwrap_or(state.default_pair.symbol());
    let market = query
        .market
        .as_deref()
        .unwrap_or(state.default_pair.market());

    let result = match CurrencyPair::parse(symbol, market) {
        Ok(pair) => load_report(&state, &pair, query.refresh)
            .await
            .map(|report| (pair, report)),
        Err(e) => Err(ApiError::from(e)),
    };

    match result {
        Ok((pair, report)) => Html(render_dashboard(&pair, &report)),
        Err(e) => {
            tracing::warn!("Dashboard failed for {}/{}: {}", symbol, market, e);
            Html(render_error(symbol, market, &e.public_message()))
        }
    }
}
