use std::collections::BTreeMap;

use axum::Json;

use crate::types::{HealthResponse, IndexResponse};

/// 对外服务名
pub const SERVICE_NAME: &str = "coinlens";

/// 服务欢迎信息与端点列表
#[utoipa::path(
    get,
    path = "/",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "欢迎信息", body = IndexResponse)
    )
)]
pub async fn root() -> Json<IndexResponse> {
    let endpoints = [
        ("/health", "Service health check"),
        ("/home", "Report for the default currency pair"),
        ("/currency/{symbol}", "Report for any pair, ?market=USD"),
        ("/dashboard", "HTML dashboard, ?symbol=BTC&market=USD&refresh=false"),
        ("/swagger-ui", "Interactive API documentation"),
    ]
    .into_iter()
    .map(|(path, desc)| (path.to_string(), desc.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(IndexResponse {
        message: "Welcome to the coinlens digital currency API".to_string(),
        endpoints,
    })
}

/// 健康检查
#[utoipa::path(
    get,
    path = "/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务正常", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
