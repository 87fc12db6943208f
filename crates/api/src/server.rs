//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use coinlens_core::common::CurrencyPair;
use coinlens_core::market::port::DigitalCurrencyProvider;

use crate::routes::{currency, dashboard, system};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `provider` 在服务启动前由 DI 容器注入（通常为带缓存的 AlphaVantage 数据源），生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 行情数据源
    pub provider: Arc<dyn DigitalCurrencyProvider>,
    /// `/home` 与看板缺省展示的交易对
    pub default_pair: CurrencyPair,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "coinlens 数字货币行情 API",
        version = "0.1.0",
        description = "基于 AlphaVantage 日线数据的数字货币行情服务。提供价格指标、最近行情与 HTML 看板。",
        contact(name = "coinlens Team"),
        license(name = "MIT")
    ),
    tags(
        (name = "系统 (System)", description = "欢迎信息与健康检查"),
        (name = "行情 (Currency)", description = "数字货币日线指标与最近行情"),
        (name = "看板 (Dashboard)", description = "面向浏览器的 HTML 行情看板")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树（含 Swagger UI 与 CORS）。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
pub fn build_router(state: AppState) -> Router {
    // 1. 收集带 OpenAPI 注解的路由
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(system::root))
        .routes(routes!(system::health))
        .routes(routes!(currency::home))
        .routes(routes!(currency::get_currency))
        .routes(routes!(dashboard::dashboard))
        .with_state(state)
        .split_for_parts();

    // 2. 只读公开接口，允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 3. 合并 Swagger UI 路由并应用中间件
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 绑定端口并启动 HTTP 监听，直到 `shutdown` 完成后优雅退出。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8000"`
/// * `shutdown` - 关闭信号，如 `tokio::signal::ctrl_c()`
///
/// # Returns
/// 端口绑定失败或服务异常退出时返回错误。
pub async fn start_server<F>(
    state: AppState,
    bind_addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("coinlens API server listening on {}", local);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("coinlens API server stopped");
    Ok(())
}
