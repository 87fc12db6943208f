use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use coinlens_api::server::{AppState, start_server};
use coinlens_cache::mem::MemCache;
use coinlens_feed::alphavantage::AlphaVantageProvider;
use coinlens_feed::cached::CachedProvider;
use tracing::{debug, error, info};

mod logging;
mod settings;

/// 配置文件路径（可选）
const CONFIG_FILE: &str = "coinlens.toml";

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 API 层。
///
/// # Logic
/// 1. 初始化全局日志并加载 `.env`。
/// 2. 分层加载配置，缺少 API Key 时拒绝启动。
/// 3. 实例化基础设施层（Cache、Feed）。
/// 4. 组装带缓存的数据源并启动 HTTP 服务。
/// 5. 收到 Ctrl-C 后优雅退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 1. 先加载 .env，使其中的 RUST_LOG 生效
    let dotenv = dotenvy::dotenv();
    let _log_guard = logging::init();
    if let Err(e) = dotenv {
        debug!(".env not loaded: {}", e);
    }
    info!("coinlens starting...");

    // 2. 加载配置
    let settings = match settings::load(Path::new(CONFIG_FILE), std::env::vars().collect()) {
        Ok(s) => s,
        Err(e) => {
            error!("Startup aborted: {}", e);
            return Err(e.into());
        }
    };
    let config = settings.config;
    info!(
        "Default pair {}, cache TTL {}s",
        settings.default_pair, config.cache.ttl_secs
    );

    // 3. 实例化基础设施层
    let cache = Arc::new(MemCache::new());
    let upstream = Arc::new(AlphaVantageProvider::new(&config.alphavantage)?);
    let ttl = Duration::from_secs(config.cache.ttl_secs);
    if !ttl.is_zero() {
        spawn_cache_janitor(cache.clone(), ttl);
    }

    // 4. 组装数据源并启动服务
    let provider = Arc::new(CachedProvider::new(upstream, cache, ttl));
    let state = AppState {
        provider,
        default_pair: settings.default_pair,
    };
    start_server(state, &config.server.bind_addr(), shutdown_signal()).await?;

    info!("coinlens stopped");
    Ok(())
}

/// 周期性清理过期缓存条目，读取路径本身已惰性过期
fn spawn_cache_janitor(cache: Arc<MemCache>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // 首次 tick 立即返回
        ticker.tick().await;
        loop {
            ticker.tick().await;
            // 清理数量由 purge_expired 自行记录
            cache.purge_expired();
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // 无法监听信号时保持运行
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Exiting...");
}
