use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时的默认过滤级别
pub const DEFAULT_FILTER: &str = "info";

/// # Summary
/// 初始化全局日志：`RUST_LOG` 过滤 + 非阻塞 stdout 写入。
///
/// # Returns
/// 后台写线程的守卫，必须持有到进程退出，否则尾部日志会丢失。
pub fn init() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .init();

    guard
}
