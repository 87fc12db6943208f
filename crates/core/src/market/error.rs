use thiserror::Error;

/// # Summary
/// 市场数据域错误枚举，处理网络、解析、提供方业务错误及限流。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息或非 2xx 状态码
    #[error("Network error: {0}")]
    Network(String),
    // 数据解析错误，如响应体不是合法 JSON
    #[error("Parse error: {0}")]
    Parse(String),
    // 提供方返回的业务错误 (如无效的代码组合)
    #[error("API error: {0}")]
    Api(String),
    // 提供方限流或额度提示
    #[error("API rate limit: {0}")]
    RateLimited(String),
    // 请求的数据未找到
    #[error("Data not found")]
    NotFound,
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}
