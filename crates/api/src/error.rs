//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use coinlens_core::common::PairError;
use coinlens_core::market::error::MarketError;
use coinlens_core::series::error::SeriesError;

use crate::types::ApiErrorResponse;

/// 无有效数据时对外的固定提示
pub const NO_DATA_MESSAGE: &str = "no data available";

/// API 层统一错误枚举
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 请求参数错误 (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 资源未找到 (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 上游限流 (429)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// 上游不可达或响应无法解析 (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// 下层未知错误 (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 面向客户端的错误描述，内部错误不透传细节
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::TooManyRequests(msg)
            | ApiError::BadGateway(msg) => msg.clone(),
            ApiError::Internal(_) => "internal server error".to_string(),
        }
    }
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            other => tracing::warn!("Request failed: {}", other),
        }

        let body = Json(ApiErrorResponse::from_msg(self.public_message()));
        (self.status(), body).into_response()
    }
}

impl From<PairError> for ApiError {
    fn from(err: PairError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Api(msg) => ApiError::BadRequest(msg),
            MarketError::RateLimited(msg) => ApiError::TooManyRequests(msg),
            MarketError::Network(_) | MarketError::Parse(_) => {
                ApiError::BadGateway(err.to_string())
            }
            MarketError::NotFound => ApiError::NotFound(err.to_string()),
            MarketError::Unknown(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SeriesError> for ApiError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::EmptySeries { .. } => ApiError::NotFound(NO_DATA_MESSAGE.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
