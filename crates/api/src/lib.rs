//! # `coinlens-api` - HTTP API 网关
//!
//! 本 crate 是 coinlens 数字货币行情服务的 HTTP 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自浏览器或脚本的 HTTP 请求
//! - 调用下层 `DigitalCurrencyProvider` 抓取原始载荷，并交由核心管线生成报告
//! - 将领域模型转换为 DTO (JSON) 或渲染为 HTML 看板

pub mod dashboard;
pub mod error;
pub mod routes;
pub mod server;
pub mod types;
