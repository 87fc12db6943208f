//! # 路由控制器
//!
//! - `system`: 欢迎页与健康检查
//! - `currency`: JSON 行情报告
//! - `dashboard`: HTML 看板

pub mod currency;
pub mod dashboard;
pub mod system;
