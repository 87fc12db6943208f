//! # `coinlens-core` - 领域核心
//!
//! 日线时间序列的归一化与指标派生，以及各基础设施层需要实现的端口契约。
//! 核心逻辑为纯函数：不做 I/O，不持有共享可变状态。

pub mod common;
pub mod config;
pub mod report;

pub mod series {
    pub mod entity;
    pub mod error;
    pub mod normalizer;
}

pub mod metrics {
    pub mod calculator;
    pub mod entity;
}

pub mod market {
    pub mod error;
    #[cfg(any(test, feature = "test-utils"))]
    pub mod mock;
    pub mod port;
}

pub mod cache {
    pub mod error;
    pub mod port;
}
