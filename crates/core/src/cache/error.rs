use thiserror::Error;

/// # Summary
/// 缓存域错误枚举。
///
/// # Invariants
/// - 缓存故障对调用方而言可降级：读取失败等同于未命中。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    // 写入前的序列化失败
    #[error("Serialize error: {0}")]
    Serialize(String),
    // 读出后的反序列化失败（通常意味着条目结构已过时）
    #[error("Deserialize error: {0}")]
    Deserialize(String),
    // 底层存储引擎故障
    #[error("Storage error: {0}")]
    Storage(String),
}
