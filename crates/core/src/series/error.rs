use thiserror::Error;

/// # Summary
/// 时间序列域错误枚举，区分单条数据损坏、整体无数据与内部契约违例。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `InvalidEntry` 只在归一化内部产生并被就地消化，不会向调用方返回。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    // 单条记录的日期或数值无法解析
    #[error("Invalid entry {date:?}: {reason}")]
    InvalidEntry { date: String, reason: String },
    // 过滤后没有任何有效记录
    #[error("No valid entries in series ({dropped} dropped)")]
    EmptySeries { dropped: usize },
    // 组件之间的契约被破坏，属于编程错误
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
}
