use crate::metrics::calculator::derive;
use crate::metrics::entity::{MetricsBundle, RecentWindow};
use crate::series::entity::{Metadata, RawDailyPayload};
use crate::series::error::SeriesError;
use crate::series::normalizer::{NormalizeReport, normalize};

/// # Summary
/// 一次请求的完整处理结果，供 API 与看板共同消费。
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyReport {
    pub metadata: Metadata,
    pub metrics: MetricsBundle,
    pub recent_data: RecentWindow,
    // 归一化诊断，不进入对外契约
    pub diagnostics: NormalizeReport,
}

/// # Summary
/// 原始载荷 → 归一化 → 指标派生 的完整管线。
///
/// # Logic
/// 1. 调用 `normalize` 校验、去重并排序。
/// 2. 调用 `derive` 计算指标与最近窗口。
///
/// # Arguments
/// * `payload`: 上游抓取器返回的原始载荷。
///
/// # Returns
/// 成功返回 `CurrencyReport`；无有效数据时返回 `SeriesError::EmptySeries`。
pub fn build_report(payload: &RawDailyPayload) -> Result<CurrencyReport, SeriesError> {
    let normalized = normalize(&payload.metadata, &payload.entries)?;
    let (metrics, recent_data) = derive(&normalized.series);
    Ok(CurrencyReport {
        metadata: normalized.metadata,
        metrics,
        recent_data,
        diagnostics: normalized.report,
    })
}
