use crate::series::entity::DailyBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 从归一化序列派生的只读指标快照。
///
/// # Invariants
/// - 所有字段始终有值：单日序列的日变动为 0，而不是缺失。
/// - 派生值（变动、均值、高低点）已在输出时统一保留两位小数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    // 最新收盘价
    pub latest_price: f64,
    // 最新成交量
    pub latest_volume: f64,
    // 最新交易日
    pub latest_date: NaiveDate,
    // 较前一交易日的收盘价变动
    pub daily_change: f64,
    // 较前一交易日的收盘价变动百分比
    pub daily_change_percent: f64,
    pub weekly_avg: f64,
    pub weekly_high: f64,
    pub weekly_low: f64,
    pub monthly_avg: f64,
    pub monthly_high: f64,
    pub monthly_low: f64,
}

/// # Summary
/// 仅用于展示的最近若干日记录，保持日期降序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentWindow(Vec<DailyBar>);

impl RecentWindow {
    pub(crate) fn new(bars: Vec<DailyBar>) -> Self {
        Self(bars)
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.0
    }

    pub fn into_bars(self) -> Vec<DailyBar> {
        self.0
    }
}
