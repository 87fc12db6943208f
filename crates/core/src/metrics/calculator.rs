use crate::metrics::entity::{MetricsBundle, RecentWindow};
use crate::series::entity::{DailyBar, NormalizedSeries};
use rust_decimal::{Decimal, RoundingStrategy};

/// 周统计窗口（交易日数）
pub const WEEKLY_WINDOW: usize = 7;
/// 月统计窗口（交易日数）
pub const MONTHLY_WINDOW: usize = 30;
/// 展示用最近记录条数
pub const RECENT_WINDOW: usize = 10;

/// 窗口聚合的中间结果，未经舍入
struct WindowStats {
    avg: f64,
    high: f64,
    low: f64,
}

/// # Summary
/// 从归一化序列派生指标快照与最近窗口。
///
/// # Logic
/// 1. 取序列首条作为最新快照。
/// 2. 若存在次新记录，计算日变动；前一收盘价为 0 或商溢出时百分比记为 0。
/// 3. 在 `min(7, len)` 与 `min(30, len)` 条记录上分别计算收盘均价、最高价、最低价。
/// 4. 所有派生值仅在输出时舍入一次。
/// 5. 截取 `min(10, len)` 条记录作为展示窗口。
///
/// # Arguments
/// * `series`: 已满足非空、降序、去重不变量的序列，此处不再重复校验。
///
/// # Returns
/// 返回 `(MetricsBundle, RecentWindow)`。
pub fn derive(series: &NormalizedSeries) -> (MetricsBundle, RecentWindow) {
    let latest = series.latest();

    let (daily_change, daily_change_percent) = match series.previous() {
        Some(previous) => {
            let change = latest.close - previous.close;
            let percent = if previous.close == 0.0 {
                0.0
            } else {
                change / previous.close * 100.0
            };
            // 极小的前收盘价（如次正规数）会使商溢出
            let percent = if percent.is_finite() { percent } else { 0.0 };
            (change, percent)
        }
        None => (0.0, 0.0),
    };

    let weekly = window_stats(series.head(WEEKLY_WINDOW));
    let monthly = window_stats(series.head(MONTHLY_WINDOW));

    let metrics = MetricsBundle {
        latest_price: latest.close,
        latest_volume: latest.volume,
        latest_date: latest.date,
        daily_change: round2(daily_change),
        daily_change_percent: round2(daily_change_percent),
        weekly_avg: round2(weekly.avg),
        weekly_high: round2(weekly.high),
        weekly_low: round2(weekly.low),
        monthly_avg: round2(monthly.avg),
        monthly_high: round2(monthly.high),
        monthly_low: round2(monthly.low),
    };

    let recent = RecentWindow::new(series.head(RECENT_WINDOW).to_vec());
    (metrics, recent)
}

/// 均值采用增量形式，接近 `f64::MAX` 的收盘价求和也不会溢出
fn window_stats(bars: &[DailyBar]) -> WindowStats {
    let (avg, _, high, low) = bars.iter().fold(
        (0.0_f64, 0.0_f64, f64::NEG_INFINITY, f64::INFINITY),
        |(avg, count, high, low), bar| {
            let count = count + 1.0;
            (
                avg + (bar.close - avg) / count,
                count,
                high.max(bar.high),
                low.min(bar.low),
            )
        },
    );
    WindowStats { avg, high, low }
}

/// # Summary
/// 四舍五入到两位小数（中点远离零）。
///
/// # Logic
/// 1. 以 f64 的精确二进制值构造 `Decimal` 后舍入。
/// 2. 经十进制字符串转回 f64，得到离两位小数最近的 f64。
///
/// # Returns
/// 无法表示为 `Decimal` 的值原样返回。
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_string().parse::<f64>().ok())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// 以 2024-03-01 为最新日，逐日向前生成记录
    fn series_of(closes: &[f64]) -> NormalizedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyBar {
                date: start - Duration::days(i64::try_from(i).unwrap()),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10.0,
            })
            .collect();
        NormalizedSeries::try_from_bars(bars).unwrap()
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(41766.666666666664), 41766.67);
        assert_eq!(round2(1.674641148325359), 1.67);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(42500.0), 42500.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_windows_cover_min_of_length() {
        // 40 条记录：最新 7 条收盘价为 100..=106 倒序，其余为 1
        let mut closes: Vec<f64> = (0..7).map(|i| 106.0 - f64::from(i)).collect();
        closes.extend(std::iter::repeat_n(1.0, 33));
        let (metrics, recent) = derive(&series_of(&closes));

        assert_eq!(metrics.weekly_avg, 103.0);
        assert_eq!(metrics.weekly_high, 107.0);
        assert_eq!(metrics.weekly_low, 99.0);

        // 月窗口 = 7 条 (100..=106) + 23 条 1.0
        let expected_monthly = (721.0 + 23.0) / 30.0;
        assert_eq!(metrics.monthly_avg, round2(expected_monthly));
        assert_eq!(metrics.monthly_high, 107.0);
        assert_eq!(metrics.monthly_low, 0.0);

        assert_eq!(recent.bars().len(), RECENT_WINDOW);
        assert_eq!(recent.bars()[0].close, 106.0);
    }

    #[test]
    fn test_short_series_windows() {
        let (metrics, recent) = derive(&series_of(&[10.0, 20.0, 30.0]));
        assert_eq!(metrics.weekly_avg, 20.0);
        assert_eq!(metrics.monthly_avg, 20.0);
        assert_eq!(metrics.weekly_high, 31.0);
        assert_eq!(metrics.monthly_low, 9.0);
        assert_eq!(recent.bars().len(), 3);
    }

    #[test]
    fn test_division_guard_on_zero_previous_close() {
        let (metrics, _) = derive(&series_of(&[5.0, 0.0]));
        assert_eq!(metrics.daily_change, 5.0);
        assert_eq!(metrics.daily_change_percent, 0.0);
        assert!(metrics.daily_change_percent.is_finite());
    }

    #[test]
    fn test_negative_daily_change() {
        let (metrics, _) = derive(&series_of(&[90.0, 100.0]));
        assert_eq!(metrics.daily_change, -10.0);
        assert_eq!(metrics.daily_change_percent, -10.0);
    }

    #[test]
    fn test_rounding_happens_once_at_output() {
        // 先舍入再平均会得到 (2.00 + 2.00 + 2.01) / 3 = 2.00
        let (metrics, _) = derive(&series_of(&[2.004, 2.004, 2.008]));
        assert_eq!(metrics.weekly_avg, 2.01);
    }

    #[test]
    fn test_extreme_closes_keep_metrics_finite() {
        let (metrics, _) = derive(&series_of(&[1.7e308, 1e308]));
        assert!(metrics.weekly_avg.is_finite());
        assert!(metrics.monthly_avg.is_finite());
        assert!((metrics.weekly_avg / 1.35e308 - 1.0).abs() < 1e-12);

        let json = serde_json::to_string(&metrics).unwrap();
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_subnormal_previous_close_reports_zero_percent() {
        let (metrics, _) = derive(&series_of(&[10000.0, 1e-320]));
        assert_eq!(metrics.daily_change, 10000.0);
        assert_eq!(metrics.daily_change_percent, 0.0);
    }
}
