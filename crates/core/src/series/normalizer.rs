use crate::series::entity::{DailyBar, Metadata, NormalizedSeries, RawBar, RawEntries, RawMetadata};
use crate::series::error::SeriesError;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 上游日期格式
const DATE_FORMAT: &str = "%Y-%m-%d";

/// # Summary
/// 归一化过程的诊断计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    // 进入序列的记录数
    pub accepted: usize,
    // 因日期或数值非法被丢弃的记录数
    pub invalid: usize,
    // 因日期重复被丢弃的记录数
    pub duplicates: usize,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.invalid + self.duplicates
    }
}

/// # Summary
/// 归一化结果：透传的元数据、有效序列及诊断计数。
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub metadata: Metadata,
    pub series: NormalizedSeries,
    pub report: NormalizeReport,
}

/// # Summary
/// 将上游原始载荷转换为经过校验、按日期降序排列的序列。
///
/// # Logic
/// 1. 按输入文档顺序逐条解析；解析失败的记录直接丢弃并计数。
/// 2. 以日历日期去重，首个有效出现者胜出，后续重复者丢弃并计数。
/// 3. 按日期降序排序。
/// 4. 若没有任何记录存活，返回 `EmptySeries`。
///
/// # Arguments
/// * `raw_metadata`: 上游元数据块，原样透传。
/// * `raw_entries`: 日期字符串到原始记录的有序映射。
///
/// # Returns
/// 成功返回 `Normalized`，全部无效时返回 `SeriesError::EmptySeries`。
pub fn normalize(
    raw_metadata: &RawMetadata,
    raw_entries: &RawEntries,
) -> Result<Normalized, SeriesError> {
    let mut report = NormalizeReport::default();
    let mut seen: HashSet<NaiveDate> = HashSet::with_capacity(raw_entries.len());
    let mut bars = Vec::with_capacity(raw_entries.len());

    for (date, raw) in raw_entries.iter() {
        match parse_entry(date, raw) {
            Ok(bar) => {
                if seen.insert(bar.date) {
                    bars.push(bar);
                } else {
                    report.duplicates += 1;
                    debug!("Dropping duplicate entry for {}", date);
                }
            }
            Err(err) => {
                report.invalid += 1;
                debug!("Dropping entry: {}", err);
            }
        }
    }

    if bars.is_empty() {
        warn!(
            "No valid entries left after normalization ({} raw entries)",
            raw_entries.len()
        );
        return Err(SeriesError::EmptySeries {
            dropped: report.dropped(),
        });
    }

    bars.sort_by(|a, b| b.date.cmp(&a.date));
    report.accepted = bars.len();

    if report.dropped() > 0 {
        warn!(
            accepted = report.accepted,
            invalid = report.invalid,
            duplicates = report.duplicates,
            "Series normalized with dropped entries"
        );
    }

    Ok(Normalized {
        metadata: Metadata::from(raw_metadata),
        series: NormalizedSeries::try_from_bars(bars)?,
        report,
    })
}

/// # Summary
/// 解析单条原始记录。
///
/// # Logic
/// 1. 日期必须符合 `YYYY-MM-DD`。
/// 2. 五个数值字段必须全部存在，且为有限非负数。
///
/// # Returns
/// 任一检查失败返回 `SeriesError::InvalidEntry`。
pub fn parse_entry(date: &str, raw: &RawBar) -> Result<DailyBar, SeriesError> {
    let invalid = |reason: String| SeriesError::InvalidEntry {
        date: date.to_string(),
        reason,
    };

    let parsed_date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| invalid(format!("bad date: {}", e)))?;

    Ok(DailyBar {
        date: parsed_date,
        open: parse_number("open", raw.open.as_ref()).map_err(invalid)?,
        high: parse_number("high", raw.high.as_ref()).map_err(invalid)?,
        low: parse_number("low", raw.low.as_ref()).map_err(invalid)?,
        close: parse_number("close", raw.close.as_ref()).map_err(invalid)?,
        volume: parse_number("volume", raw.volume.as_ref()).map_err(invalid)?,
    })
}

fn parse_number(field: &str, value: Option<&Value>) -> Result<f64, String> {
    let number = match value {
        None => return Err(format!("missing {}", field)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("non-numeric {}: {:?}", field, s))?,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("unrepresentable {}: {}", field, n))?,
        Some(other) => return Err(format!("unexpected {} type: {}", field, other)),
    };

    if !number.is_finite() {
        return Err(format!("non-finite {}: {}", field, number));
    }
    if number < 0.0 {
        return Err(format!("negative {}: {}", field, number));
    }
    Ok(number)
}
