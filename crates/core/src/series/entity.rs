use crate::series::error::SeriesError;
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// # Summary
/// 上游单日原始记录，字段保持提供方类型（通常为字符串形式的数字）。
///
/// # Invariants
/// - 不做任何默认值填充：缺失字段保持 `None`，由归一化阶段拒绝。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawBar {
    #[serde(rename = "1. open", skip_serializing_if = "Option::is_none")]
    pub open: Option<Value>,
    #[serde(rename = "2. high", skip_serializing_if = "Option::is_none")]
    pub high: Option<Value>,
    #[serde(rename = "3. low", skip_serializing_if = "Option::is_none")]
    pub low: Option<Value>,
    #[serde(rename = "4. close", skip_serializing_if = "Option::is_none")]
    pub close: Option<Value>,
    #[serde(rename = "5. volume", skip_serializing_if = "Option::is_none")]
    pub volume: Option<Value>,
}

impl RawBar {
    /// # Summary
    /// 从任意 JSON 值中提取 OHLCV 字段。
    ///
    /// # Logic
    /// 1. 非对象值视为全部字段缺失（该条目随后会被丢弃，而不是让整个响应解析失败）。
    /// 2. 优先读取 `"1. open"` 形式的键；兼容旧版接口 `"1a. open (USD)"` 形式的带市场后缀键。
    ///
    /// # Arguments
    /// * `value`: 单个日期对应的原始 JSON 值。
    ///
    /// # Returns
    /// 返回字段可能缺失的 `RawBar`。
    pub fn from_value(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };
        Self {
            open: lookup(&obj, "1. open", "1a. open"),
            high: lookup(&obj, "2. high", "2a. high"),
            low: lookup(&obj, "3. low", "3a. low"),
            close: lookup(&obj, "4. close", "4a. close"),
            volume: obj.get("5. volume").cloned(),
        }
    }
}

fn lookup(obj: &Map<String, Value>, key: &str, legacy_prefix: &str) -> Option<Value> {
    obj.get(key).cloned().or_else(|| {
        obj.iter()
            .find(|(k, _)| k.starts_with(legacy_prefix))
            .map(|(_, v)| v.clone())
    })
}

/// # Summary
/// 按文档顺序保存的原始时间序列（日期字符串 → 原始记录）。
///
/// # Invariants
/// - 保留上游 JSON 对象中的键顺序，包括重复出现的日期键，
///   使 "首次出现者胜出" 的去重规则不依赖哈希表的迭代顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntries(Vec<(String, RawBar)>);

impl RawEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, date: impl Into<String>, bar: RawBar) {
        self.0.push((date.into(), bar));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawBar)> {
        self.0.iter().map(|(date, bar)| (date.as_str(), bar))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, RawBar)> for RawEntries {
    fn from_iter<I: IntoIterator<Item = (String, RawBar)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RawEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (date, bar) in &self.0 {
            map.serialize_entry(date, bar)?;
        }
        map.end()
    }
}

struct RawEntriesVisitor;

impl<'de> Visitor<'de> for RawEntriesVisitor {
    type Value = RawEntries;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a map of date strings to OHLCV records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((date, value)) = access.next_entry::<String, Value>()? {
            entries.push((date, RawBar::from_value(value)));
        }
        Ok(RawEntries(entries))
    }
}

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawEntriesVisitor)
    }
}

/// # Summary
/// 上游元数据块，键名与 AlphaVantage 响应保持一致。
///
/// # Invariants
/// - 所有字段缺失时为空字符串；核心逻辑不解释其内容，仅透传。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMetadata {
    #[serde(rename = "1. Information")]
    pub information: String,
    #[serde(rename = "2. Digital Currency Code")]
    pub digital_currency_code: String,
    #[serde(rename = "3. Digital Currency Name")]
    pub digital_currency_name: String,
    #[serde(rename = "4. Market Code")]
    pub market_code: String,
    #[serde(rename = "5. Market Name")]
    pub market_name: String,
    #[serde(rename = "6. Last Refreshed")]
    pub last_refreshed: String,
    #[serde(rename = "7. Time Zone")]
    pub time_zone: String,
}

/// # Summary
/// 一次上游调用得到的完整原始载荷。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDailyPayload {
    pub metadata: RawMetadata,
    pub entries: RawEntries,
}

/// # Summary
/// 对外透传的元数据，字段名为稳定的 snake_case 契约。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub information: String,
    pub digital_currency_code: String,
    pub digital_currency_name: String,
    pub market_code: String,
    pub market_name: String,
    pub last_refreshed: String,
    pub time_zone: String,
}

impl From<&RawMetadata> for Metadata {
    fn from(raw: &RawMetadata) -> Self {
        Self {
            information: raw.information.clone(),
            digital_currency_code: raw.digital_currency_code.clone(),
            digital_currency_name: raw.digital_currency_name.clone(),
            market_code: raw.market_code.clone(),
            market_name: raw.market_name.clone(),
            last_refreshed: raw.last_refreshed.clone(),
            time_zone: raw.time_zone.clone(),
        }
    }
}

/// # Summary
/// 经过校验的单日 OHLCV 记录。
///
/// # Invariants
/// - 所有数值均为有限非负数。
/// - `date` 为日历日期，不携带时区。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    // 交易日
    pub date: NaiveDate,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量（以数字货币为单位）
    pub volume: f64,
}

/// # Summary
/// 归一化后的日线序列。
///
/// # Invariants
/// - 非空。
/// - 按日期严格降序（最新在前），因此不存在重复日期。
/// - 构造后不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    bars: Vec<DailyBar>,
}

impl NormalizedSeries {
    /// # Summary
    /// 从已排序的记录构造序列，并校验全部不变量。
    ///
    /// # Logic
    /// 1. 拒绝空输入。
    /// 2. 检查相邻记录日期严格递减。
    ///
    /// # Arguments
    /// * `bars`: 期望已按日期降序排列且去重的记录。
    ///
    /// # Returns
    /// 违反不变量时返回 `SeriesError::PreconditionViolation`，
    /// 这代表调用方的编程错误而不是数据问题。
    pub fn try_from_bars(bars: Vec<DailyBar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::PreconditionViolation(
                "normalized series must not be empty".to_string(),
            ));
        }
        if let Some(pair) = bars.windows(2).find(|w| w[0].date <= w[1].date) {
            return Err(SeriesError::PreconditionViolation(format!(
                "dates must be strictly descending, found {} before {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { bars })
    }

    /// 最新一条记录（不变量保证其存在）
    pub fn latest(&self) -> &DailyBar {
        &self.bars[0]
    }

    /// 次新一条记录，单日序列时为 `None`
    pub fn previous(&self) -> Option<&DailyBar> {
        self.bars.get(1)
    }

    /// 最近 `n` 条记录，长度为 `min(n, 总长度)`
    pub fn head(&self, n: usize) -> &[DailyBar] {
        &self.bars[..n.min(self.bars.len())]
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bar(date: &str, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_raw_entries_keep_document_order_and_duplicates() {
        let body = r#"{
            "2024-01-14": {"4. close": "1"},
            "2024-01-15": {"4. close": "2"},
            "2024-01-14": {"4. close": "3"}
        }"#;
        let entries: RawEntries = serde_json::from_str(body).unwrap();
        let dates: Vec<&str> = entries.iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec!["2024-01-14", "2024-01-15", "2024-01-14"]);
        let closes: Vec<_> = entries.iter().map(|(_, b)| b.close.clone()).collect();
        assert_eq!(closes, vec![Some(json!("1")), Some(json!("2")), Some(json!("3"))]);
    }

    #[test]
    fn test_raw_bar_accepts_legacy_market_suffixed_keys() {
        let bar = RawBar::from_value(json!({
            "1a. open (USD)": "10",
            "1b. open (USD)": "10",
            "2a. high (USD)": "12",
            "3a. low (USD)": "9",
            "4a. close (USD)": "11",
            "5. volume": "100"
        }));
        assert_eq!(bar.open, Some(json!("10")));
        assert_eq!(bar.high, Some(json!("12")));
        assert_eq!(bar.low, Some(json!("9")));
        assert_eq!(bar.close, Some(json!("11")));
        assert_eq!(bar.volume, Some(json!("100")));
    }

    #[test]
    fn test_raw_bar_from_non_object_is_empty() {
        assert_eq!(RawBar::from_value(json!("garbage")), RawBar::default());
    }

    #[test]
    fn test_payload_survives_cache_roundtrip() {
        let mut entries = RawEntries::new();
        entries.push(
            "2024-01-15",
            RawBar::from_value(json!({"1. open": "1", "4. close": "2"})),
        );
        let payload = RawDailyPayload {
            metadata: RawMetadata {
                digital_currency_code: "BTC".to_string(),
                ..RawMetadata::default()
            },
            entries,
        };
        let bytes = serde_json::to_vec(&payload).unwrap();
        let back: RawDailyPayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_try_from_bars_rejects_empty() {
        assert!(matches!(
            NormalizedSeries::try_from_bars(vec![]),
            Err(SeriesError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_try_from_bars_rejects_unsorted_or_duplicate() {
        let ascending = vec![bar("2024-01-14", 1.0), bar("2024-01-15", 2.0)];
        assert!(matches!(
            NormalizedSeries::try_from_bars(ascending),
            Err(SeriesError::PreconditionViolation(_))
        ));

        let duplicate = vec![bar("2024-01-15", 1.0), bar("2024-01-15", 2.0)];
        assert!(matches!(
            NormalizedSeries::try_from_bars(duplicate),
            Err(SeriesError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_head_is_bounded_by_length() {
        let series = NormalizedSeries::try_from_bars(vec![
            bar("2024-01-15", 3.0),
            bar("2024-01-14", 2.0),
        ])
        .unwrap();
        assert_eq!(series.head(7).len(), 2);
        assert_eq!(series.head(1).len(), 1);
        assert_eq!(series.latest().close, 3.0);
        assert_eq!(series.previous().map(|b| b.close), Some(2.0));
    }
}
