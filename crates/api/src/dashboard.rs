//! # HTML 看板渲染
//!
//! 将 `CurrencyReport` 渲染为一个自包含的 HTML 页面：
//! 指标卡片、收盘价 SVG 折线（含高低价带）、成交量柱状图、
//! 周/月统计表、最近数据表以及交易对选择器。
//!
//! 页面不依赖任何外部脚本或样式表。

use std::fmt::{self, Write};

use coinlens_core::common::CurrencyPair;
use coinlens_core::report::CurrencyReport;
use coinlens_core::series::entity::DailyBar;

/// 选择器中预置的数字货币
pub const SYMBOL_CHOICES: [&str; 6] = ["BTC", "ETH", "LTC", "XRP", "DOGE", "SOL"];
/// 选择器中预置的计价货币
pub const MARKET_CHOICES: [&str; 4] = ["USD", "EUR", "GBP", "JPY"];

const CHART_WIDTH: f64 = 760.0;
const PRICE_HEIGHT: f64 = 260.0;
const VOLUME_HEIGHT: f64 = 140.0;
const CHART_PAD: f64 = 36.0;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f4f6f9;color:#1f2933}\
header{background:#1f2933;color:#fff;padding:16px 24px}\
header h1{margin:0 0 4px;font-size:22px}header p{margin:0;opacity:.8;font-size:13px}\
main{max-width:880px;margin:0 auto;padding:20px}\
form{margin-bottom:16px}select,button{padding:6px 10px;margin-right:8px}\
.cards{display:flex;flex-wrap:wrap;gap:12px;margin-bottom:20px}\
.card{flex:1 1 180px;background:#fff;border-radius:8px;padding:14px;\
box-shadow:0 1px 3px rgba(0,0,0,.1)}\
.card .label{font-size:12px;color:#616e7c}.card .value{font-size:20px;font-weight:600}\
.up{color:#0e9f6e}.down{color:#e02424}\
section{background:#fff;border-radius:8px;padding:14px;margin-bottom:20px;\
box-shadow:0 1px 3px rgba(0,0,0,.1)}\
table{border-collapse:collapse;width:100%;font-size:13px}\
th,td{padding:6px 8px;border-bottom:1px solid #e4e7eb;text-align:right}\
th:first-child,td:first-child{text-align:left}\
.error{background:#fde8e8;color:#9b1c1c;border-radius:8px;padding:16px}";

/// # Summary
/// 渲染成功的看板页面。
///
/// # Arguments
/// * `pair`: 当前展示的交易对，用于选择器回显。
/// * `report`: 核心管线生成的报告。
///
/// # Returns
/// 完整的 HTML 文档。
pub fn render_dashboard(pair: &CurrencyPair, report: &CurrencyReport) -> String {
    let mut out = String::with_capacity(16 * 1024);
    match write_dashboard(&mut out, pair, report) {
        Ok(()) => out,
        Err(e) => {
            tracing::error!("Dashboard rendering failed for {}: {}", pair, e);
            render_error(pair.symbol(), pair.market(), "failed to render dashboard")
        }
    }
}

/// # Summary
/// 渲染错误面板页面，保留选择器以便用户切换交易对。
pub fn render_error(symbol: &str, market: &str, message: &str) -> String {
    let mut out = String::with_capacity(4 * 1024);
    let written = (|| -> fmt::Result {
        write_head(&mut out, "coinlens dashboard")?;
        out.push_str("<header><h1>coinlens</h1><p>Digital currency dashboard</p></header><main>");
        write_selectors(&mut out, symbol, market)?;
        write!(
            out,
            "<div class=\"error\"><strong>Unable to load {}/{}</strong><p>{}</p></div>",
            escape(symbol),
            escape(market),
            escape(message)
        )?;
        out.push_str("</main></body></html>");
        Ok(())
    })();

    if written.is_err() {
        tracing::error!("Error page rendering failed");
    }
    out
}

fn write_dashboard(out: &mut String, pair: &CurrencyPair, report: &CurrencyReport) -> fmt::Result {
    let meta = &report.metadata;
    let metrics = &report.metrics;

    write_head(out, &format!("{} dashboard", pair))?;
    write!(
        out,
        "<header><h1>{} ({}) / {} ({})</h1>\
<p>Last refreshed: {} &middot; Time zone: {}</p></header><main>",
        escape(&meta.digital_currency_name),
        escape(&meta.digital_currency_code),
        escape(&meta.market_name),
        escape(&meta.market_code),
        escape(&meta.last_refreshed),
        escape(&meta.time_zone)
    )?;
    write_selectors(out, pair.symbol(), pair.market())?;

    // 指标卡片
    let trend = if metrics.daily_change >= 0.0 { "up" } else { "down" };
    out.push_str("<div class=\"cards\">");
    write_card(
        out,
        "Latest price",
        &format!("{:.2} {}", metrics.latest_price, escape(pair.market())),
        None,
    )?;
    write_card(
        out,
        "Daily change",
        &format!("{:+.2} ({:+.2}%)", metrics.daily_change, metrics.daily_change_percent),
        Some(trend),
    )?;
    write_card(out, "Volume", &format!("{:.2}", metrics.latest_volume), None)?;
    write_card(out, "Latest date", &metrics.latest_date.format("%Y-%m-%d").to_string(), None)?;
    out.push_str("</div>");

    // 图表按时间正序绘制
    let chronological: Vec<&DailyBar> = report.recent_data.bars().iter().rev().collect();
    out.push_str("<section><h3>Close price</h3>");
    write_price_chart(out, &chronological)?;
    out.push_str("</section><section><h3>Volume</h3>");
    write_volume_chart(out, &chronological)?;
    out.push_str("</section>");

    // 周/月统计
    out.push_str(
        "<section><h3>Statistics</h3><table>\
<tr><th>Window</th><th>Average</th><th>High</th><th>Low</th></tr>",
    );
    write!(
        out,
        "<tr><td>7 days</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
        metrics.weekly_avg, metrics.weekly_high, metrics.weekly_low
    )?;
    write!(
        out,
        "<tr><td>30 days</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
        metrics.monthly_avg, metrics.monthly_high, metrics.monthly_low
    )?;
    out.push_str("</table></section>");

    // 最近数据（最新在前）
    out.push_str(
        "<section><h3>Recent data</h3><table><tr><th>Date</th><th>Open</th>\
<th>High</th><th>Low</th><th>Close</th><th>Volume</th></tr>",
    );
    for bar in report.recent_data.bars() {
        write!(
            out,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td>\
<td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            bar.date.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        )?;
    }
    out.push_str("</table></section></main></body></html>");
    Ok(())
}

fn write_head(out: &mut String, title: &str) -> fmt::Result {
    write!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
<title>{}</title><style>{}</style></head><body>",
        escape(title),
        STYLE
    )
}

fn write_card(out: &mut String, label: &str, value: &str, class: Option<&str>) -> fmt::Result {
    write!(
        out,
        "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value {}\">{}</div></div>",
        label,
        class.unwrap_or(""),
        value
    )
}

/// 选择器包含预置选项；当前值不在预置列表时追加为首项
fn write_selectors(out: &mut String, symbol: &str, market: &str) -> fmt::Result {
    out.push_str("<form method=\"get\" action=\"/dashboard\">");
    write_select(out, "symbol", symbol, &SYMBOL_CHOICES)?;
    write_select(out, "market", market, &MARKET_CHOICES)?;
    out.push_str(
        "<button type=\"submit\">Show</button>\
<button type=\"submit\" name=\"refresh\" value=\"true\">Refresh</button></form>",
    );
    Ok(())
}

fn write_select(out: &mut String, name: &str, current: &str, choices: &[&str]) -> fmt::Result {
    let current = current.trim().to_ascii_uppercase();
    write!(out, "<select name=\"{}\">", name)?;
    if !current.is_empty() && !choices.contains(&current.as_str()) {
        write!(out, "<option selected>{}</option>", escape(&current))?;
    }
    for choice in choices {
        let selected = if *choice == current { " selected" } else { "" };
        write!(out, "<option{}>{}</option>", selected, choice)?;
    }
    out.push_str("</select>");
    Ok(())
}

/// # Summary
/// 收盘价折线，背景为每日高低价区间带。
///
/// # Logic
/// 1. 纵轴范围取窗口内最低 low 与最高 high。
/// 2. 高低价带为 high 正向 + low 反向拼成的闭合多边形。
fn write_price_chart(out: &mut String, bars: &[&DailyBar]) -> fmt::Result {
    write!(
        out,
        "<svg viewBox=\"0 0 {w} {h}\" width=\"100%\" role=\"img\" \
aria-label=\"close price chart\">",
        w = CHART_WIDTH,
        h = PRICE_HEIGHT
    )?;
    if bars.is_empty() {
        return out.write_str("</svg>");
    }

    let min = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let max = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let xs = x_positions(bars.len());
    let y = |v: f64| scale_y(v, min, max, PRICE_HEIGHT);

    let highs = xs.iter().zip(bars).map(|(x, b)| point(*x, y(b.high)));
    let lows = xs.iter().zip(bars).rev().map(|(x, b)| point(*x, y(b.low)));
    let band: Vec<String> = highs.chain(lows).collect();
    write!(
        out,
        "<polygon points=\"{}\" fill=\"#c3ddfd\" opacity=\"0.6\"/>",
        band.join(" ")
    )?;

    let line: Vec<String> = xs.iter().zip(bars).map(|(x, b)| point(*x, y(b.close))).collect();
    write!(
        out,
        "<polyline points=\"{}\" fill=\"none\" stroke=\"#1c64f2\" stroke-width=\"2\"/>",
        line.join(" ")
    )?;
    for (x, b) in xs.iter().zip(bars) {
        write!(
            out,
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#1c64f2\">\
<title>{} close {:.2}</title></circle>",
            x,
            y(b.close),
            b.date.format("%Y-%m-%d"),
            b.close
        )?;
    }

    write_axis_labels(out, bars, &xs, PRICE_HEIGHT)?;
    write!(
        out,
        "<text x=\"4\" y=\"{:.1}\" font-size=\"11\">{:.2}</text>\
<text x=\"4\" y=\"{:.1}\" font-size=\"11\">{:.2}</text></svg>",
        CHART_PAD - 6.0,
        max,
        PRICE_HEIGHT - CHART_PAD + 12.0,
        min
    )
}

fn write_volume_chart(out: &mut String, bars: &[&DailyBar]) -> fmt::Result {
    write!(
        out,
        "<svg viewBox=\"0 0 {w} {h}\" width=\"100%\" role=\"img\" aria-label=\"volume chart\">",
        w = CHART_WIDTH,
        h = VOLUME_HEIGHT
    )?;
    if bars.is_empty() {
        return out.write_str("</svg>");
    }

    let max = bars.iter().map(|b| b.volume).fold(0.0, f64::max);
    let xs = x_positions(bars.len());
    let base = VOLUME_HEIGHT - CHART_PAD;
    let bar_width = ((CHART_WIDTH - 2.0 * CHART_PAD) / count(xs.len().max(1)) * 0.6).max(2.0);

    for (x, b) in xs.iter().zip(bars) {
        let top = scale_y(b.volume, 0.0, max, VOLUME_HEIGHT);
        write!(
            out,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"#7e3af2\">\
<title>{} volume {:.2}</title></rect>",
            x - bar_width / 2.0,
            top,
            bar_width,
            (base - top).max(0.0),
            b.date.format("%Y-%m-%d"),
            b.volume
        )?;
    }
    write_axis_labels(out, bars, &xs, VOLUME_HEIGHT)?;
    out.write_str("</svg>")
}

fn write_axis_labels(out: &mut String, bars: &[&DailyBar], xs: &[f64], height: f64) -> fmt::Result {
    for (x, b) in xs.iter().zip(bars) {
        write!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"middle\">{}</text>",
            x,
            height - 8.0,
            b.date.format("%m-%d")
        )?;
    }
    Ok(())
}

/// 等距横坐标；单点时居中
fn x_positions(n: usize) -> Vec<f64> {
    let usable = CHART_WIDTH - 2.0 * CHART_PAD;
    if n <= 1 {
        return vec![CHART_WIDTH / 2.0; n];
    }
    let step = usable / count(n - 1);
    std::iter::successors(Some(CHART_PAD), |x| Some(x + step))
        .take(n)
        .collect()
}

/// 值域退化（max == min）时画在中线
fn scale_y(value: f64, min: f64, max: f64, height: f64) -> f64 {
    let usable = height - 2.0 * CHART_PAD;
    let span = max - min;
    if span <= f64::EPSILON {
        return height / 2.0;
    }
    CHART_PAD + (max - value) / span * usable
}

/// 窗口长度很小，超出 u32 时饱和
fn count(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

fn point(x: f64, y: f64) -> String {
    format!("{:.1},{:.1}", x, y)
}

/// 最小化 HTML 转义，上游字符串可能包含任意文本
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
