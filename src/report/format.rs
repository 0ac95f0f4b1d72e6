use crate::core::metrics::{CutoffCount, MetricValue, TopRead};

pub const NOT_AVAILABLE: &str = "N/A";

pub fn decimal(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let s = format!("{:.1}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}%", value)
}

pub fn paired(first: &str, second: &str) -> String {
    format!("{} ({})", first, second)
}

pub fn align_right(cell: &str, width: usize) -> String {
    format!("{:>width$}", cell, width = width)
}

pub fn metric_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Count(n) => n.to_string(),
        MetricValue::Decimal(v) => decimal(*v),
        MetricValue::Text(s) => s.clone(),
    }
}

pub fn top_read(read: Option<&TopRead>) -> String {
    let Some(read) = read else {
        return NOT_AVAILABLE.to_string();
    };
    let quality = decimal(read.quality);
    let detail = match &read.read_id {
        Some(id) => format!("{}, [{}]", quality, id),
        None => quality,
    };
    paired(&read.length.to_string(), &detail)
}

pub fn cutoff(count: Option<&CutoffCount>) -> String {
    match count {
        Some(c) => paired(&c.count.to_string(), &percent(c.percent)),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn line(label: &str, cells: &[String], width: usize) -> String {
    let mut out = format!("{}:", label);
    for cell in cells {
        out.push('\t');
        out.push_str(&align_right(cell, width));
    }
    out
}
