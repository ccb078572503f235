//! Reply normalisation.
//!
//! The BGC endpoint answers with emoji-decorated labels whose values carry a
//! unit suffix (`"🌡️ Temperature": "26.1 °C"`). That format is owned by the
//! model space and may drift, so all knowledge of it lives here.

use floatpoint_common::BgcPrediction;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::backend::LabelledValues;

pub const LABEL_TEMPERATURE: &str = "\u{1F321}\u{FE0F} Temperature";
pub const LABEL_SALINITY: &str = "\u{1F9C2} Salinity";
pub const LABEL_PRESSURE: &str = "\u{1F4CA} Pressure";
pub const LABEL_DISSOLVED_OXYGEN: &str = "\u{1F4A8} Dissolved Oxygen";
pub const LABEL_NITRATE: &str = "\u{1F9EA} Nitrate";
pub const LABEL_CHLOROPHYLL: &str = "\u{1F331} Chlorophyll-a";

static SUMMARY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:…|\.{3})?\s*and\s+\d+\s+more data points\.?")
        .expect("summary suffix pattern is valid")
});

/// Map a labelled BGC reply onto the six-field prediction.
pub fn normalise_bgc_reply(reply: &LabelledValues) -> BgcPrediction {
    BgcPrediction {
        temperature: leading_number(lookup(reply, LABEL_TEMPERATURE)),
        salinity: leading_number(lookup(reply, LABEL_SALINITY)),
        pressure: leading_number(lookup(reply, LABEL_PRESSURE)),
        dissolved_oxygen: leading_number(lookup(reply, LABEL_DISSOLVED_OXYGEN)),
        nitrate: leading_number(lookup(reply, LABEL_NITRATE)),
        chlorophyll: leading_number(lookup(reply, LABEL_CHLOROPHYLL)),
    }
}

/// Exact label first, then the same label with its decoration stripped.
fn lookup<'a>(reply: &'a LabelledValues, label: &str) -> Option<&'a Value> {
    if let Some(v) = reply.get(label) {
        return Some(v);
    }
    let wanted = bare_label(label);
    reply
        .iter()
        .find(|(k, _)| bare_label(k).eq_ignore_ascii_case(wanted))
        .map(|(_, v)| v)
}

fn bare_label(label: &str) -> &str {
    label.trim_start_matches(|c: char| !c.is_ascii_alphanumeric()).trim_end()
}

/// First whitespace-separated token as a float; 0 when absent or unparsable.
pub fn leading_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::String(s)) => s.split_whitespace().next().and_then(|tok| tok.parse::<f64>().ok()),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Drop trailing "… and N more data points" summaries from NLP answers.
pub fn strip_summary_suffix(text: &str) -> String {
    SUMMARY_SUFFIX.replace_all(text, "").into_owned()
}
