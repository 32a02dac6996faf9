//! Raw service payload to [`DetectionResult`].
//!
//! The inference service changed its response shape several times, and
//! different deployments answer with different field sets. Everything in
//! the payload is therefore optional, and [`normalize`] is total: every
//! field that is missing, mistyped or unparseable falls back to a default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::sources::match_source;
use crate::{ErrorKind, NO_TEXT_DETECTED};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
    #[default]
    Unknown,
}

impl Verdict {
    /// Case-insensitive match against the service's `final_prediction`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("real") {
            Verdict::Real
        } else if value.eq_ignore_ascii_case("fake") {
            Verdict::Fake
        } else {
            Verdict::Unknown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Real => "Real",
            Verdict::Fake => "Fake",
            Verdict::Unknown => "Unknown",
        }
    }
}

/// Word-level breakdown from the text classifier.
///
/// Counts come from the service and may be approximate: they are not
/// guaranteed to equal the lengths of the word lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub suspicious_words: u32,
    pub informal_words: u32,
    pub malicious_words: u32,
    pub inconsistency_score: f64,
    pub suspicious_word_list: Vec<String>,
    pub informal_word_list: Vec<String>,
    pub malicious_word_list: Vec<String>,
}

impl Analytics {
    fn from_object(value: &Value) -> Self {
        let (suspicious_words, suspicious_word_list) = category(value, "suspicious_words");
        let (informal_words, informal_word_list) = category(value, "informal_words");
        let (malicious_words, malicious_word_list) = category(value, "malicious_words");
        Self {
            suspicious_words,
            informal_words,
            malicious_words,
            inconsistency_score: number(value.get("inconsistency_score")),
            suspicious_word_list,
            informal_word_list,
            malicious_word_list,
        }
    }

    /// Decodes the `analytics` field in any of the shapes it has been seen
    /// in: an object, a JSON-encoded string of one, or nothing at all.
    pub fn decode(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::default(),
            Some(object @ Value::Object(_)) => Self::from_object(object),
            Some(Value::String(encoded)) => Self::decode_str(encoded),
            Some(other) => {
                warn!(
                    kind = ErrorKind::MalformedAnalytics.code(),
                    shape = value_kind(other),
                    "analytics is neither an object nor a string; ignoring"
                );
                Self::default()
            }
        }
    }

    fn decode_str(encoded: &str) -> Self {
        let encoded = encoded.trim();
        if encoded.is_empty() || encoded == "undefined" || encoded == "null" {
            return Self::default();
        }
        match serde_json::from_str::<Value>(encoded) {
            Ok(object @ Value::Object(_)) => Self::from_object(&object),
            Ok(other) => {
                warn!(
                    kind = ErrorKind::MalformedAnalytics.code(),
                    shape = value_kind(&other),
                    "encoded analytics is not an object; ignoring"
                );
                Self::default()
            }
            Err(e) => {
                warn!(
                    kind = ErrorKind::MalformedAnalytics.code(),
                    error = %e,
                    "analytics is not valid JSON; ignoring"
                );
                Self::default()
            }
        }
    }

    pub fn total_flagged(&self) -> u32 {
        self.suspicious_words
            .saturating_add(self.informal_words)
            .saturating_add(self.malicious_words)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedLink {
    pub link: String,
    #[serde(default)]
    pub label: String,
}

impl SuggestedLink {
    /// Accepts an array, or a JSON-encoded string of one. Entries may be
    /// `{link, label}` objects or bare URL strings.
    pub fn decode_list(value: Option<&Value>) -> Vec<Self> {
        let decoded;
        let items = match value {
            Some(Value::Array(items)) => items,
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Array(items)) => {
                    decoded = items;
                    &decoded
                }
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::String(link) => Some(Self {
                    link: link.clone(),
                    label: String::new(),
                }),
                Value::Object(_) => Some(Self {
                    link: string(item.get("link")),
                    label: string(item.get("label")),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Canonical, fully populated detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub real_pct: f64,
    pub fake_pct: f64,
    pub extracted_text: String,
    pub message: String,
    pub verdict: Verdict,
    pub analytics: Analytics,
    pub adjustment_reason: String,
    pub engagement_warning: String,
    pub suggested_link: String,
    pub suggested_links: Vec<SuggestedLink>,
    /// OCR bounding boxes, forwarded untouched.
    pub text_boxes: Value,
}

impl Default for DetectionResult {
    fn default() -> Self {
        normalize(&Value::Null)
    }
}

impl DetectionResult {
    pub fn real_display(&self) -> String {
        format_pct(self.real_pct)
    }

    pub fn fake_display(&self) -> String {
        format_pct(self.fake_pct)
    }
}

pub fn format_pct(value: f64) -> String {
    format!("{value:.2}")
}

pub fn normalize(raw: &Value) -> DetectionResult {
    let raw_text = string(raw.get("extractedText"));
    let extracted_text = if raw_text.trim().is_empty() {
        NO_TEXT_DETECTED.to_string()
    } else {
        raw_text.clone()
    };

    let suggested_links = SuggestedLink::decode_list(raw.get("suggested_links"));
    let suggested_link = suggested_links
        .iter()
        .map(|l| l.link.trim())
        .find(|l| !l.is_empty())
        .or_else(|| match_source(&raw_text))
        .unwrap_or_default()
        .to_string();

    DetectionResult {
        real_pct: number(raw.get("real")),
        fake_pct: number(raw.get("fake")),
        extracted_text,
        message: string(raw.get("message")),
        verdict: Verdict::parse(&string(raw.get("final_prediction"))),
        analytics: Analytics::decode(raw.get("analytics")),
        adjustment_reason: string(raw.get("adjustment_reason")),
        engagement_warning: string(raw.get("no_engagement_warning")),
        suggested_link,
        suggested_links,
        text_boxes: raw.get("textBoxes").cloned().unwrap_or(Value::Null),
    }
}

/// Finite float from a JSON number or numeric string, else `0.0`.
pub(crate) fn number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn count(value: Option<&Value>) -> u32 {
    let v = number(value);
    if v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        // in range and non-negative after the checks above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = v.round() as u32;
        rounded
    }
}

/// Some deployments send the matched words where the count belongs. Take
/// the count from the array length in that case.
fn category(analytics: &Value, key: &str) -> (u32, Vec<String>) {
    let singular = key.trim_end_matches('s');
    let list = [format!("{singular}_list"), format!("{key}_list")]
        .iter()
        .find_map(|k| analytics.get(k.as_str()).and_then(Value::as_array))
        .map(|items| words(items));

    match analytics.get(key) {
        Some(Value::Array(items)) => {
            let found = words(items);
            let n = u32::try_from(found.len()).unwrap_or(u32::MAX);
            (n, list.unwrap_or(found))
        }
        other => (count(other), list.unwrap_or_default()),
    }
}

fn words(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

fn string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
