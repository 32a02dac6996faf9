//! Result screen state.
//!
//! A detection outcome travels to the result screen as [`NavParams`], a
//! flat map of strings a shell router can carry. [`ResultController`]
//! rebuilds the result from those params through the same normalizer the
//! capture screen uses, and freezes the display decisions once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::detection::normalize::number;
use crate::detection::{format_pct, normalize, DetectionResult, SuggestedLink, Verdict};
use crate::theme::ColorRole;

pub const PARAM_REAL: &str = "real";
pub const PARAM_FAKE: &str = "fake";
pub const PARAM_EXTRACTED_TEXT: &str = "extractedText";
pub const PARAM_MESSAGE: &str = "message";
pub const PARAM_ANALYTICS: &str = "analytics";
pub const PARAM_ADJUSTMENT_REASON: &str = "adjustment_reason";
pub const PARAM_NO_ENGAGEMENT_WARNING: &str = "no_engagement_warning";
pub const PARAM_TEXT_BOXES: &str = "textBoxes";
pub const PARAM_IMAGE_URI: &str = "imageUri";
pub const PARAM_FINAL_PREDICTION: &str = "final_prediction";
pub const PARAM_SUGGESTED_LINKS: &str = "suggested_links";

/// Params the result screen cannot do without. Anything else missing is
/// silently defaulted.
pub const REQUIRED_PARAMS: [&str; 5] = [
    PARAM_REAL,
    PARAM_FAKE,
    PARAM_EXTRACTED_TEXT,
    PARAM_ANALYTICS,
    PARAM_FINAL_PREDICTION,
];

/// String-typed navigation parameters, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavParams {
    entries: Vec<(String, String)>,
}

impl NavParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes a service payload the way the capture screen hands it off.
    ///
    /// Percentages are written as two-decimal strings. Everything else is
    /// carried as the service sent it, so a field the payload lacks is
    /// still missing (or blank) when the result screen checks for it.
    pub fn from_payload(raw: &Value, image_uri: Option<&str>) -> Self {
        let mut params = Self::new();
        params.insert(PARAM_REAL, format_pct(number(raw.get(PARAM_REAL))));
        params.insert(PARAM_FAKE, format_pct(number(raw.get(PARAM_FAKE))));
        params.insert(PARAM_EXTRACTED_TEXT, raw_str(raw, PARAM_EXTRACTED_TEXT));
        params.insert(PARAM_MESSAGE, raw_str(raw, PARAM_MESSAGE));
        if let Some(analytics) = raw.get(PARAM_ANALYTICS).filter(|v| !v.is_null()) {
            params.insert(PARAM_ANALYTICS, encode_field(analytics));
        }
        params.insert(PARAM_ADJUSTMENT_REASON, raw_str(raw, PARAM_ADJUSTMENT_REASON));
        params.insert(
            PARAM_NO_ENGAGEMENT_WARNING,
            raw_str(raw, PARAM_NO_ENGAGEMENT_WARNING),
        );
        if let Some(boxes) = raw.get(PARAM_TEXT_BOXES) {
            params.insert(PARAM_TEXT_BOXES, encode_json(boxes));
        }
        if let Some(uri) = image_uri {
            params.insert(PARAM_IMAGE_URI, uri);
        }
        params.insert(PARAM_FINAL_PREDICTION, raw_str(raw, PARAM_FINAL_PREDICTION).trim());
        if let Some(links) = raw.get(PARAM_SUGGESTED_LINKS).filter(|v| !v.is_null()) {
            params.insert(PARAM_SUGGESTED_LINKS, encode_field(links));
        }
        params
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key, value);
        }
        params
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }

    /// Replaces an existing key in place, keeping its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required params that are absent or do not parse.
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_PARAMS
            .iter()
            .filter(|key| !self.required_ok(key))
            .map(|key| (*key).to_string())
            .collect()
    }

    fn required_ok(&self, key: &str) -> bool {
        let Some(value) = self.get(key) else {
            return false;
        };
        match key {
            PARAM_REAL | PARAM_FAKE => value
                .trim()
                .parse::<f64>()
                .is_ok_and(f64::is_finite),
            PARAM_ANALYTICS => matches!(serde_json::from_str::<Value>(value), Ok(Value::Object(_))),
            PARAM_FINAL_PREDICTION => !value.trim().is_empty(),
            _ => true,
        }
    }

    /// Rebuilds the raw payload shape so the normalizer applies the same
    /// defaults on both sides of the hand-off.
    fn to_raw(&self) -> Value {
        let mut raw = Map::new();
        for (key, value) in &self.entries {
            let value = if key == PARAM_TEXT_BOXES {
                serde_json::from_str(value).unwrap_or(Value::Null)
            } else {
                Value::String(value.clone())
            };
            raw.insert(key.clone(), value);
        }
        Value::Object(raw)
    }
}

fn encode_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!(error = %e, "could not encode navigation parameter");
        String::new()
    })
}

/// Strings pass through untouched; anything else is JSON-encoded.
fn encode_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => encode_json(other),
    }
}

fn raw_str<'a>(raw: &'a Value, key: &str) -> &'a str {
    raw.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatBox {
    Real,
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    Adjustment,
    NoEngagement,
    ServiceNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub text: String,
}

/// A loaded result plus the display decisions derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultView {
    pub result: DetectionResult,
    pub image_uri: Option<String>,
    pub verdict_color: ColorRole,
    pub highlighted: Option<StatBox>,
    pub warnings: Vec<Warning>,
    pub suggested_link: Option<SuggestedLink>,
}

impl ResultView {
    pub fn derive(result: DetectionResult, image_uri: Option<String>) -> Self {
        let warnings = [
            (WarningKind::Adjustment, &result.adjustment_reason),
            (WarningKind::NoEngagement, &result.engagement_warning),
            (WarningKind::ServiceNote, &result.message),
        ]
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(kind, text)| Warning {
            kind,
            text: text.clone(),
        })
        .collect();

        let suggested_link = if result.suggested_link.is_empty() {
            None
        } else {
            let label = result
                .suggested_links
                .iter()
                .find(|l| l.link.trim() == result.suggested_link)
                .map(|l| l.label.clone())
                .unwrap_or_default();
            Some(SuggestedLink {
                link: result.suggested_link.clone(),
                label,
            })
        };

        Self {
            verdict_color: verdict_color(result.verdict),
            highlighted: highlighted_box(&result),
            warnings,
            suggested_link,
            image_uri: image_uri.filter(|uri| !uri.is_empty()),
            result,
        }
    }
}

pub fn verdict_color(verdict: Verdict) -> ColorRole {
    match verdict {
        Verdict::Real => ColorRole::SuccessGreen,
        Verdict::Fake => ColorRole::Danger,
        Verdict::Unknown => ColorRole::BoxNeutral,
    }
}

/// The verdict's box, or for an unknown verdict the larger percentage.
/// A tie highlights nothing.
pub fn highlighted_box(result: &DetectionResult) -> Option<StatBox> {
    match result.verdict {
        Verdict::Real => Some(StatBox::Real),
        Verdict::Fake => Some(StatBox::Fake),
        Verdict::Unknown => match result.real_pct.partial_cmp(&result.fake_pct) {
            Some(std::cmp::Ordering::Greater) => Some(StatBox::Real),
            Some(std::cmp::Ordering::Less) => Some(StatBox::Fake),
            _ => None,
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ResultController {
    #[default]
    Empty,
    Populated(Box<ResultView>),
    PartiallyPopulated {
        view: Box<ResultView>,
        missing: Vec<String>,
    },
}

impl ResultController {
    /// Consumes navigation params. Always yields a renderable view; missing
    /// required params only change which state it lands in.
    pub fn load(&mut self, params: &NavParams) {
        let missing = params.missing_required();
        let result = normalize(&params.to_raw());
        let view = Box::new(ResultView::derive(
            result,
            params.get(PARAM_IMAGE_URI).map(str::to_owned),
        ));

        *self = if missing.is_empty() {
            ResultController::Populated(view)
        } else {
            debug!(?missing, "result params incomplete; rendering defaults");
            ResultController::PartiallyPopulated { view, missing }
        };
    }

    pub fn clear(&mut self) {
        *self = ResultController::Empty;
    }

    pub fn view(&self) -> Option<&ResultView> {
        match self {
            ResultController::Empty => None,
            ResultController::Populated(view)
            | ResultController::PartiallyPopulated { view, .. } => Some(view),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResultController::Empty)
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            ResultController::Empty => "empty",
            ResultController::Populated(_) => "populated",
            ResultController::PartiallyPopulated { .. } => "partially_populated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Analytics;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "real": 12.5,
            "fake": 87.5,
            "final_prediction": "fake",
            "extractedText": "DepEd suspends all classes nationwide",
            "message": "Low OCR confidence",
            "adjustment_reason": "Sensational phrasing",
            "no_engagement_warning": "",
            "analytics": {
                "suspicious_words": 2,
                "informal_words": 1,
                "malicious_words": 0,
                "inconsistency_score": 0.4375,
                "suspicious_word_list": ["suspends", "nationwide"],
                "informal_word_list": ["omg"]
            },
            "textBoxes": [{"x": 1, "y": 2, "w": 30, "h": 8}],
            "suggested_links": [{"link": "https://www.deped.gov.ph/memo", "label": "DepEd memo"}]
        })
    }

    #[test]
    fn starts_empty() {
        let controller = ResultController::default();
        assert!(controller.is_empty());
        assert!(controller.view().is_none());
    }

    #[test]
    fn full_params_populate() {
        let params = NavParams::from_payload(&full_payload(), Some("file:///picked/2.jpg"));
        let mut controller = ResultController::default();
        controller.load(&params);

        let ResultController::Populated(view) = &controller else {
            panic!("expected populated, got {}", controller.state_name());
        };
        assert_eq!(view.result.verdict, Verdict::Fake);
        assert_eq!(view.result.real_display(), "12.50");
        assert_eq!(view.verdict_color, ColorRole::Danger);
        assert_eq!(view.highlighted, Some(StatBox::Fake));
        assert_eq!(view.image_uri.as_deref(), Some("file:///picked/2.jpg"));
        assert_eq!(view.result.text_boxes, json!([{"x": 1, "y": 2, "w": 30, "h": 8}]));
        assert_eq!(
            view.suggested_link,
            Some(SuggestedLink {
                link: "https://www.deped.gov.ph/memo".into(),
                label: "DepEd memo".into()
            })
        );
    }

    #[test]
    fn analytics_survive_hand_off_exactly() {
        let original = normalize(&full_payload());
        let params = NavParams::from_payload(&full_payload(), None);
        let mut controller = ResultController::default();
        controller.load(&params);

        let view = controller.view().unwrap();
        assert_eq!(view.result.analytics, original.analytics);
        assert_eq!(
            view.result.analytics.suspicious_word_list,
            vec!["suspends".to_string(), "nationwide".to_string()]
        );
    }

    #[test]
    fn only_non_empty_warnings_show() {
        let view = ResultView::derive(normalize(&full_payload()), None);
        let kinds: Vec<WarningKind> = view.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::Adjustment, WarningKind::ServiceNote]);
    }

    #[test]
    fn missing_required_params_partially_populate() {
        let params = NavParams::from_pairs([("real", "70.00"), ("extractedText", "hello")]);
        let mut controller = ResultController::default();
        controller.load(&params);

        let ResultController::PartiallyPopulated { view, missing } = &controller else {
            panic!("expected partial, got {}", controller.state_name());
        };
        assert_eq!(missing, &vec!["fake", "analytics", "final_prediction"]);
        assert_eq!(view.result.real_pct, 70.0);
        assert_eq!(view.result.fake_pct, 0.0);
        assert_eq!(view.result.analytics, Analytics::default());
        assert_eq!(view.result.verdict, Verdict::Unknown);
        assert_eq!(view.highlighted, Some(StatBox::Real));
    }

    #[test]
    fn unparseable_required_param_counts_as_missing() {
        let mut params = NavParams::from_payload(&full_payload(), None);
        params.insert(PARAM_ANALYTICS, "undefined");
        params.insert(PARAM_REAL, "abc");
        assert_eq!(params.missing_required(), vec!["real", "analytics"]);
    }

    #[test]
    fn unknown_verdict_tie_highlights_nothing() {
        let result = normalize(&json!({"real": 50, "fake": 50, "final_prediction": "maybe"}));
        assert_eq!(highlighted_box(&result), None);
        assert_eq!(verdict_color(result.verdict), ColorRole::BoxNeutral);
    }

    #[test]
    fn keyword_link_is_rebuilt_on_the_result_side() {
        let raw = json!({
            "real": 82.5,
            "fake": 17.5,
            "final_prediction": "Real",
            "extractedText": "CHED announces new guidelines"
        });
        let mut controller = ResultController::default();
        controller.load(&NavParams::from_payload(&raw, None));
        let link = controller.view().and_then(|v| v.suggested_link.clone());
        assert_eq!(link.map(|l| l.link).as_deref(), Some("https://ched.gov.ph"));
    }

    #[test]
    fn payload_without_verdict_or_analytics_hands_off_blank() {
        let params = NavParams::from_payload(&json!({"real": 10, "fake": "90.456"}), None);
        assert_eq!(params.get(PARAM_REAL), Some("10.00"));
        assert_eq!(params.get(PARAM_FAKE), Some("90.46"));
        assert_eq!(params.get(PARAM_FINAL_PREDICTION), Some(""));
        assert_eq!(params.get(PARAM_ANALYTICS), None);
        assert_eq!(params.missing_required(), vec!["analytics", "final_prediction"]);

        let mut controller = ResultController::default();
        controller.load(&params);
        assert_eq!(controller.state_name(), "partially_populated");
        assert_eq!(controller.view().map(|v| v.result.extracted_text.as_str()), Some("No text detected"));
    }

    #[test]
    fn encoded_analytics_pass_through_untouched() {
        let encoded = r#"{"suspicious_words": 3, "inconsistency_score": 0.75}"#;
        let params = NavParams::from_payload(
            &json!({"final_prediction": " fake ", "analytics": encoded}),
            None,
        );
        assert_eq!(params.get(PARAM_ANALYTICS), Some(encoded));
        assert_eq!(params.get(PARAM_FINAL_PREDICTION), Some("fake"));
    }

    #[test]
    fn pairs_keep_order_and_replace_in_place() {
        let mut params = NavParams::from_pairs([("real", "1"), ("fake", "2")]);
        params.insert("real", "3");
        params.insert("imageUri", "file:///a.jpg");
        assert_eq!(
            params.to_pairs(),
            vec![
                ("real".to_string(), "3".to_string()),
                ("fake".to_string(), "2".to_string()),
                ("imageUri".to_string(), "file:///a.jpg".to_string()),
            ]
        );
        assert_eq!(NavParams::from_pairs(params.to_pairs()), params);
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut controller = ResultController::default();
        controller.load(&NavParams::from_payload(&full_payload(), None));
        controller.clear();
        assert!(controller.is_empty());
    }
}
