//! Today's detection totals and the trend charts derived from them.
//!
//! The service only reports totals. The hourly, weekly and monthly series
//! are a presentational spread of those totals, not measured history.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, instrument, warn};

use crate::capabilities::{HttpRequest, HttpResponse, HttpResult};
use crate::config::ServiceConfig;
use crate::{AppResult, ANALYTICS_TODAY_PATH};

/// Chart points never exceed this, whatever the totals.
pub const TREND_CAP: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub real: u64,
    #[serde(default)]
    pub fake: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Unexpected response format.")]
    UnexpectedFormat,

    #[error("Failed to load analytics: {0}")]
    Load(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub title: String,
    pub labels: Vec<String>,
    pub real: Vec<u64>,
    pub fake: Vec<u64>,
    pub summary_label: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryState {
    pub loading: bool,
    pub summary: Option<DailySummary>,
    pub trends: Vec<TrendSeries>,
    pub error: Option<String>,
}

impl SummaryState {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn finish<R: Rng + ?Sized>(&mut self, result: Result<DailySummary, SummaryError>, rng: &mut R) {
        self.loading = false;
        match result {
            Ok(summary) => {
                self.trends = trends(&summary, rng);
                self.summary = Some(summary);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }
}

#[instrument(skip_all)]
pub fn build_request(config: &ServiceConfig) -> AppResult<HttpRequest> {
    let request = HttpRequest::get(config.endpoint(ANALYTICS_TODAY_PATH)?)
        .with_header("Accept", "application/json")?
        .with_timeout(config.summary_timeout())?;
    Ok(request)
}

pub fn parse(result: HttpResult) -> Result<DailySummary, SummaryError> {
    let response: HttpResponse = result.map_err(|e| {
        error!(error = %e, "daily summary request failed");
        SummaryError::Load(e.to_string())
    })?;

    if !response.is_json() {
        warn!(
            status = response.status(),
            body = %String::from_utf8_lossy(response.body()),
            "daily summary is not JSON"
        );
        return Err(SummaryError::UnexpectedFormat);
    }

    response
        .json::<DailySummary>()
        .map_err(|e| SummaryError::Load(e.to_string()))
}

/// Spreads `total` over `points` buckets: an even base, with the
/// remainder added one at a time to random buckets. Each point is capped
/// at [`TREND_CAP`].
pub fn spread<R: Rng + ?Sized>(total: u64, points: usize, rng: &mut R) -> Vec<u64> {
    if points == 0 {
        return Vec::new();
    }
    let n = u64::try_from(points).unwrap_or(u64::MAX);
    let base = total / n;
    let mut trend = vec![base; points];
    for _ in 0..(total % n) {
        trend[rng.gen_range(0..points)] += 1;
    }
    trend.into_iter().map(|v| v.min(TREND_CAP)).collect()
}

fn series<R: Rng + ?Sized>(
    summary: &DailySummary,
    title: &str,
    labels: &[&str],
    summary_label: String,
    caption: &str,
    rng: &mut R,
) -> TrendSeries {
    TrendSeries {
        title: title.to_string(),
        labels: labels.iter().map(|l| (*l).to_string()).collect(),
        real: spread(summary.real, labels.len(), rng),
        fake: spread(summary.fake, labels.len(), rng),
        summary_label,
        caption: caption.to_string(),
    }
}

pub fn trends<R: Rng + ?Sized>(summary: &DailySummary, rng: &mut R) -> Vec<TrendSeries> {
    vec![
        series(
            summary,
            "Today's Detection Trend (Hourly)",
            &["8AM", "10AM", "12PM", "2PM", "4PM", "6PM"],
            format!("Real: {} | Fake: {}", summary.real, summary.fake),
            "This chart shows how many fake and real detections were recorded today.",
            rng,
        ),
        series(
            summary,
            "Weekly Detection Trend",
            &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            "Real and Fake detections per day this week.".to_string(),
            "See if fake news increases during the weekdays.",
            rng,
        ),
        series(
            summary,
            "Monthly Detection Trend",
            &["Week 1", "Week 2", "Week 3", "Week 4"],
            "Weekly detection counts this month.".to_string(),
            "Useful for tracking monthly trends.",
            rng,
        ),
    ]
}
