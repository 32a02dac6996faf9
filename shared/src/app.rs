//! The Crux app: one `update` for every event, one `view` for the shell.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, HttpResult};
use crate::detection::{classify, Analytics, DetectionRequest, Outcome, SuggestedLink};
use crate::event::Event;
use crate::model::{Model, Screen};
use crate::presentation::{NavParams, StatBox, Warning};
use crate::summary::{self, DailySummary, SummaryError, TrendSeries};
use crate::theme::{ColorRole, Palette};
use crate::{
    AppError, ErrorKind, DETECTION_FAILED_MESSAGE, NO_IMAGE_SELECTED_MESSAGE,
    PERMISSION_DENIED_MESSAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    Error,
    OutOfScope,
    PermissionDenied,
}

impl AlertKind {
    pub fn title(self) -> &'static str {
        match self {
            AlertKind::Error => "Error",
            AlertKind::OutOfScope => "Out of Scope",
            AlertKind::PermissionDenied => "Permission Denied",
        }
    }
}

/// A one-button dialog the shell shows until `AlertDismissed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub code: String,
    pub title: String,
    pub message: String,
}

impl From<&AppError> for Alert {
    fn from(error: &AppError) -> Self {
        let kind = match error.kind {
            ErrorKind::DomainRejection => AlertKind::OutOfScope,
            ErrorKind::PermissionDenied => AlertKind::PermissionDenied,
            ErrorKind::Validation
            | ErrorKind::Transport
            | ErrorKind::MalformedAnalytics
            | ErrorKind::Configuration => AlertKind::Error,
        };
        Self {
            kind,
            code: error.code().to_string(),
            title: kind.title().to_string(),
            message: error.user_facing_message(),
        }
    }
}

/// Two-button dialogs. Only one exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    ScanAnother,
}

impl Confirmation {
    pub fn title(self) -> &'static str {
        match self {
            Confirmation::ScanAnother => "Scan Another News",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Confirmation::ScanAnother => {
                "Are you sure you want to scan a new news article? This will clear the current results."
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationView {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureView {
    pub selected_image_uri: Option<String>,
    pub is_analyzing: bool,
    pub can_analyze: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResultScreenView {
    /// `populated` or `partially_populated`.
    pub state: String,
    pub verdict: String,
    pub verdict_color: String,
    pub real: String,
    pub fake: String,
    pub highlighted: Option<StatBox>,
    pub extracted_text: String,
    pub analytics: Analytics,
    /// Sum of the three word counts.
    pub flagged_words: u32,
    pub warnings: Vec<Warning>,
    pub warning_color: String,
    pub suggested_link: Option<SuggestedLink>,
    pub link_color: String,
    pub image_uri: Option<String>,
    pub text_boxes: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryView {
    pub loading: bool,
    pub summary: Option<DailySummary>,
    pub trends: Vec<TrendSeries>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub dark_mode: bool,
    pub background_color: String,
    pub text_color: String,
    pub result_available: bool,
    pub capture: CaptureView,
    pub result: Option<ResultScreenView>,
    pub summary: SummaryView,
    pub alert: Option<Alert>,
    pub confirmation: Option<ConfirmationView>,
}

#[derive(Default)]
pub struct App;

impl App {
    fn show_error(model: &mut Model, error: &AppError) {
        warn!(code = error.code(), error = %error, "showing alert");
        model.alert = Some(Alert::from(error));
    }

    /// Issues one detection request, or nothing if it cannot be built.
    fn submit(request: &DetectionRequest, model: &mut Model, caps: &Capabilities) {
        let http_request = match request.build(&model.config) {
            Ok(r) => r,
            Err(e) => {
                Self::show_error(model, &e);
                return;
            }
        };

        let submitted_uri = match request {
            DetectionRequest::Image(image) => Some(image.uri.clone()),
            #[cfg(feature = "legacy-text")]
            DetectionRequest::Text(_) => None,
        };
        let cycle = model.capture.begin_cycle(submitted_uri);
        info!(
            cycle,
            kind = request.kind(),
            request_id = http_request.request_id(),
            "detection request sent"
        );

        caps.http.execute(http_request, move |result| Event::DetectionResponded {
            cycle,
            result: Box::new(result),
        });
    }

    fn handle_detection_response(
        cycle: u64,
        result: HttpResult,
        model: &mut Model,
    ) {
        if !model.capture.finish_cycle(cycle) {
            warn!(cycle, outstanding = ?model.capture.in_flight, "discarding stale detection response");
            return;
        }
        let submitted_uri = model.capture.submitted_uri.take();

        if model.screen != Screen::Capture {
            warn!(
                cycle,
                screen = model.screen.as_str(),
                "detection response arrived after leaving capture; discarding"
            );
            return;
        }

        match classify(result) {
            Outcome::Success(raw) => {
                let params = NavParams::from_payload(&raw, submitted_uri.as_deref());
                model.result.load(&params);
                model.store.mark_result_available(submitted_uri);
                model.capture.selected_image = None;
                model.screen = Screen::Result;
                info!(
                    cycle,
                    verdict = model.result.view().map_or("", |v| v.result.verdict.label()),
                    state = model.result.state_name(),
                    "detection result published"
                );
            }
            Outcome::Rejected(reason) => {
                Self::show_error(model, &AppError::new(ErrorKind::DomainRejection, reason));
            }
            Outcome::Failed(reason) => {
                let error = AppError::new(ErrorKind::Transport, DETECTION_FAILED_MESSAGE)
                    .with_internal(reason)
                    .with_context("cycle", cycle.to_string());
                Self::show_error(model, &error);
            }
        }
    }

    fn request_summary(model: &mut Model, caps: &Capabilities) {
        if model.summary.loading {
            debug!("summary already loading");
            return;
        }
        match summary::build_request(&model.config) {
            Ok(request) => {
                model.summary.begin();
                caps.http
                    .execute(request, |result| Event::SummaryResponded(Box::new(result)));
            }
            Err(e) => {
                warn!(error = %e, "could not build summary request");
                model.summary.finish(
                    Err(SummaryError::Load(e.user_facing_message())),
                    &mut StdRng::from_entropy(),
                );
            }
        }
    }

    fn navigate(screen: Screen, model: &mut Model, caps: &Capabilities) {
        match screen {
            Screen::Result if !model.store.result_available() => {
                debug!("no result available; staying on {}", model.screen.as_str());
            }
            Screen::Summary => {
                model.screen = Screen::Summary;
                Self::request_summary(model, caps);
            }
            other => model.screen = other,
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let _span = tracing::debug_span!("update", event = event.name()).entered();
        if event.is_user_initiated() {
            debug!(screen = model.screen.as_str(), "user action");
        }

        match event {
            Event::Configure(config) => match config.validate() {
                Ok(()) => {
                    info!(base_url = %config.base_url, "service configured");
                    model.config = config;
                }
                Err(e) => {
                    warn!(error = %e, "rejected service configuration; keeping previous");
                    Self::show_error(model, &AppError::from(e));
                }
            },

            Event::ImageSelected(image) => {
                model.capture.selected_image = Some(image);
            }

            Event::ImageCleared => {
                model.capture.selected_image = None;
            }

            Event::MediaPermissionDenied => {
                Self::show_error(
                    model,
                    &AppError::new(ErrorKind::PermissionDenied, PERMISSION_DENIED_MESSAGE),
                );
            }

            Event::AnalyzeRequested => {
                if model.screen != Screen::Capture {
                    debug!(screen = model.screen.as_str(), "analyze ignored off the capture screen");
                    return;
                }
                if model.capture.is_busy() {
                    debug!("analyze ignored; request in flight");
                    return;
                }
                match model.capture.selected_image.clone() {
                    Some(image) => Self::submit(&DetectionRequest::Image(image), model, caps),
                    None => Self::show_error(
                        model,
                        &AppError::new(ErrorKind::Validation, NO_IMAGE_SELECTED_MESSAGE),
                    ),
                }
            }

            #[cfg(feature = "legacy-text")]
            Event::AnalyzeTextRequested { text } => {
                if model.screen != Screen::Capture {
                    debug!(screen = model.screen.as_str(), "analyze ignored off the capture screen");
                    return;
                }
                if model.capture.is_busy() {
                    debug!("analyze ignored; request in flight");
                    return;
                }
                if text.trim().is_empty() {
                    Self::show_error(
                        model,
                        &AppError::new(ErrorKind::Validation, crate::NO_TEXT_ENTERED_MESSAGE),
                    );
                } else {
                    Self::submit(&DetectionRequest::Text(text), model, caps);
                }
            }

            Event::DetectionResponded { cycle, result } => {
                Self::handle_detection_response(cycle, *result, model);
            }

            Event::AlertDismissed => {
                model.alert = None;
            }

            Event::ScanAnotherRequested => {
                if model.screen == Screen::Result {
                    model.confirmation = Some(Confirmation::ScanAnother);
                } else {
                    debug!("scan another ignored outside the result screen");
                    return;
                }
            }

            Event::ScanAnotherConfirmed => {
                if model.confirmation != Some(Confirmation::ScanAnother) {
                    debug!("scan another confirmed without an open dialog");
                    return;
                }
                model.confirmation = None;
                model.store.reset();
                model.result.clear();
                model.capture.selected_image = None;
                model.capture.abandon_cycle();
                model.screen = Screen::Capture;
                info!("result cleared for a new scan");
            }

            Event::ScanAnotherCancelled => {
                model.confirmation = None;
            }

            Event::ResultRouteOpened(params) => {
                if !model.store.result_available() {
                    warn!(params = params.len(), "result route opened with no result available");
                    return;
                }
                model.result.load(&params);
                model.screen = Screen::Result;
            }

            Event::NavigateTo(screen) => Self::navigate(screen, model, caps),

            Event::DarkModeToggled => model.store.toggle_dark_mode(),

            Event::DarkModeSet(enabled) => model.store.set_dark_mode(enabled),

            Event::SummaryRequested => Self::request_summary(model, caps),

            Event::SummaryResponded(result) => {
                model
                    .summary
                    .finish(summary::parse(*result), &mut StdRng::from_entropy());
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let palette = Palette::for_mode(model.store.dark_mode());

        let result = model.result.view().map(|view| ResultScreenView {
            state: model.result.state_name().to_string(),
            verdict: view.result.verdict.label().to_string(),
            verdict_color: palette.resolve(view.verdict_color).to_string(),
            real: view.result.real_display(),
            fake: view.result.fake_display(),
            highlighted: view.highlighted,
            extracted_text: view.result.extracted_text.clone(),
            analytics: view.result.analytics.clone(),
            flagged_words: view.result.analytics.total_flagged(),
            warnings: view.warnings.clone(),
            warning_color: palette.resolve(ColorRole::Warning).to_string(),
            suggested_link: view.suggested_link.clone(),
            link_color: palette.resolve(ColorRole::LinkBlue).to_string(),
            image_uri: view.image_uri.clone(),
            text_boxes: view.result.text_boxes.clone(),
        });

        ViewModel {
            screen: model.screen,
            dark_mode: model.store.dark_mode(),
            background_color: palette.background.to_string(),
            text_color: palette.text.to_string(),
            result_available: model.store.result_available(),
            capture: CaptureView {
                selected_image_uri: model.capture.selected_image.as_ref().map(|i| i.uri.clone()),
                is_analyzing: model.capture.is_busy(),
                can_analyze: !model.capture.is_busy()
                    && model.capture.selected_image.is_some()
                    && model.screen == Screen::Capture,
            },
            result,
            summary: SummaryView {
                loading: model.summary.loading,
                summary: model.summary.summary,
                trends: model.summary.trends.clone(),
                error: model.summary.error.clone(),
            },
            alert: model.alert.clone(),
            confirmation: model.confirmation.map(|c| ConfirmationView {
                title: c.title().to_string(),
                message: c.message().to_string(),
                confirm_label: "Yes".to_string(),
                cancel_label: "Cancel".to_string(),
            }),
        }
    }
}
