use serde::{Deserialize, Serialize};

use crate::capabilities::HttpResult;
use crate::config::ServiceConfig;
use crate::detection::ImageHandle;
use crate::model::Screen;
use crate::presentation::NavParams;

// Capability responses are boxed to keep the enum small.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Configure(ServiceConfig),

    // Capture
    ImageSelected(ImageHandle),
    ImageCleared,
    MediaPermissionDenied,
    AnalyzeRequested,
    #[cfg(feature = "legacy-text")]
    AnalyzeTextRequested {
        text: String,
    },
    DetectionResponded {
        cycle: u64,
        result: Box<HttpResult>,
    },

    AlertDismissed,

    // Result
    ScanAnotherRequested,
    ScanAnotherConfirmed,
    ScanAnotherCancelled,
    ResultRouteOpened(NavParams),

    NavigateTo(Screen),
    DarkModeToggled,
    DarkModeSet(bool),

    // Daily summary
    SummaryRequested,
    SummaryResponded(Box<HttpResult>),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Configure(_) => "configure",
            Event::ImageSelected(_) => "image_selected",
            Event::ImageCleared => "image_cleared",
            Event::MediaPermissionDenied => "media_permission_denied",
            Event::AnalyzeRequested => "analyze_requested",
            #[cfg(feature = "legacy-text")]
            Event::AnalyzeTextRequested { .. } => "analyze_text_requested",
            Event::DetectionResponded { .. } => "detection_responded",
            Event::AlertDismissed => "alert_dismissed",
            Event::ScanAnotherRequested => "scan_another_requested",
            Event::ScanAnotherConfirmed => "scan_another_confirmed",
            Event::ScanAnotherCancelled => "scan_another_cancelled",
            Event::ResultRouteOpened(_) => "result_route_opened",
            Event::NavigateTo(_) => "navigate_to",
            Event::DarkModeToggled => "dark_mode_toggled",
            Event::DarkModeSet(_) => "dark_mode_set",
            Event::SummaryRequested => "summary_requested",
            Event::SummaryResponded(_) => "summary_responded",
        }
    }

    /// Events that come from a user gesture rather than a capability.
    pub fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Event::Configure(_) | Event::DetectionResponded { .. } | Event::SummaryResponded(_)
        )
    }
}
