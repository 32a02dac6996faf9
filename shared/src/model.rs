use serde::{Deserialize, Serialize};

use crate::app::{Alert, Confirmation};
use crate::config::ServiceConfig;
use crate::detection::ImageHandle;
use crate::presentation::ResultController;
use crate::summary::SummaryState;

/// Process-wide result state shared by every screen.
///
/// Only two mutations touch the availability flag, and both are
/// idempotent: [`ResultStore::mark_result_available`] and
/// [`ResultStore::reset`]. The dark-mode preference is independent of
/// both and survives a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultStore {
    result_available: bool,
    image_uri: Option<String>,
    dark_mode: bool,
}

impl ResultStore {
    pub fn mark_result_available(&mut self, image_uri: Option<String>) {
        self.result_available = true;
        self.image_uri = image_uri;
    }

    pub fn reset(&mut self) {
        self.result_available = false;
        self.image_uri = None;
    }

    pub fn result_available(&self) -> bool {
        self.result_available
    }

    pub fn image_uri(&self) -> Option<&str> {
        self.image_uri.as_deref()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Capture,
    Result,
    Summary,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Capture => "capture",
            Screen::Result => "result",
            Screen::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureState {
    pub selected_image: Option<ImageHandle>,
    /// Cycle id of the outstanding detection request. `Some` means busy.
    pub in_flight: Option<u64>,
    /// Image URI the outstanding request was built from.
    pub submitted_uri: Option<String>,
    next_cycle: u64,
}

impl CaptureState {
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Marks a new request outstanding and returns its cycle id.
    pub fn begin_cycle(&mut self, submitted_uri: Option<String>) -> u64 {
        self.next_cycle = self.next_cycle.wrapping_add(1);
        self.in_flight = Some(self.next_cycle);
        self.submitted_uri = submitted_uri;
        self.next_cycle
    }

    /// Forgets the outstanding request. Its response will not match.
    pub fn abandon_cycle(&mut self) {
        self.in_flight = None;
        self.submitted_uri = None;
    }

    /// Clears the busy flag if `cycle` is the outstanding one.
    pub fn finish_cycle(&mut self, cycle: u64) -> bool {
        if self.in_flight == Some(cycle) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub config: ServiceConfig,
    pub store: ResultStore,
    pub screen: Screen,
    pub capture: CaptureState,
    pub result: ResultController,
    pub summary: SummaryState,

    pub alert: Option<Alert>,
    pub confirmation: Option<Confirmation>,
}
