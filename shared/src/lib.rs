//! Shared core for the CatchEd scanner.
//!
//! The platform shells (iOS, Android, Web) own the camera roll, the screens
//! and the network stack. This crate owns everything in between: submitting
//! an image to the inference service, classifying and normalizing what
//! comes back, and the state the result screens render from.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod detection;
pub mod event;
pub mod model;
pub mod presentation;
pub mod summary;
pub mod theme;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::{Alert, AlertKind, App, Confirmation, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use config::ServiceConfig;
pub use crux_core::App as CruxApp;
pub use event::Event;
pub use model::{Model, ResultStore, Screen};

pub const PREDICT_IMAGE_PATH: &str = "/predict/image";
#[cfg(feature = "legacy-text")]
pub const PREDICT_TEXT_PATH: &str = "/predict/text";
pub const ANALYTICS_TODAY_PATH: &str = "/analytics/today";

pub const IMAGE_FIELD_NAME: &str = "image";
pub const IMAGE_UPLOAD_FILENAME: &str = "upload.jpg";
pub const IMAGE_UPLOAD_MIME: &str = "image/jpeg";

pub const NO_TEXT_DETECTED: &str = "No text detected";
pub const DEFAULT_REJECTION_MESSAGE: &str = "This image is not related to education.";
pub const DETECTION_FAILED_MESSAGE: &str = "Failed to detect image.";
pub const NO_IMAGE_SELECTED_MESSAGE: &str = "Please select an image.";
#[cfg(feature = "legacy-text")]
pub const NO_TEXT_ENTERED_MESSAGE: &str = "Please enter some text.";
pub const PERMISSION_DENIED_MESSAGE: &str = "Please grant permission to access photos.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Submit without a selected image (or empty text in legacy mode).
    Validation,
    /// The service answered 400: the image is outside its subject domain.
    DomainRejection,
    /// Network error, timeout, or a body that is not JSON.
    Transport,
    /// The nested analytics document could not be parsed.
    MalformedAnalytics,
    Configuration,
    PermissionDenied,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::DomainRejection => "OUT_OF_SCOPE",
            Self::Transport => "TRANSPORT_ERROR",
            Self::MalformedAnalytics => "MALFORMED_ANALYTICS",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::PermissionDenied => "PERMISSION_DENIED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation | ErrorKind::DomainRejection => self.message.clone(),
            ErrorKind::Transport => DETECTION_FAILED_MESSAGE.into(),
            ErrorKind::MalformedAnalytics => {
                "Detailed analytics are unavailable for this result.".into()
            }
            ErrorKind::Configuration => {
                "The scanner service address is not valid. Please check the app settings.".into()
            }
            ErrorKind::PermissionDenied => PERMISSION_DENIED_MESSAGE.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<capabilities::HttpError> for AppError {
    fn from(e: capabilities::HttpError) -> Self {
        AppError::new(ErrorKind::Transport, DETECTION_FAILED_MESSAGE).with_internal(e.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
