//! Side effects the shell performs on behalf of the core.

mod http;

pub use self::http::{
    BlobRef, FormPart, Http, HttpBody, HttpError, HttpHeaders, HttpMethod, HttpOperation,
    HttpRequest, HttpResponse, HttpResult, MultipartForm, ValidatedUrl, MAX_TIMEOUT_MS,
};

// Crux's built-in Render capability covers view updates as-is.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
