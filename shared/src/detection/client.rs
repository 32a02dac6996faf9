//! Outbound detection request and classification of what comes back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::capabilities::{BlobRef, FormPart, HttpRequest, HttpResult, MultipartForm};
use crate::config::ServiceConfig;
use crate::{
    AppResult, DEFAULT_REJECTION_MESSAGE, IMAGE_FIELD_NAME, IMAGE_UPLOAD_FILENAME,
    IMAGE_UPLOAD_MIME, PREDICT_IMAGE_PATH,
};

/// A locally selected image, as handed over by the shell's picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    pub uri: String,
    pub size_bytes: Option<u64>,
}

impl ImageHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            size_bytes: None,
        }
    }

    fn blob(&self) -> BlobRef {
        BlobRef {
            uri: self.uri.clone(),
            size_bytes: self.size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionRequest {
    Image(ImageHandle),
    /// Plain text against the deprecated `/predict/text` endpoint.
    #[cfg(feature = "legacy-text")]
    Text(String),
}

impl DetectionRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionRequest::Image(_) => "image",
            #[cfg(feature = "legacy-text")]
            DetectionRequest::Text(_) => "text",
        }
    }

    #[instrument(skip_all, fields(kind = self.kind()))]
    pub fn build(&self, config: &ServiceConfig) -> AppResult<HttpRequest> {
        let request = match self {
            DetectionRequest::Image(image) => {
                let form = MultipartForm::new().part(FormPart::file(
                    IMAGE_FIELD_NAME,
                    IMAGE_UPLOAD_FILENAME,
                    IMAGE_UPLOAD_MIME,
                    image.blob(),
                ));
                HttpRequest::post(config.endpoint(PREDICT_IMAGE_PATH)?).with_multipart(form)?
            }
            #[cfg(feature = "legacy-text")]
            DetectionRequest::Text(text) => {
                HttpRequest::post(config.endpoint(crate::PREDICT_TEXT_PATH)?)
                    .with_json(&serde_json::json!({ "text": text }))?
            }
        };
        Ok(request.with_timeout(config.detection_timeout())?)
    }
}

/// Result of one detection attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Any JSON body other than a 400. Still raw; see `normalize`.
    Success(Value),
    /// HTTP 400: the image is outside the service's subject domain.
    Rejected(String),
    /// No usable response at all.
    Failed(String),
}

pub fn classify(result: HttpResult) -> Outcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "detection request failed");
            return Outcome::Failed(e.to_string());
        }
    };

    if response.status() == 400 {
        let reason = serde_json::from_slice::<Value>(response.body())
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_owned))
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
        info!(request_id = response.request_id(), %reason, "image rejected as out of scope");
        return Outcome::Rejected(reason);
    }

    match serde_json::from_slice::<Value>(response.body()) {
        Ok(raw) => {
            if !response.is_success() {
                warn!(
                    status = response.status(),
                    request_id = response.request_id(),
                    "treating non-2xx JSON response as a detection result"
                );
            }
            Outcome::Success(raw)
        }
        Err(e) => {
            error!(
                status = response.status(),
                request_id = response.request_id(),
                error = %e,
                "detection response is not JSON"
            );
            Outcome::Failed(format!(
                "unexpected response format (HTTP {}): {e}",
                response.status()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{HttpBody, HttpError, HttpHeaders, HttpMethod, HttpResponse};
    use crate::ErrorKind;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResult {
        Ok(HttpResponse::new(
            status,
            HttpHeaders::new(),
            body.as_bytes().to_vec(),
            "req-1".into(),
        ))
    }

    #[test]
    fn image_request_is_single_multipart_part() {
        let config = ServiceConfig::with_base_url("http://192.168.68.116:5000");
        let request = DetectionRequest::Image(ImageHandle::new("file:///picked/1.jpg"))
            .build(&config)
            .unwrap();

        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.url().as_str(), "http://192.168.68.116:5000/predict/image");
        assert_eq!(request.timeout_ms(), config.detection_timeout_ms);

        let Some(HttpBody::Multipart(form)) = request.body() else {
            panic!("expected multipart body, got {:?}", request.body());
        };
        assert_eq!(form.parts().len(), 1);
        let part = &form.parts()[0];
        assert_eq!(part.name, "image");
        assert_eq!(part.filename, "upload.jpg");
        assert_eq!(part.content_type, "image/jpeg");
        assert_eq!(part.blob.uri, "file:///picked/1.jpg");
        assert_eq!(
            request.headers().get("Content-Type"),
            Some(form.content_type().as_str())
        );
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let config = ServiceConfig::with_base_url("not a url");
        let err = DetectionRequest::Image(ImageHandle::new("file:///x.jpg"))
            .build(&config)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn success_for_2xx_json() {
        let outcome = classify(response(200, r#"{"real": 82.5, "fake": 17.5}"#));
        assert_eq!(outcome, Outcome::Success(json!({"real": 82.5, "fake": 17.5})));
    }

    #[test]
    fn success_for_non_2xx_json_other_than_400() {
        let outcome = classify(response(500, r#"{"error": "model not loaded"}"#));
        assert!(matches!(outcome, Outcome::Success(_)));
    }

    #[test]
    fn rejected_carries_exact_service_reason() {
        let outcome = classify(response(400, r#"{"error": "not education related"}"#));
        assert_eq!(outcome, Outcome::Rejected("not education related".into()));
    }

    #[test]
    fn rejected_without_reason_uses_default() {
        assert_eq!(
            classify(response(400, "{}")),
            Outcome::Rejected(DEFAULT_REJECTION_MESSAGE.into())
        );
        assert_eq!(
            classify(response(400, "<html>Bad Request</html>")),
            Outcome::Rejected(DEFAULT_REJECTION_MESSAGE.into())
        );
    }

    #[test]
    fn non_json_body_is_failure() {
        let outcome = classify(response(200, "<html>502 Bad Gateway</html>"));
        assert!(matches!(outcome, Outcome::Failed(msg) if msg.contains("unexpected response format")));
    }

    #[test]
    fn transport_error_is_failure() {
        let outcome = classify(Err(HttpError::Timeout {
            timeout_ms: 60_000,
            request_id: "req-2".into(),
        }));
        assert!(matches!(outcome, Outcome::Failed(msg) if msg.contains("timeout")));
    }

    #[cfg(feature = "legacy-text")]
    #[test]
    fn text_request_posts_json() {
        let config = ServiceConfig::default();
        let request = DetectionRequest::Text("DepEd cancels classes".into())
            .build(&config)
            .unwrap();
        assert!(request.url().as_str().ends_with("/predict/text"));
        assert_eq!(request.headers().get("content-type"), Some("application/json"));
        let Some(HttpBody::Bytes(body)) = request.body() else {
            panic!("expected JSON body");
        };
        let body: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(body, json!({"text": "DepEd cancels classes"}));
    }
}
