//! Talking to the inference service and making sense of its answers.

pub mod client;
pub mod normalize;
pub mod sources;

pub use client::{classify, DetectionRequest, ImageHandle, Outcome};
pub use normalize::{format_pct, normalize, Analytics, DetectionResult, SuggestedLink, Verdict};
pub use sources::{match_source, CREDIBLE_SOURCES};
