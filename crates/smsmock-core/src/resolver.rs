//! Request parameter resolution
//!
//! Turns the raw key/value pairs of a query string or JSON body into a validated
//! [`MockupRequest`]. Only `sender` and `message` can fail; every other field
//! falls back to a default.

use std::collections::HashMap;

use crate::models::{clamp_quality, ImageFormat, MockupRequest, ResponseMode, DEFAULT_QUALITY};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

fn truthy(value: Option<&String>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("true") | Some("1")
    )
}

/// Response mode for a GET request: `html` wins over `download`.
pub fn mode_from_query(params: &HashMap<String, String>) -> ResponseMode {
    if truthy(params.get("html")) {
        ResponseMode::Html
    } else if truthy(params.get("download")) {
        ResponseMode::ImageBytes
    } else {
        ResponseMode::ImageInline
    }
}

/// Lenient quality parse. Unparseable input resolves to the default before clamping.
pub fn parse_quality(raw: Option<&str>) -> f32 {
    let quality = raw
        .and_then(|q| q.trim().parse::<f32>().ok())
        .unwrap_or(DEFAULT_QUALITY);
    clamp_quality(quality)
}

fn required(params: &HashMap<String, String>, field: &'static str) -> Result<String, ValidationError> {
    params
        .get(field)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or(ValidationError::MissingField(field))
}

pub fn resolve_mockup_request(
    params: &HashMap<String, String>,
    mode: ResponseMode,
) -> Result<MockupRequest, ValidationError> {
    let sender = required(params, "sender")?;
    let message = required(params, "message")?;

    let format = params
        .get("format")
        .map(|f| ImageFormat::parse_lenient(f))
        .unwrap_or_default();
    let quality = parse_quality(params.get("quality").map(String::as_str));

    let mut request = MockupRequest::new(sender, message)
        .ok_or(ValidationError::MissingField("message"))?
        .with_format(format)
        .with_quality(quality)
        .with_mode(mode);

    if let Some(date) = params.get("date") {
        request = request.with_date(date.clone());
    }
    if let Some(time) = params.get("time") {
        request = request.with_time(time.clone());
    }

    Ok(request)
}
