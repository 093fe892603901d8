use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smsmock_core::{
    mode_from_query, resolve_mockup_request, AppError, CdnProvider, ImageFormat, ResponseMode,
};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

const CACHE_CONTROL: &str = "public, max-age=3600";

/// JSON body of `POST /api/sms-image`. Scalars of any JSON type are accepted and
/// resolved the same way as query parameters.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SmsImageBody {
    #[schema(value_type = Option<String>, example = "Pak Eko")]
    pub sender: Option<Value>,
    #[schema(value_type = Option<String>, example = "Kita ga enakan, orang seenaknya")]
    pub message: Option<Value>,
    #[schema(value_type = Option<String>, example = "08/07/2025")]
    pub date: Option<Value>,
    #[schema(value_type = Option<String>, example = "14:55")]
    pub time: Option<Value>,
    #[schema(value_type = Option<String>, example = "png")]
    pub format: Option<Value>,
    #[schema(value_type = Option<f32>, example = 0.9)]
    pub quality: Option<Value>,
    /// Upload the rendered image to the CDN (default true)
    #[schema(value_type = Option<bool>)]
    pub upload: Option<Value>,
    /// `uguu` or `catbox`; the configured provider when absent
    pub provider: Option<String>,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl SmsImageBody {
    /// Mockup fields as the resolver's key/value map
    fn params(&self) -> HashMap<String, String> {
        [
            ("sender", &self.sender),
            ("message", &self.message),
            ("date", &self.date),
            ("time", &self.time),
            ("format", &self.format),
            ("quality", &self.quality),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .and_then(scalar_to_string)
                .map(|v| (key.to_string(), v))
        })
        .collect()
    }

    fn wants_upload(&self) -> bool {
        match &self.upload {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !matches!(s.trim().to_lowercase().as_str(), "false" | "0" | "no"),
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            _ => true,
        }
    }

    fn provider(&self) -> Result<Option<CdnProvider>, AppError> {
        self.provider
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| {
                CdnProvider::parse(p)
                    .ok_or_else(|| AppError::InvalidInput(format!("Unsupported CDN provider: {}", p)))
            })
            .transpose()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsImageData {
    pub sender: String,
    pub message: String,
    pub date: String,
    pub time: String,
    pub format: ImageFormat,
    pub quality: f32,
    pub mime_type: String,
    pub filename: String,
    /// Base64 of the encoded image
    pub image: String,
    pub size: usize,
    /// The HTML rendition of the same mockup
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<CdnProvider>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SmsImageResponse {
    pub success: bool,
    pub data: SmsImageData,
}

#[utoipa::path(
    get,
    path = "/api/sms-image",
    tag = "mockup",
    params(
        ("sender" = String, Query, description = "Sender shown in the header and meta block"),
        ("message" = String, Query, description = "Message body; newlines start a new paragraph"),
        ("date" = Option<String>, Query, description = "Display date (default 08/07/2025)"),
        ("time" = Option<String>, Query, description = "Display time (default 14:55)"),
        ("format" = Option<String>, Query, description = "png (default) or jpeg"),
        ("quality" = Option<f32>, Query, description = "JPEG quality in [0.1, 1.0], default 0.9"),
        ("html" = Option<bool>, Query, description = "Return the HTML document instead of an image"),
        ("download" = Option<bool>, Query, description = "Serve the image as an attachment")
    ),
    responses(
        (status = 200, description = "Rendered mockup image or HTML document", content(("image/png"), ("image/jpeg"), ("text/html"))),
        (status = 400, description = "Missing sender or message", body = ErrorResponse),
        (status = 500, description = "Rendering failed after retries", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, params), fields(operation = "get_sms_image"))]
pub async fn get_sms_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, HttpAppError> {
    let request = resolve_mockup_request(&params, mode_from_query(&params))?;

    if request.mode() == ResponseMode::Html || state.mockups.serves_html() {
        let html = state.mockups.html_document(&request);
        return Ok((
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response());
    }

    let rendered = state
        .mockups
        .render_with_retry(&request, state.retry_policy)
        .await?;

    let disposition = match request.mode() {
        ResponseMode::ImageBytes => "attachment",
        _ => "inline",
    };
    let filename = request.filename();
    tracing::info!(
        filename = %filename,
        size = rendered.size_bytes,
        mime_type = rendered.mime_type,
        "Mockup rendered"
    );

    Ok((
        [
            (header::CONTENT_TYPE, rendered.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, filename),
            ),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
        ],
        Body::from(rendered.encoded_bytes),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/sms-image",
    tag = "mockup",
    request_body = SmsImageBody,
    responses(
        (status = 200, description = "Rendered mockup with base64 image and optional CDN URL", body = SmsImageResponse),
        (status = 400, description = "Missing sender or message, or invalid body", body = ErrorResponse),
        (status = 500, description = "Render, encode or upload failed after retries", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "create_sms_image"))]
pub async fn create_sms_image(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<SmsImageBody>,
) -> Result<Json<SmsImageResponse>, HttpAppError> {
    let request = resolve_mockup_request(&body.params(), ResponseMode::JsonWithCdnUrl)?;
    let provider = body.provider()?;
    let filename = request.filename();

    let (rendered, uploaded) = if body.wants_upload() {
        let uploader = state.uploaders.get(provider);
        let (rendered, uploaded) = state
            .mockups
            .render_and_upload(&request, &filename, uploader, state.retry_policy)
            .await?;
        (rendered, Some(uploaded))
    } else {
        let rendered = state
            .mockups
            .render_with_retry(&request, state.retry_policy)
            .await?;
        (rendered, None)
    };

    tracing::info!(
        filename = %filename,
        size = rendered.size_bytes,
        cdn_url = uploaded.as_ref().map(|u| u.url.as_str()),
        "Mockup rendered"
    );

    let data = SmsImageData {
        sender: request.sender().to_string(),
        message: request.message().to_string(),
        date: request.date().to_string(),
        time: request.time().to_string(),
        format: request.format(),
        quality: request.quality(),
        mime_type: rendered.mime_type.to_string(),
        filename,
        image: STANDARD.encode(&rendered.encoded_bytes),
        size: rendered.size_bytes,
        html: state.mockups.html_document(&request),
        cdn_url: uploaded.as_ref().map(|u| u.url.clone()),
        provider: uploaded.map(|u| u.provider),
    };

    Ok(Json(SmsImageResponse {
        success: true,
        data,
    }))
}
