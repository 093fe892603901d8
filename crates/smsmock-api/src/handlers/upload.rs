use std::sync::Arc;

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smsmock_core::{AppError, CdnProvider};
use smsmock_infra::retry;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

const DEFAULT_FILENAME: &str = "image.png";
const SUCCESS_MESSAGE: &str = "Gambar berhasil diupload ke CDN";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Base64 image; a `data:<mime>;base64,` prefix is stripped
    #[serde(default, alias = "imageData")]
    pub image: Option<String>,
    /// Public http(s) URL to fetch and relay when `image` is absent
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    /// `uguu` or `catbox`; the configured provider when absent
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    pub cdn_url: String,
    pub filename: String,
    pub size: usize,
    pub message: String,
    pub provider: CdnProvider,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub data: UploadData,
}

enum Source<'a> {
    Inline(&'a str),
    Remote(&'a str),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl UploadRequest {
    fn source(&self) -> Result<Source<'_>, AppError> {
        if let Some(image) = non_empty(&self.image) {
            return Ok(Source::Inline(image));
        }
        if let Some(url) = non_empty(&self.url) {
            return Ok(Source::Remote(url));
        }
        Err(AppError::InvalidInput(
            "Parameter image atau url diperlukan".to_string(),
        ))
    }
}

/// Strip an optional `data:...;base64,` prefix and decode.
fn decode_image(image: &str) -> Result<Bytes, AppError> {
    let payload = match image.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| AppError::InvalidInput("Malformed data URL".to_string()))?,
        None => image,
    };

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(cleaned)
        .map(Bytes::from)
        .map_err(|e| AppError::InvalidInput(format!("Invalid base64 image data: {}", e)))
}

/// Content type from the filename extension
fn mime_for_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "cdn",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Image relayed to the CDN", body = UploadResponse),
        (status = 400, description = "Neither image nor url given, a non-public url, or invalid input", body = ErrorResponse),
        (status = 413, description = "Image exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Gagal upload gambar ke CDN", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "upload_to_cdn"))]
pub async fn upload_to_cdn(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<UploadRequest>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let provider = match non_empty(&body.provider) {
        Some(p) => Some(CdnProvider::parse(p).ok_or_else(|| {
            AppError::InvalidInput(format!("Unsupported CDN provider: {}", p))
        })?),
        None => None,
    };
    let filename = non_empty(&body.filename)
        .unwrap_or(DEFAULT_FILENAME)
        .to_string();

    let data = match body.source()? {
        Source::Inline(image) => decode_image(image)?,
        Source::Remote(url) => {
            tracing::info!(url = %url, "Fetching remote image");
            state.fetcher.fetch(url).await?
        }
    };

    let limit = state.config.max_upload_size_bytes;
    if data.len() > limit {
        return Err(AppError::PayloadTooLarge(format!(
            "Image of {} bytes exceeds the {} byte limit",
            data.len(),
            limit
        ))
        .into());
    }
    if data.is_empty() {
        return Err(AppError::InvalidInput("Image data is empty".to_string()).into());
    }

    let uploader = state.uploaders.get(provider);
    let mime_type = mime_for_filename(&filename);
    let size = data.len();

    let uploaded = retry(state.retry_policy, "cdn_upload", |_| {
        let uploader = uploader.clone();
        let data = data.clone();
        let filename = filename.as_str();
        async move {
            uploader
                .upload(data, filename, mime_type)
                .await
                .map_err(AppError::from)
        }
    })
    .await?;

    tracing::info!(
        cdn_url = %uploaded.url,
        provider = %uploaded.provider,
        size,
        "Image relayed to CDN"
    );

    Ok(Json(UploadResponse {
        success: true,
        data: UploadData {
            cdn_url: uploaded.url,
            filename,
            size,
            message: SUCCESS_MESSAGE.to_string(),
            provider: uploaded.provider,
        },
    }))
}
