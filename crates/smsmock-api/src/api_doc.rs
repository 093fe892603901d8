//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers::{sms_image, upload};
use crate::setup::routes::health;
use smsmock_core::{CdnProvider, ImageFormat, RendererKind};

/// The OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "smsmock API",
        version = "0.1.0",
        description = "Renders feature-phone SMS mockups as PNG/JPEG images or HTML, and relays images to public CDNs (Uguu, Catbox)."
    ),
    paths(
        sms_image::get_sms_image,
        sms_image::create_sms_image,
        upload::upload_to_cdn,
        health::health_check,
    ),
    components(schemas(
        ErrorResponse,
        sms_image::SmsImageBody,
        sms_image::SmsImageData,
        sms_image::SmsImageResponse,
        upload::UploadRequest,
        upload::UploadData,
        upload::UploadResponse,
        health::HealthResponse,
        CdnProvider,
        ImageFormat,
        RendererKind,
    )),
    tags(
        (name = "mockup", description = "SMS mockup rendering"),
        (name = "cdn", description = "Image relay to public file hosts"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
