use std::path::{Path, PathBuf};

use smsmock_core::{MockupRequest, RendererKind};

/// Where a rendered mockup goes when no `--output` is given.
///
/// Image strategies use the request's download filename; the HTML strategy swaps
/// the extension for `.html`.
pub fn default_output_path(request: &MockupRequest, renderer: RendererKind) -> PathBuf {
    let filename = PathBuf::from(request.filename());
    if renderer.produces_surface() {
        filename
    } else {
        filename.with_extension("html")
    }
}

/// Content type for a file about to be relayed, from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsmock_core::ImageFormat;

    #[test]
    fn output_path_follows_format_and_renderer() {
        let request = MockupRequest::new("Pak Eko", "Test")
            .unwrap()
            .with_format(ImageFormat::Jpeg);

        let image = default_output_path(&request, RendererKind::Raster);
        let name = image.to_str().unwrap();
        assert!(name.starts_with("sms-pak-eko-"));
        assert!(name.ends_with(".jpeg"));

        let html = default_output_path(&request, RendererKind::Html);
        assert_eq!(html.extension().and_then(|e| e.to_str()), Some("html"));
    }

    #[test]
    fn output_path_stays_in_working_directory() {
        let request = MockupRequest::new("../../tmp/evil", "Test").unwrap();
        let path = default_output_path(&request, RendererKind::DomCapture);
        assert_eq!(path.components().count(), 1);
        assert!(path.to_str().unwrap().starts_with("sms-tmp-evil-"));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a/b.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("x.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }
}
