use serde::Deserialize;

use super::UploadError;

#[derive(Debug, Deserialize)]
struct UguuResponse {
    #[serde(default)]
    files: Vec<UguuFile>,
}

#[derive(Debug, Deserialize)]
struct UguuFile {
    url: String,
}

fn is_http_url(s: &str) -> bool {
    (s.starts_with("https://") || s.starts_with("http://"))
        && !s.chars().any(char::is_whitespace)
}

/// Extract the public URL from a CDN reply.
///
/// Accepts the Uguu JSON shape (`files[0].url`) and the Catbox plain-text shape
/// (the whole body is the URL), so either provider may answer in either form.
pub fn normalize_cdn_response(body: &str) -> Result<String, UploadError> {
    let trimmed = body.trim();

    if trimmed.starts_with('{') {
        let parsed: UguuResponse = serde_json::from_str(trimmed)
            .map_err(|e| UploadError::MalformedResponse(format!("invalid JSON: {}", e)))?;
        return parsed
            .files
            .into_iter()
            .next()
            .map(|file| file.url.trim().to_string())
            .filter(|url| is_http_url(url))
            .ok_or_else(|| UploadError::MalformedResponse("no file URL in response".to_string()));
    }

    if is_http_url(trimmed) {
        return Ok(trimmed.to_string());
    }

    let preview: String = trimmed.chars().take(120).collect();
    Err(UploadError::MalformedResponse(format!(
        "expected a URL, got '{}'",
        preview
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_plain_text_normalize_to_same_url() {
        let json = r#"{"success":true,"files":[{"hash":"abc","filename":"y.png","url":"http://x/y.png","size":12}]}"#;
        assert_eq!(normalize_cdn_response(json).unwrap(), "http://x/y.png");
        assert_eq!(normalize_cdn_response("http://x/y.png").unwrap(), "http://x/y.png");
        assert_eq!(
            normalize_cdn_response("  https://files.catbox.moe/ab12cd.png\n").unwrap(),
            "https://files.catbox.moe/ab12cd.png"
        );
    }

    #[test]
    fn empty_file_list_is_malformed() {
        let err = normalize_cdn_response(r#"{"success":false,"files":[]}"#).unwrap_err();
        assert!(matches!(err, UploadError::MalformedResponse(_)));
    }

    #[test]
    fn broken_json_is_malformed() {
        assert!(matches!(
            normalize_cdn_response(r#"{"files":[{"url":"#),
            Err(UploadError::MalformedResponse(_))
        ));
    }

    #[test]
    fn error_text_is_malformed() {
        for body in ["", "No input file(s)", "<html>502 Bad Gateway</html>"] {
            assert!(
                matches!(normalize_cdn_response(body), Err(UploadError::MalformedResponse(_))),
                "body {body:?}"
            );
        }
    }
}
