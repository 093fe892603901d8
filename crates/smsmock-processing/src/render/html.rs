use smsmock_core::{MockupRequest, RendererKind};

use super::icons::HeaderIcon;
use super::{RenderError, RenderOutput, Renderer};
use crate::escape::escape_html;
use crate::layout::{PHONE_HEIGHT, PHONE_WIDTH};

const STYLE: &str = r#"
    :root {
        --phone-bg: #0b0b0b;
        --screen-bg: #dbeef0;
        --header-bg: #0f6b5a;
        --text: #0b2430;
        --muted: #6b7680;
        --bottom-bg: #060606;
        --icon-main: #6c5ce7;
        --icon-alt: #00b0ff;
    }
    * { box-sizing: border-box; }
    body {
        margin: 0;
        padding: 20px;
        background: #111;
        display: flex;
        justify-content: center;
        align-items: center;
        min-height: 100vh;
        font-family: "Courier New", Courier, monospace;
    }
    .phone {
        width: __PHONE_WIDTH__px;
        height: __PHONE_HEIGHT__px;
        background: var(--phone-bg);
        border-radius: 18px;
        padding: 14px;
    }
    .bezel {
        width: 100%;
        height: 100%;
        background: #000;
        border-radius: 12px;
        padding: 10px;
        display: flex;
        align-items: center;
        justify-content: center;
    }
    .screen {
        width: calc(100% - 18px);
        height: calc(100% - 40px);
        background: var(--screen-bg);
        border: 3px solid #053f36;
        border-radius: 6px;
        overflow: hidden;
        display: flex;
        flex-direction: column;
    }
    .header {
        height: 56px;
        background: var(--header-bg);
        color: #fff;
        display: flex;
        align-items: center;
        justify-content: space-between;
        padding: 6px 10px;
        font-size: 20px;
    }
    .header .left, .header .right { display: flex; align-items: center; gap: 6px; }
    .title {
        flex: 1;
        text-align: center;
        font-family: "Arial Black", Arial, sans-serif;
        font-size: 22px;
        white-space: nowrap;
        overflow: hidden;
        text-overflow: ellipsis;
    }
    .icon-svg { width: 20px; height: 20px; }
    .body {
        flex: 1;
        padding: 18px 20px;
        color: var(--text);
        font-size: 20px;
        line-height: 1.5;
        overflow: hidden;
    }
    .message {
        font-size: 26px;
        line-height: 1.35;
        color: #263a3d;
        margin-bottom: 18px;
        white-space: pre-line;
        overflow-wrap: break-word;
    }
    .meta { margin-top: 8px; color: var(--muted); font-size: 18px; line-height: 1.3; }
    .meta .from { font-weight: 700; color: #132728; margin-bottom: 6px; }
    .meta .date { font-weight: 700; color: #112a2b; }
    .bottom-bar {
        height: 46px;
        background: var(--bottom-bg);
        display: flex;
        align-items: center;
        justify-content: space-between;
        padding: 0 16px;
        color: #bfe0ff;
        font-weight: 700;
        font-size: 20px;
    }
"#;

/// Renders the mockup as a self-contained HTML/CSS document.
///
/// Every user-supplied field passes through [`escape_html`]; the template itself
/// is static apart from the frame size taken from [`crate::layout`].
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn document(&self, request: &MockupRequest) -> String {
        let sender = escape_html(request.sender());
        let message = escape_html(request.message());
        let date = escape_html(request.date());
        let time = escape_html(request.time());

        let icons = |group: &[HeaderIcon]| -> String {
            group
                .iter()
                .map(|icon| {
                    icon.svg_element(r#"class="icon-svg""#, "var(--icon-main)", "var(--icon-alt)")
                })
                .collect::<Vec<_>>()
                .join("")
        };

        let style = STYLE
            .replace("__PHONE_WIDTH__", &PHONE_WIDTH.to_string())
            .replace("__PHONE_HEIGHT__", &PHONE_HEIGHT.to_string());

        format!(
            r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>SMS dari {sender}</title>
<style>{style}</style>
</head>
<body>
<div class="phone" id="{root_id}">
  <div class="bezel">
    <div class="screen">
      <div class="header">
        <div class="left">{left_icons}</div>
        <div class="title">{sender}</div>
        <div class="right">{right_icons}</div>
      </div>
      <div class="body">
        <div class="message">{message}</div>
        <div class="meta">
          <div>Dari:</div>
          <div class="from">{sender}</div>
          <div class="date">{date}<br>{time}</div>
        </div>
      </div>
      <div class="bottom-bar">
        <div class="menu-left">Pilihan</div>
        <div class="menu-right">Kembali</div>
      </div>
    </div>
  </div>
</div>
</body>
</html>
"#,
            root_id = super::ROOT_ELEMENT_ID,
            left_icons = icons(&HeaderIcon::LEFT),
            right_icons = icons(&HeaderIcon::RIGHT),
        )
    }
}

impl Renderer for HtmlRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Html
    }

    fn render(&self, request: &MockupRequest) -> Result<RenderOutput, RenderError> {
        let html = self.document(request);
        tracing::debug!(bytes = html.len(), "Rendered HTML mockup");
        Ok(RenderOutput::Document(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str) -> MockupRequest {
        MockupRequest::new("Pak Eko", message).unwrap()
    }

    #[test]
    fn escapes_script_in_message() {
        let html = HtmlRenderer::new().document(&request("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn interpolates_all_fields() {
        let req = request("Kita ga enakan")
            .with_date("09/07/2025")
            .with_time("07:30");
        let html = HtmlRenderer::new().document(&req);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("Pak Eko").count(), 3);
        assert!(html.contains("Kita ga enakan"));
        assert!(html.contains("09/07/2025<br>07:30"));
        assert!(html.contains("Pilihan"));
        assert!(html.contains("Kembali"));
        assert!(html.contains("width: 360px"));
        assert!(html.contains("white-space: pre-line"));
    }

    #[test]
    fn contains_five_icons() {
        let html = HtmlRenderer::new().document(&request("hi"));
        assert_eq!(html.matches(r#"class="icon-svg""#).count(), 5);
    }

    #[test]
    fn render_returns_document() {
        let output = HtmlRenderer::new().render(&request("hi")).unwrap();
        assert!(output.as_document().is_some());
        assert!(output.as_surface().is_none());
    }
}
