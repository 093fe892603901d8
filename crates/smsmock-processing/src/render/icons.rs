use crate::layout;

/// Decorative status icons in the header bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderIcon {
    Signal,
    Envelope,
    Alarm,
    Vibrate,
    Battery,
}

impl HeaderIcon {
    pub const LEFT: [HeaderIcon; 2] = [HeaderIcon::Signal, HeaderIcon::Envelope];
    pub const RIGHT: [HeaderIcon; 3] = [HeaderIcon::Alarm, HeaderIcon::Vibrate, HeaderIcon::Battery];

    /// Left edge of the icon box in the header
    pub fn x(self) -> i32 {
        match self {
            HeaderIcon::Signal => layout::SIGNAL_ICON_X,
            HeaderIcon::Envelope => layout::ENVELOPE_ICON_X,
            HeaderIcon::Alarm => layout::ALARM_ICON_X,
            HeaderIcon::Vibrate => layout::VIBRATE_ICON_X,
            HeaderIcon::Battery => layout::BATTERY_ICON_X,
        }
    }

    /// `(width, height)` of the drawing's own coordinate system
    pub fn view_box(self) -> (f32, f32) {
        match self {
            HeaderIcon::Battery => (26.0, 14.0),
            _ => (24.0, 24.0),
        }
    }

    /// SVG shapes in view box units; `main` and `alt` are any SVG paint value.
    pub fn svg_shapes(self, main: &str, alt: &str) -> String {
        match self {
            HeaderIcon::Signal => format!(
                r#"<rect x="2" y="16" width="2" height="6" fill="{main}"/><rect x="6" y="12" width="2" height="10" fill="{main}"/><rect x="10" y="8" width="2" height="14" fill="{alt}"/><rect x="14" y="4" width="2" height="18" fill="{alt}"/>"#
            ),
            HeaderIcon::Envelope => format!(
                r#"<rect x="2" y="6" width="20" height="12" stroke="{main}" fill="none" stroke-width="2"/><polyline points="2,6 12,13 22,6" stroke="{alt}" stroke-width="2" fill="none"/>"#
            ),
            HeaderIcon::Alarm => format!(
                r#"<circle cx="12" cy="13" r="6" stroke="{main}" fill="none" stroke-width="2"/><line x1="12" y1="13" x2="12" y2="9" stroke="{alt}" stroke-width="2"/><line x1="12" y1="13" x2="15" y2="13" stroke="{alt}" stroke-width="2"/>"#
            ),
            HeaderIcon::Vibrate => format!(
                r#"<rect x="8" y="6" width="8" height="12" stroke="{main}" fill="none" stroke-width="2"/><line x1="2" y1="8" x2="5" y2="10" stroke="{alt}" stroke-width="2"/><line x1="2" y1="14" x2="5" y2="12" stroke="{alt}" stroke-width="2"/><line x1="22" y1="8" x2="19" y2="10" stroke="{alt}" stroke-width="2"/><line x1="22" y1="14" x2="19" y2="12" stroke="{alt}" stroke-width="2"/>"#
            ),
            HeaderIcon::Battery => format!(
                r#"<rect x="1" y="3" width="20" height="8" stroke="{main}" fill="none" stroke-width="2"/><rect x="22" y="5" width="3" height="4" fill="{main}"/><rect x="3" y="5" width="14" height="4" fill="{alt}"/>"#
            ),
        }
    }

    /// Standalone `<svg>` element sized to the header icon box
    pub fn svg_element(self, extra_attrs: &str, main: &str, alt: &str) -> String {
        let (vw, vh) = self.view_box();
        format!(
            r#"<svg {extra_attrs} width="{size}" height="{size}" viewBox="0 0 {vw} {vh}">{shapes}</svg>"#,
            size = layout::ICON_SIZE,
            shapes = self.svg_shapes(main, alt),
        )
    }
}
