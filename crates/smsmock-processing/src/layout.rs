//! Geometry and palette of the phone mockup
//!
//! All coordinates are CSS pixels at device scale 1 with the origin at the top
//! left corner of the phone body. The raster and SVG renderers both draw from
//! these values; the HTML template expresses the same box model in CSS.

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    pub fn rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.0, self.1, self.2, 255])
    }
}

/// Axis-aligned box with optional rounded corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub radius: u32,
}

impl Frame {
    pub const fn new(x: i32, y: i32, width: u32, height: u32, radius: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            radius,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.width as f32 / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y as f32 + self.height as f32 / 2.0
    }
}

pub const PHONE_WIDTH: u32 = 360;
pub const PHONE_HEIGHT: u32 = 420;
/// Device-scale factor used when capturing the SVG document
pub const CAPTURE_SCALE: f32 = 2.0;

// Palette
pub const PHONE_BG: Rgb = Rgb(0x0b, 0x0b, 0x0b);
pub const BEZEL_BG: Rgb = Rgb(0x00, 0x00, 0x00);
pub const SCREEN_BG: Rgb = Rgb(0xdb, 0xee, 0xf0);
pub const SCREEN_BORDER: Rgb = Rgb(0x05, 0x3f, 0x36);
pub const HEADER_BG: Rgb = Rgb(0x0f, 0x6b, 0x5a);
pub const HEADER_TEXT: Rgb = Rgb(0xff, 0xff, 0xff);
pub const MESSAGE_TEXT: Rgb = Rgb(0x26, 0x3a, 0x3d);
pub const MUTED_TEXT: Rgb = Rgb(0x6b, 0x76, 0x80);
pub const FROM_TEXT: Rgb = Rgb(0x13, 0x27, 0x28);
pub const DATE_TEXT: Rgb = Rgb(0x11, 0x2a, 0x2b);
pub const BOTTOM_BG: Rgb = Rgb(0x06, 0x06, 0x06);
pub const BOTTOM_TEXT: Rgb = Rgb(0xbf, 0xe0, 0xff);
pub const ICON_MAIN: Rgb = Rgb(0x6c, 0x5c, 0xe7);
pub const ICON_ALT: Rgb = Rgb(0x00, 0xb0, 0xff);

// Boxes, outermost first
pub const PHONE: Frame = Frame::new(0, 0, PHONE_WIDTH, PHONE_HEIGHT, 18);
pub const BEZEL: Frame = Frame::new(14, 14, 332, 392, 12);
/// Outer edge of the screen border
pub const SCREEN: Frame = Frame::new(33, 44, 294, 332, 6);
pub const SCREEN_BORDER_WIDTH: u32 = 3;
/// Screen area inside the border
pub const SCREEN_INNER: Frame = Frame::new(36, 47, 288, 326, 4);
pub const HEADER: Frame = Frame::new(36, 47, 288, 56, 0);
pub const BOTTOM_BAR: Frame = Frame::new(36, 327, 288, 46, 0);
/// Message body between header and bottom bar
pub const BODY: Frame = Frame::new(36, 103, 288, 224, 0);

pub const BODY_PADDING_X: i32 = 20;
pub const BODY_PADDING_Y: i32 = 18;
pub const HEADER_PADDING_X: i32 = 10;
pub const BOTTOM_PADDING_X: i32 = 16;

// Header icons: 20px squares, 6px apart
pub const ICON_SIZE: u32 = 20;
pub const ICON_GAP: i32 = 6;
pub const ICON_Y: i32 = HEADER.y + (HEADER.height as i32 - ICON_SIZE as i32) / 2;
pub const SIGNAL_ICON_X: i32 = HEADER.x + HEADER_PADDING_X;
pub const ENVELOPE_ICON_X: i32 = SIGNAL_ICON_X + ICON_SIZE as i32 + ICON_GAP;
pub const BATTERY_ICON_X: i32 = HEADER.x + HEADER.width as i32 - HEADER_PADDING_X - ICON_SIZE as i32;
pub const VIBRATE_ICON_X: i32 = BATTERY_ICON_X - ICON_GAP - ICON_SIZE as i32;
pub const ALARM_ICON_X: i32 = VIBRATE_ICON_X - ICON_GAP - ICON_SIZE as i32;

// Typography
pub const TITLE_FONT_SIZE: f32 = 22.0;
pub const MESSAGE_FONT_SIZE: f32 = 26.0;
pub const MESSAGE_LINE_HEIGHT: f32 = 32.0;
pub const META_FONT_SIZE: f32 = 18.0;
pub const META_LINE_HEIGHT: f32 = 24.0;
pub const BOTTOM_FONT_SIZE: f32 = 20.0;
/// Space between the last message line and the `Dari:` line
pub const META_GAP: f32 = 26.0;
/// Extra space below the sender line of the meta block
pub const FROM_GAP: f32 = 6.0;

/// Left edge of the message and meta text
pub const TEXT_X: i32 = BODY.x + BODY_PADDING_X;
pub const TEXT_TOP: i32 = BODY.y + BODY_PADDING_Y;

/// Widest line the message may occupy before wrapping
pub fn message_max_width() -> f32 {
    (BODY.width as i32 - 2 * BODY_PADDING_X) as f32
}

/// Width of the header title area between the icon groups
pub fn title_max_width() -> f32 {
    (ALARM_ICON_X - ICON_GAP - (ENVELOPE_ICON_X + ICON_SIZE as i32 + ICON_GAP)) as f32
}

/// Surface size after capture at [`CAPTURE_SCALE`]
pub fn capture_size() -> (u32, u32) {
    (
        (PHONE_WIDTH as f32 * CAPTURE_SCALE) as u32,
        (PHONE_HEIGHT as f32 * CAPTURE_SCALE) as u32,
    )
}

/// Baseline of a line of text whose line box starts at `top`.
///
/// The glyph box is centered in the line box and the ascent taken as 0.8 em,
/// close enough for the Courier and Arial faces the mockup names.
pub fn baseline(top: f32, line_height: f32, font_size: f32) -> f32 {
    top + (line_height - font_size) / 2.0 + font_size * 0.8
}

/// Vertical position of each text line in the body, measured as line tops.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyLayout {
    pub message_tops: Vec<f32>,
    pub dari_top: f32,
    pub from_top: f32,
    pub date_top: f32,
    pub time_top: f32,
}

impl BodyLayout {
    pub fn for_message_lines(count: usize) -> Self {
        let top = TEXT_TOP as f32;
        let message_tops = (0..count)
            .map(|i| top + i as f32 * MESSAGE_LINE_HEIGHT)
            .collect();
        let dari_top = top + count as f32 * MESSAGE_LINE_HEIGHT + META_GAP;
        let from_top = dari_top + META_LINE_HEIGHT;
        let date_top = from_top + META_LINE_HEIGHT + FROM_GAP;
        let time_top = date_top + META_LINE_HEIGHT;
        Self {
            message_tops,
            dari_top,
            from_top,
            date_top,
            time_top,
        }
    }
}
