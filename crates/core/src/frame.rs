//! Frame element construction and its style options.

use serde::{Deserialize, Serialize};

/// Visual configuration for injected frame elements.
///
/// The defaults mirror the look the extension has always shipped: a
/// distinct red 2px border with rounded corners, full width, 500px tall
/// with a 300px floor. Hosts can override individual fields; anything left
/// out of the wire payload falls back to these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStyle {
    /// Border width in pixels.
    #[serde(default = "default_border_width")]
    pub border_width: u32,
    /// CSS border color.
    #[serde(default = "default_border_color")]
    pub border_color: String,
    /// Corner radius in pixels.
    #[serde(default = "default_corner_radius")]
    pub corner_radius: u32,
    /// Lower bound the rendered height never goes below, in pixels.
    #[serde(default = "default_min_height")]
    pub min_height: u32,
    /// Rendered height in pixels. The minimum still wins when a host
    /// configures this smaller than `min_height`.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            border_width: default_border_width(),
            border_color: default_border_color(),
            corner_radius: default_corner_radius(),
            min_height: default_min_height(),
            height: default_height(),
        }
    }
}

fn default_border_width() -> u32 {
    2
}

fn default_border_color() -> String {
    "red".to_string()
}

fn default_corner_radius() -> u32 {
    4
}

fn default_min_height() -> u32 {
    300
}

fn default_height() -> u32 {
    500
}

/// Builds the frame element markup for a resolved source locator.
///
/// The source and border color land in attribute position, so both are
/// escaped before interpolation.
pub fn build_frame(src: &str, style: &FrameStyle) -> String {
    format!(
        "<iframe src=\"{}\" style=\"border: {}px solid {}; border-radius: {}px; \
         min-height: {}px; width: 100%; height: {}px;\"></iframe>",
        escape_attribute(src),
        style.border_width,
        escape_attribute(&style.border_color),
        style.corner_radius,
        style.min_height,
        style.height,
    )
}

/// Replaces characters with HTML attribute meaning by their entities.
///
/// Single-pass byte scan; the input is returned as-is when nothing needs
/// escaping.
fn escape_attribute(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut escaped = String::with_capacity(value.len());
    let mut start = 0;

    for (index, &byte) in bytes.iter().enumerate() {
        let entity = match byte {
            b'&' => "&amp;",
            b'"' => "&quot;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'\'' => "&#39;",
            _ => continue,
        };

        escaped.push_str(&value[start..index]);
        escaped.push_str(entity);
        start = index + 1;
    }

    if start == 0 {
        return value.to_string();
    }

    escaped.push_str(&value[start..]);
    escaped
}
