//! Typed per-kind view of a layer's attribute bag.
//!
//! [`LayerProps::from_layer`] is the only place that reads the untyped bag. It never fails:
//! every field has a default that applies when the key is absent or mistyped.

use crate::{
    assets::color::parse_hex_color,
    attrs,
    foundation::core::{PaintTransform, Rgba8},
    model::{Layer, LayerKind},
};

/// Rectangle side used when `width` (or `height`) is absent or unparseable.
pub const DEFAULT_RECT_SIZE: f64 = 100.0;
/// Default text size in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 48.0;
/// Attribute key holding the base64 raster payload of an image layer.
pub const IMAGE_PAYLOAD_KEY: &str = "image_base64";

/// Decoded properties of one layer.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerProps {
    /// `rectangle` layer.
    Rect(RectProps),
    /// `image` layer.
    Image(ImageProps),
    /// `text` layer.
    Text(TextProps),
    /// Any kind this crate does not paint.
    Ignored {
        /// Wire name of the kind.
        kind: String,
    },
}

/// Filled axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectProps {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (`width`, falling through to `w` when zero).
    pub width: f64,
    /// Height (`height`, falling through to `h` when zero).
    pub height: f64,
    /// Fill color, opaque white by default.
    pub color: Rgba8,
}

/// Embedded raster image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageProps {
    /// Base64 payload; `None` when missing, not a string or empty.
    pub payload: Option<String>,
    /// Left edge of the image's top-left corner.
    pub x: f64,
    /// Top edge of the image's top-left corner.
    pub y: f64,
    /// Uniform scale around the top-left corner.
    pub scale: f64,
    /// Global alpha for this layer only.
    pub opacity: f64,
}

/// Horizontal anchor of a text layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Align {
    /// Baseline-left at the anchor point.
    #[default]
    Left,
    /// Horizontal and vertical center at the anchor point.
    Center,
    /// Right edge, vertically centered, at the anchor point.
    Right,
}

impl Align {
    /// Parse `left` / `center` / `right`; anything else is `Left`.
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => Self::Center,
            "right" => Self::Right,
            _ => Self::Left,
        }
    }
}

/// Single line of bitmap text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextProps {
    /// Text to draw; empty text paints nothing.
    pub text: String,
    /// Anchor x.
    pub x: f64,
    /// Anchor y.
    pub y: f64,
    /// Cell height in pixels.
    pub font_size: f64,
    /// Glyph color, opaque black by default.
    pub color: Rgba8,
    /// Anchor alignment.
    pub align: Align,
}

impl LayerProps {
    /// Decode the attribute bag of `layer` according to its kind.
    pub fn from_layer(layer: &Layer) -> Self {
        let a = &layer.attributes;
        match &layer.kind {
            LayerKind::Rectangle => Self::Rect(RectProps {
                x: attrs::number(a, "x", 0.0),
                y: attrs::number(a, "y", 0.0),
                width: attrs::number_or(a, "width", "w", DEFAULT_RECT_SIZE),
                height: attrs::number_or(a, "height", "h", DEFAULT_RECT_SIZE),
                color: parse_hex_color(attrs::string(a, "color", "#ffffff")),
            }),
            LayerKind::Image => Self::Image(ImageProps {
                payload: Some(attrs::string(a, IMAGE_PAYLOAD_KEY, ""))
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned),
                x: attrs::number(a, "x", 0.0),
                y: attrs::number(a, "y", 0.0),
                scale: attrs::number(a, "scale", 1.0),
                opacity: attrs::number(a, "opacity", 1.0),
            }),
            LayerKind::Text => Self::Text(TextProps {
                text: attrs::string(a, "text", "").to_owned(),
                x: attrs::number(a, "x", 0.0),
                y: attrs::number(a, "y", 0.0),
                font_size: attrs::number(a, "font_size", DEFAULT_FONT_SIZE),
                color: parse_hex_color(attrs::string(a, "color", "#000000")),
                align: Align::parse(attrs::string(a, "align", "left")),
            }),
            LayerKind::Other(kind) => Self::Ignored { kind: kind.clone() },
        }
    }
}

impl ImageProps {
    /// Placement of the image on the canvas.
    ///
    /// At unit scale the origin snaps to whole pixels so the image is blitted unresampled.
    pub fn transform(&self) -> PaintTransform {
        let base = if self.scale == 1.0 {
            PaintTransform::translate(self.x.round(), self.y.round())
        } else {
            PaintTransform::translate(self.x, self.y).with_scale(self.scale)
        };
        base.with_alpha(self.opacity)
    }
}
