//! Postcard flattens the layers of a generated post into a single image.
//!
//! A [`Post`] carries an ordered list of [`Layer`]s (filled rectangles, base64 raster images,
//! bitmap text) described by untyped attribute maps. [`compose`] sizes a canvas from the layer
//! geometry, paints the layers in `order_index` order and encodes the result.
//! [`deliver_post`] hands the result to a [`DeliveryChannel`] and falls back to sending layers
//! one by one when compositing fails.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Lenient attribute reads.
pub mod attrs;
/// Canvas sizing and layer compositing.
pub mod compose;
/// Post delivery and the per-layer fallback.
pub mod deliver;
/// Final image encoding.
pub mod encode;
/// Posts and layers as decoded from backend JSON.
pub mod model;
/// Typed per-kind layer properties.
pub mod props;
/// Rasterization.
pub mod render;

pub use crate::assets::color::parse_hex_color;
pub use crate::assets::decode::{PreparedImage, decode_base64, decode_image, decode_image_base64};
pub use crate::foundation::core::{Affine, Canvas, PaintTransform, Rgba8, Vec2};
pub use crate::foundation::error::{LayerError, PostcardError, PostcardResult};

pub use crate::compose::{ComposeOpts, DEFAULT_CANVAS_SIDE, canvas_size, compose, compose_frame};
pub use crate::deliver::{
    DeliveryChannel, DeliveryReport, DirectoryChannel, RecordingChannel, Sent, deliver_post,
    send_layers_separately,
};
pub use crate::encode::{DEFAULT_JPEG_QUALITY, OutputFormat, encode_frame};
pub use crate::model::{Attributes, Layer, LayerKind, Post, paint_order};
pub use crate::props::{Align, ImageProps, LayerProps, RectProps, TextProps};
pub use crate::render::FrameRGBA;
