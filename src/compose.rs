use crate::{
    assets::decode::decode_image_base64,
    attrs,
    encode::{OutputFormat, encode_frame},
    foundation::core::{Canvas, Rgba8},
    foundation::error::{LayerError, PostcardResult},
    model::{Layer, paint_order},
    props::{ImageProps, LayerProps},
    render::{FrameRGBA, cpu::CpuPainter},
};

/// Default canvas side: a square post.
pub const DEFAULT_CANVAS_SIDE: u32 = 1080;

/// Compositor options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeOpts {
    /// Minimum canvas size; layers can only grow it.
    pub default_canvas: Canvas,
    /// Fill painted before any layer.
    pub background: Rgba8,
    /// Encoded output format.
    pub format: OutputFormat,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            default_canvas: Canvas::square(DEFAULT_CANVAS_SIDE),
            background: Rgba8::WHITE,
            format: OutputFormat::default(),
        }
    }
}

impl ComposeOpts {
    /// Return options with a different minimum canvas.
    pub fn with_default_canvas(mut self, canvas: Canvas) -> Self {
        self.default_canvas = canvas;
        self
    }

    /// Return options with a different output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Return options with a different background fill.
    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    /// Defaults overridden by `POSTCARD_CANVAS_SIZE` and `POSTCARD_JPEG_QUALITY`.
    ///
    /// Unset or unparseable variables are ignored.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(side) = std::env::var("POSTCARD_CANVAS_SIZE")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            opts.default_canvas = Canvas::square(side);
        }
        if let Some(quality) = std::env::var("POSTCARD_JPEG_QUALITY")
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|&q| (1..=100).contains(&q))
        {
            opts.format = OutputFormat::Jpeg { quality };
        }
        opts
    }
}

/// Canvas size for `layers`: `default` grown to cover every `x + w` and `y + h`.
///
/// An axis only grows for layers that carry both keys of that axis as JSON numbers. `width` and
/// `height` do not take part.
pub fn canvas_size(layers: &[Layer], default: Canvas) -> Canvas {
    fn extent(layer: &Layer, pos: &str, size: &str) -> Option<f64> {
        let p = attrs::native_number(&layer.attributes, pos)?;
        let s = attrs::native_number(&layer.attributes, size)?;
        let e = (p + s).ceil();
        e.is_finite().then_some(e)
    }

    let mut canvas = default;
    for layer in layers {
        if let Some(right) = extent(layer, "x", "w") {
            if right > f64::from(canvas.width) {
                canvas.width = right.min(f64::from(u32::MAX)) as u32;
            }
        }
        if let Some(bottom) = extent(layer, "y", "h") {
            if bottom > f64::from(canvas.height) {
                canvas.height = bottom.min(f64::from(u32::MAX)) as u32;
            }
        }
    }
    canvas
}

/// Rasterize `layers` onto a fresh canvas.
///
/// Layers are painted in ascending `order_index`, ties in input order. Image layers whose
/// payload is missing or undecodable are logged and skipped. Unknown kinds are skipped.
#[tracing::instrument(level = "debug", skip_all, fields(layers = layers.len()))]
pub fn compose_frame(layers: &[Layer], opts: &ComposeOpts) -> PostcardResult<FrameRGBA> {
    let canvas = canvas_size(layers, opts.default_canvas);
    tracing::debug!(width = canvas.width, height = canvas.height, "canvas sized");

    if canvas.is_empty() {
        // Nothing can be painted; the encoder rejects the empty frame.
        return Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: Vec::new(),
            premultiplied: true,
        });
    }

    let mut painter = CpuPainter::new(canvas)?;
    painter.clear(opts.background);

    for layer in paint_order(layers) {
        match LayerProps::from_layer(layer) {
            LayerProps::Rect(r) => painter.fill_rect(&r),
            LayerProps::Image(img) => {
                if let Err(e) = draw_image_layer(&mut painter, &img) {
                    tracing::warn!(layer = %layer.id, error = %e, "skipping image layer");
                }
            }
            LayerProps::Text(t) => painter.draw_text(&t),
            LayerProps::Ignored { kind } => {
                tracing::debug!(layer = %layer.id, %kind, "ignoring layer of unknown kind");
            }
        }
    }

    Ok(painter.finish())
}

fn draw_image_layer(painter: &mut CpuPainter, img: &ImageProps) -> Result<(), LayerError> {
    let payload = img.payload.as_deref().ok_or(LayerError::MissingPayload)?;
    let prepared = decode_image_base64(payload)?;
    painter.draw_image(&prepared, img.transform())
}

/// Composite `layers` into one encoded image.
///
/// Any error returned here aborts the whole composite; per-layer problems never surface.
pub fn compose(layers: &[Layer], opts: &ComposeOpts) -> PostcardResult<Vec<u8>> {
    let frame = compose_frame(layers, opts)?;
    encode_frame(&frame, opts.format)
}
