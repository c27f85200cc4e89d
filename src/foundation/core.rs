pub use kurbo::{Affine, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Square canvas of `side` pixels.
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is fully opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Placement of one paint operation: translate, then uniform scale, then global alpha.
///
/// Values are built per layer and handed to the rasterizer by value, so nothing set for one
/// layer can be observed by the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintTransform {
    /// Translation applied first.
    pub translate: Vec2,
    /// Uniform scale applied after translation.
    pub scale: f64,
    /// Global alpha multiplier in `0..=1`.
    pub alpha: f32,
}

impl Default for PaintTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PaintTransform {
    /// No translation, unit scale, fully opaque.
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
        alpha: 1.0,
    };

    /// Translation only.
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    /// Return a copy with a uniform scale.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Return a copy with a global alpha, clamped into `0..=1`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let alpha = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
        Self {
            alpha: alpha as f32,
            ..self
        }
    }

    /// Affine mapping layer-local coordinates to canvas coordinates.
    pub fn affine(self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    /// Return `true` when painting with this transform would leave the canvas untouched.
    pub fn is_invisible(self) -> bool {
        self.alpha <= 0.0 || !self.scale.is_finite() || self.scale <= 0.0
    }
}
