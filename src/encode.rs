use std::io::Cursor;

use crate::{
    foundation::error::{PostcardError, PostcardResult},
    render::FrameRGBA,
};

/// Default JPEG quality; good enough for chat delivery.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Compressed still-image format of the composited post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG; alpha is dropped.
    Jpeg {
        /// Quality in `1..=100`.
        quality: u8,
    },
    /// Lossless PNG with alpha.
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

/// Encode a rendered frame.
pub fn encode_frame(frame: &FrameRGBA, format: OutputFormat) -> PostcardResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(PostcardError::encode(format!(
            "cannot encode empty {}x{} surface",
            frame.width, frame.height
        )));
    }
    let rgba = frame
        .to_rgba_image()
        .ok_or_else(|| PostcardError::encode("frame byte length does not match its size"))?;

    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut buf,
                quality.clamp(1, 100),
            );
            encoder
                .encode_image(&rgb)
                .map_err(|e| PostcardError::encode(format!("jpeg: {e}")))?;
        }
        OutputFormat::Png => {
            image::DynamicImage::ImageRgba8(rgba)
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| PostcardError::encode(format!("png: {e}")))?;
        }
    }
    Ok(buf)
}
