use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::error::LayerError;

/// Decoded raster ready for painting.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode a standard (padded) base64 payload into raw bytes.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, LayerError> {
    if payload.is_empty() {
        return Err(LayerError::MissingPayload);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Decode an encoded still image; the format is sniffed from the bytes.
pub fn decode_image(bytes: &[u8]) -> Result<PreparedImage, LayerError> {
    let dyn_img = image::load_from_memory(bytes)?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// `decode_base64` followed by `decode_image`.
pub fn decode_image_base64(payload: &str) -> Result<PreparedImage, LayerError> {
    let bytes = decode_base64(payload)?;
    decode_image(&bytes)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * a + 127) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a + 127) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a + 127) / 255) as u8;
    }
}

/// Invert premultiplication, returning straight-alpha RGBA8.
pub fn unpremultiply_rgba8(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return px;
    }
    let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a / 2) / a).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_image_png_dimensions_and_premul() {
        let buf = png_bytes(1, 1, [100, 50, 200, 128]);
        let prepared = decode_image(&buf).unwrap();
        assert_eq!(prepared.width, 1);
        assert_eq!(prepared.height, 1);
        assert_eq!(
            prepared.rgba8_premul.as_slice(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn base64_roundtrip_into_image() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2, [1, 2, 3, 255]));
        let prepared = decode_image_base64(&b64).unwrap();
        assert_eq!((prepared.width, prepared.height), (3, 2));
    }

    #[test]
    fn empty_payload_is_missing() {
        assert!(matches!(decode_base64(""), Err(LayerError::MissingPayload)));
    }

    #[test]
    fn bad_base64_and_bad_raster_are_distinct_errors() {
        assert!(matches!(
            decode_image_base64("not base64!!"),
            Err(LayerError::Base64(_))
        ));
        let not_an_image = base64::engine::general_purpose::STANDARD.encode(b"hello world");
        assert!(matches!(
            decode_image_base64(&not_an_image),
            Err(LayerError::Raster(_))
        ));
    }

    #[test]
    fn unpremultiply_inverts_opaque_and_transparent() {
        assert_eq!(unpremultiply_rgba8([10, 20, 30, 255]), [10, 20, 30, 255]);
        assert_eq!(unpremultiply_rgba8([10, 20, 30, 0]), [0, 0, 0, 0]);
        assert_eq!(unpremultiply_rgba8([64, 0, 128, 128]), [128, 0, 255, 128]);
    }
}
