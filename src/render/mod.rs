use crate::assets::decode::unpremultiply_rgba8;

pub(crate) mod cpu;
pub(crate) mod glyphs;

/// A rendered canvas as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha RGBA8 at `(x, y)`, or `None` when out of bounds or missing.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px: [u8; 4] = self.data.get(i..i + 4)?.try_into().ok()?;
        Some(if self.premultiplied {
            unpremultiply_rgba8(px)
        } else {
            px
        })
    }

    /// Copy into a straight-alpha `image` buffer.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let un = unpremultiply_rgba8([px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&un);
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
    }
}
