use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    foundation::core::{Affine, Canvas, PaintTransform, Rgba8},
    foundation::error::{LayerError, PostcardError, PostcardResult},
    props::{RectProps, TextProps},
    render::{
        FrameRGBA,
        glyphs::{dot_rects, text_box},
    },
};

/// Single-use raster surface backed by `vello_cpu`.
///
/// Every draw call sets its own transform and paint before filling, so no state set for one
/// layer survives into the next.
pub struct CpuPainter {
    canvas: Canvas,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

impl CpuPainter {
    /// Allocate a surface of `canvas` size. Fails when a side is zero or exceeds `u16`.
    pub fn new(canvas: Canvas) -> PostcardResult<Self> {
        if canvas.is_empty() {
            return Err(PostcardError::compose(format!(
                "canvas {}x{} has no pixels",
                canvas.width, canvas.height
            )));
        }
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PostcardError::compose("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PostcardError::compose("canvas height exceeds u16"))?;

        Ok(Self {
            canvas,
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
        })
    }

    /// Cover the whole surface with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        self.reset();
        self.ctx.set_paint(color.to_cpu());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, r: &RectProps) {
        self.reset();
        self.ctx.set_paint(r.color.to_cpu());
        let rect = vello_cpu::kurbo::Rect::new(r.x, r.y, r.x + r.width, r.y + r.height).abs();
        self.ctx.fill_rect(&rect);
    }

    /// Paint `img` with its top-left corner at the transform's origin.
    pub fn draw_image(
        &mut self,
        img: &PreparedImage,
        transform: PaintTransform,
    ) -> Result<(), LayerError> {
        if transform.is_invisible() {
            tracing::debug!(?transform, "image layer is invisible, nothing to paint");
            return Ok(());
        }

        let pixmap = image_premul_bytes_to_pixmap(&img.rgba8_premul, img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.reset();
        self.ctx.set_transform(affine_to_cpu(transform.affine()));
        self.ctx.set_paint(paint);
        let faded = transform.alpha < 1.0;
        if faded {
            self.ctx.push_opacity_layer(transform.alpha);
        }
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));
        if faded {
            self.ctx.pop_layer();
        }
        Ok(())
    }

    /// Paint a line of bitmap text.
    pub fn draw_text(&mut self, t: &TextProps) {
        let Some(tb) = text_box(t) else {
            return;
        };
        self.reset();
        self.ctx.set_paint(t.color.to_cpu());
        for r in dot_rects(&t.text, &tb) {
            self.ctx
                .fill_rect(&vello_cpu::kurbo::Rect::new(r.x, r.y, r.x + r.w, r.y + r.h));
        }
    }

    /// Rasterize everything painted so far and read the pixels back.
    pub fn finish(mut self) -> FrameRGBA {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn reset(&mut self) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> Result<vello_cpu::Pixmap, LayerError> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LayerError::Unpaintable(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LayerError::Unpaintable(format!("image height {height} exceeds u16")))?;
    if w == 0 || h == 0 {
        return Err(LayerError::Unpaintable("image has no pixels".to_owned()));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(LayerError::Unpaintable(
            "prepared image byte length mismatch".to_owned(),
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
