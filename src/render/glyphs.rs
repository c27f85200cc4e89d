//! Fixed-width 8x8 bitmap typeface.
//!
//! Glyphs come from `font8x8`. A glyph cell is 8x8 dots; caps occupy rows 0..7 and the baseline
//! sits below row 6, leaving row 7 for descenders. One dot is `font_size / 8` pixels square.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts as _};

use crate::props::{Align, TextProps};

/// Dots per glyph side.
pub const CELL_DOTS: usize = 8;
/// Dots from the top of the cell to the baseline.
pub const ASCENT_DOTS: usize = 7;

/// Axis-aligned box in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// Placement of a line of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBox {
    /// Left edge of the first cell.
    pub left: f64,
    /// Top edge of the cells.
    pub top: f64,
    /// Pixel size of one dot.
    pub dot: f64,
    /// Total width.
    pub width: f64,
    /// Total height (one cell).
    pub height: f64,
}

fn glyph_rows(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Box occupied by `props.text`, anchored per `props.align`.
///
/// Returns `None` when nothing would be drawn (empty text or a non-positive size).
pub fn text_box(props: &TextProps) -> Option<TextBox> {
    if props.text.is_empty() || !props.font_size.is_finite() || props.font_size <= 0.0 {
        return None;
    }
    let dot = props.font_size / CELL_DOTS as f64;
    let width = (props.text.chars().count() * CELL_DOTS) as f64 * dot;
    let height = props.font_size;

    let (left, top) = match props.align {
        Align::Left => (props.x, props.y - ASCENT_DOTS as f64 * dot),
        Align::Center => (props.x - width / 2.0, props.y - height / 2.0),
        Align::Right => (props.x - width, props.y - height / 2.0),
    };

    Some(TextBox {
        left,
        top,
        dot,
        width,
        height,
    })
}

/// Rectangles covering every lit dot of `text` inside `tb`.
///
/// Horizontally adjacent dots in a glyph row are merged into one rectangle.
pub fn dot_rects(text: &str, tb: &TextBox) -> Vec<DotRect> {
    let mut out = Vec::new();
    for (i, ch) in text.chars().enumerate() {
        let cell_left = tb.left + (i * CELL_DOTS) as f64 * tb.dot;
        for (row_idx, row) in glyph_rows(ch).into_iter().enumerate() {
            let y = tb.top + row_idx as f64 * tb.dot;
            let mut col = 0;
            while col < CELL_DOTS {
                if (row >> col) & 1 == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < CELL_DOTS && (row >> col) & 1 == 1 {
                    col += 1;
                }
                out.push(DotRect {
                    x: cell_left + start as f64 * tb.dot,
                    y,
                    w: (col - start) as f64 * tb.dot,
                    h: tb.dot,
                });
            }
        }
    }
    out
}
