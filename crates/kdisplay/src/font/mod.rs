//! Font atlases.
//!
//! Two representations exist: fixed monochrome stamps ([`BitmapFont`]) and
//! antialiased atlases with per-glyph metrics ([`BakedFont`]). The console
//! only sees [`FontAtlas`], which measures and blits either kind.

pub mod baked;
pub mod blit32;

use crate::canvas::{Canvas, Color, Rect};

/// Monochrome 5x6 stamps, drawn as one square per set bit.
#[derive(Debug, Clone, Copy)]
pub struct BitmapFont {
    pub glyphs: &'static [u32],
    pub first_char: u32,
    /// Screen pixels per font pixel.
    pub scale: usize,
    /// Draw every set bit twice, one column apart.
    pub bold: bool,
}

impl BitmapFont {
    pub const fn glyph_height(&self) -> usize {
        (blit32::HEIGHT + blit32::DESCENDER + 1) * self.scale
    }

    pub const fn advance(&self) -> usize {
        (blit32::WIDTH + 1 + self.bold as usize) * self.scale
    }

    fn glyph(&self, c: char) -> Option<u32> {
        let index = (c as u32).checked_sub(self.first_char)?;
        self.glyphs.get(index as usize).copied()
    }

    fn blit(&self, canvas: &mut Canvas<'_>, x: usize, y: usize, glyph: u32, fg: Color) {
        let spread = if self.bold { 2 } else { 1 };
        for row in 0..blit32::HEIGHT + blit32::DESCENDER {
            for col in 0..blit32::WIDTH {
                if !blit32::covers(glyph, col, row) {
                    continue;
                }
                for extra in 0..spread {
                    let square = Rect::new(
                        x + (col + extra) * self.scale,
                        y + row * self.scale,
                        self.scale,
                        self.scale,
                    );
                    canvas.fill_rect(square, fg);
                }
            }
        }
    }
}

/// Placement of one glyph inside a [`BakedFont`] bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BakedGlyph {
    /// Bounding box in the atlas bitmap.
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
    /// Offset of the box from the pen position; `yoff` is relative to the
    /// baseline.
    pub xoff: i32,
    pub yoff: i32,
    pub xadvance: i32,
}

impl BakedGlyph {
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
        xoff: 0,
        yoff: 0,
        xadvance: 0,
    };
}

/// Variable-width atlas with an intensity bitmap.
#[derive(Debug, Clone, Copy)]
pub struct BakedFont {
    pub glyphs: &'static [BakedGlyph],
    pub bitmap: &'static [u8],
    pub bitmap_width: usize,
    pub bitmap_height: usize,
    pub first_char: u32,
    /// Line height.
    pub glyph_height: usize,
    /// Distance from the top of a line to the baseline.
    pub ascent: usize,
}

impl BakedFont {
    fn glyph(&self, c: char) -> Option<&BakedGlyph> {
        let index = (c as u32).checked_sub(self.first_char)?;
        self.glyphs.get(index as usize)
    }

    fn blit(&self, canvas: &mut Canvas<'_>, x: usize, y: usize, glyph: &BakedGlyph, fg: Color) {
        let left = x as isize + glyph.xoff as isize;
        let top = y as isize + self.ascent as isize + glyph.yoff as isize;
        for by in glyph.y0 as usize..glyph.y1 as usize {
            let py = top + (by - glyph.y0 as usize) as isize;
            for bx in glyph.x0 as usize..glyph.x1 as usize {
                let px = left + (bx - glyph.x0 as usize) as isize;
                let Some(&alpha) = self.bitmap.get(by * self.bitmap_width + bx) else {
                    continue;
                };
                if px >= 0 && py >= 0 {
                    canvas.blend_pixel(px as usize, py as usize, fg, alpha);
                }
            }
        }
    }
}

/// Either font representation, behind one measure/blit interface.
#[derive(Debug, Clone, Copy)]
pub enum FontAtlas {
    Bitmap(BitmapFont),
    Baked(BakedFont),
}

impl FontAtlas {
    /// Height of one text line.
    pub fn glyph_height(&self) -> usize {
        match self {
            Self::Bitmap(font) => font.glyph_height(),
            Self::Baked(font) => font.glyph_height,
        }
    }

    /// Horizontal advance for `c`, or `None` if the atlas has no glyph for it.
    pub fn advance(&self, c: char) -> Option<usize> {
        match self {
            Self::Bitmap(font) => font.glyph(c).map(|_| font.advance()),
            Self::Baked(font) => font.glyph(c).map(|g| g.xadvance.max(0) as usize),
        }
    }

    /// Draw `c` with its cell's top-left corner at `(x, y)`: the cell
    /// (advance by line height) is filled with `bg`, then the glyph is drawn
    /// in `fg`. Returns the advance, or `None` without drawing anything if
    /// the glyph is missing.
    pub fn blit(
        &self,
        canvas: &mut Canvas<'_>,
        x: usize,
        y: usize,
        c: char,
        fg: Color,
        bg: Color,
    ) -> Option<usize> {
        let advance = self.advance(c)?;
        canvas.fill_rect(Rect::new(x, y, advance, self.glyph_height()), bg);
        match self {
            Self::Bitmap(font) => font.blit(canvas, x, y, font.glyph(c)?, fg),
            Self::Baked(font) => font.blit(canvas, x, y, font.glyph(c)?, fg),
        }
        Some(advance)
    }
}

/// Regular and bold members of one typeface.
#[derive(Debug, Clone, Copy)]
pub struct FontFamily {
    pub regular: FontAtlas,
    pub bold: FontAtlas,
}

pub static BAKED_FAMILY: FontFamily = FontFamily {
    regular: FontAtlas::Baked(baked::REGULAR),
    bold: FontAtlas::Baked(baked::BOLD),
};

pub static BITMAP_FAMILY: FontFamily = FontFamily {
    regular: FontAtlas::Bitmap(BitmapFont {
        glyphs: &blit32::GLYPHS,
        first_char: blit32::FIRST_CHAR,
        scale: 2,
        bold: false,
    }),
    bold: FontAtlas::Bitmap(BitmapFont {
        glyphs: &blit32::GLYPHS,
        first_char: blit32::FIRST_CHAR,
        scale: 2,
        bold: true,
    }),
};
