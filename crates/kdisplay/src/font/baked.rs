//! Antialiased atlases baked from [`blit32`] while compiling.
//!
//! Every glyph is scaled up 2x. Pixels filling a diagonal step between two
//! lit neighbours get partial intensity, which rounds the staircase edges.
//! The bold atlas widens every stroke by one source column first.

use super::blit32;
use super::{BakedFont, BakedGlyph};

const SCALE: usize = 2;
const COUNT: usize = blit32::GLYPHS.len();

const MASK_COLS: usize = blit32::WIDTH + 1;
const MASK_ROWS: usize = blit32::HEIGHT + blit32::DESCENDER;

const CELL_WIDTH: usize = MASK_COLS * SCALE;
const CELL_HEIGHT: usize = MASK_ROWS * SCALE;
const ATLAS_WIDTH: usize = CELL_WIDTH * COUNT;
const ATLAS_LEN: usize = ATLAS_WIDTH * CELL_HEIGHT;

const ASCENT: usize = blit32::HEIGHT * SCALE;
const LINE_HEIGHT: usize = CELL_HEIGHT + SCALE;

/// Coverage of the corner pixels that smooth a diagonal.
const SMOOTH: u8 = 112;

/// Source pixels of one glyph, bit `row * MASK_COLS + col`.
const fn mask(glyph: u32, bold: bool) -> u64 {
    let mut mask = 0u64;
    let mut row = 0;
    while row < MASK_ROWS {
        let mut col = 0;
        while col < MASK_COLS {
            let lit = blit32::covers(glyph, col, row)
                || (bold && col > 0 && blit32::covers(glyph, col - 1, row));
            if lit {
                mask |= 1u64 << (row * MASK_COLS + col);
            }
            col += 1;
        }
        row += 1;
    }
    mask
}

const fn lit(mask: u64, col: isize, row: isize) -> bool {
    col >= 0
        && row >= 0
        && (col as usize) < MASK_COLS
        && (row as usize) < MASK_ROWS
        && (mask >> (row as usize * MASK_COLS + col as usize)) & 1 != 0
}

const fn intensity(mask: u64, x: usize, y: usize) -> u8 {
    let col = (x / SCALE) as isize;
    let row = (y / SCALE) as isize;
    if lit(mask, col, row) {
        return 255;
    }
    let dx = if x % SCALE == 0 { -1 } else { 1 };
    let dy = if y % SCALE == 0 { -1 } else { 1 };
    if lit(mask, col + dx, row) && lit(mask, col, row + dy) {
        SMOOTH
    } else {
        0
    }
}

const fn bake_bitmap(bold: bool) -> [u8; ATLAS_LEN] {
    let mut bitmap = [0u8; ATLAS_LEN];
    let mut i = 0;
    while i < COUNT {
        let mask = mask(blit32::GLYPHS[i], bold);
        let mut y = 0;
        while y < CELL_HEIGHT {
            let mut x = 0;
            while x < CELL_WIDTH {
                bitmap[y * ATLAS_WIDTH + i * CELL_WIDTH + x] = intensity(mask, x, y);
                x += 1;
            }
            y += 1;
        }
        i += 1;
    }
    bitmap
}

/// Tight box around the lit source pixels; smoothing never leaves it.
const fn bake_glyph(index: usize, bold: bool) -> BakedGlyph {
    let mask = mask(blit32::GLYPHS[index], bold);
    let advance = (CELL_WIDTH + if bold { SCALE } else { 0 }) as i32;
    let origin = (index * CELL_WIDTH) as u16;
    if mask == 0 {
        return BakedGlyph {
            x0: origin,
            y0: 0,
            x1: origin,
            y1: 0,
            xoff: 0,
            yoff: 0,
            xadvance: advance,
        };
    }

    let (mut col_min, mut col_max) = (MASK_COLS, 0);
    let (mut row_min, mut row_max) = (MASK_ROWS, 0);
    let mut row = 0;
    while row < MASK_ROWS {
        let mut col = 0;
        while col < MASK_COLS {
            if lit(mask, col as isize, row as isize) {
                if col < col_min {
                    col_min = col;
                }
                if col > col_max {
                    col_max = col;
                }
                if row < row_min {
                    row_min = row;
                }
                if row > row_max {
                    row_max = row;
                }
            }
            col += 1;
        }
        row += 1;
    }

    BakedGlyph {
        x0: origin + (col_min * SCALE) as u16,
        y0: (row_min * SCALE) as u16,
        x1: origin + ((col_max + 1) * SCALE) as u16,
        y1: ((row_max + 1) * SCALE) as u16,
        xoff: (col_min * SCALE) as i32,
        yoff: (row_min * SCALE) as i32 - ASCENT as i32,
        xadvance: advance,
    }
}

const fn bake_glyphs(bold: bool) -> [BakedGlyph; COUNT] {
    let mut glyphs = [BakedGlyph::EMPTY; COUNT];
    let mut i = 0;
    while i < COUNT {
        glyphs[i] = bake_glyph(i, bold);
        i += 1;
    }
    glyphs
}

static REGULAR_BITMAP: [u8; ATLAS_LEN] = bake_bitmap(false);
static REGULAR_GLYPHS: [BakedGlyph; COUNT] = bake_glyphs(false);
static BOLD_BITMAP: [u8; ATLAS_LEN] = bake_bitmap(true);
static BOLD_GLYPHS: [BakedGlyph; COUNT] = bake_glyphs(true);

pub const REGULAR: BakedFont = BakedFont {
    glyphs: &REGULAR_GLYPHS,
    bitmap: &REGULAR_BITMAP,
    bitmap_width: ATLAS_WIDTH,
    bitmap_height: CELL_HEIGHT,
    first_char: blit32::FIRST_CHAR,
    glyph_height: LINE_HEIGHT,
    ascent: ASCENT,
};

pub const BOLD: BakedFont = BakedFont {
    glyphs: &BOLD_GLYPHS,
    bitmap: &BOLD_BITMAP,
    bitmap_width: ATLAS_WIDTH,
    bitmap_height: CELL_HEIGHT,
    first_char: blit32::FIRST_CHAR,
    glyph_height: LINE_HEIGHT,
    ascent: ASCENT,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(font: &BakedFont, c: char) -> BakedGlyph {
        font.glyphs[(c as u32 - font.first_char) as usize]
    }

    #[test]
    fn space_is_empty_but_advances() {
        let space = glyph(&REGULAR, ' ');
        assert_eq!(space.x0, space.x1);
        assert_eq!(space.xadvance, 12);
        assert_eq!(glyph(&BOLD, ' ').xadvance, 14);
    }

    #[test]
    fn capital_a_box() {
        // 'A' covers all five columns and the six rows above the baseline.
        let a = glyph(&REGULAR, 'A');
        assert_eq!(a.x1 - a.x0, 10);
        assert_eq!(a.y0, 0);
        assert_eq!(a.y1, 12);
        assert_eq!(a.yoff, -12);
        assert_eq!(a.xoff, 0);
    }

    #[test]
    fn descenders_reach_below_the_baseline() {
        let g = glyph(&REGULAR, 'g');
        assert_eq!(g.yoff, -10);
        assert_eq!(g.y1, 14);
        let j = glyph(&REGULAR, 'j');
        assert_eq!(j.y1, 16);
    }

    #[test]
    fn lit_pixels_are_opaque_and_corners_smoothed() {
        let a = glyph(&REGULAR, 'A');
        let at = |x: usize, y: usize| REGULAR.bitmap[y * REGULAR.bitmap_width + a.x0 as usize + x];
        // Apex of 'A' is source column 2, row 0.
        assert_eq!(at(4, 0), 255);
        assert_eq!(at(5, 1), 255);
        // Between the apex and the left leg at (1, 1).
        assert_eq!(at(3, 1), SMOOTH);
        assert_eq!(at(0, 0), 0);
    }

    #[test]
    fn bold_is_wider() {
        let regular = glyph(&REGULAR, 'l');
        let bold = glyph(&BOLD, 'l');
        assert_eq!((bold.x1 - bold.x0) - (regular.x1 - regular.x0), 2);
    }
}
