//! Pixel canvas over a linear 32-bit framebuffer.

/// A 0x00RRGGBB pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// `self` drawn over `under` with coverage `alpha` (0 keeps `under`,
    /// 255 is fully `self`).
    pub const fn blend_over(self, under: Color, alpha: u8) -> Color {
        const fn mix(top: u8, bottom: u8, alpha: u8) -> u8 {
            let a = alpha as u32;
            ((top as u32 * a + bottom as u32 * (255 - a) + 127) / 255) as u8
        }
        Color::rgb(
            mix(self.r(), under.r(), alpha),
            mix(self.g(), under.g(), alpha),
            mix(self.b(), under.b(), alpha),
        )
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `self` shrunk by `by` pixels on every side.
    pub const fn inset(self, by: usize) -> Self {
        let width = self.width.saturating_sub(2 * by);
        let height = self.height.saturating_sub(2 * by);
        Self::new(self.x + by, self.y + by, width, height)
    }
}

/// Borrowed pixel storage with a row stride (in pixels) that may exceed the
/// visible width.
pub struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> Canvas<'a> {
    /// Wrap `pixels`. Returns `None` for an empty geometry, when
    /// `stride < width`, or when the slice is too short.
    pub fn new(pixels: &'a mut [u32], width: usize, height: usize, stride: usize) -> Option<Self> {
        if width == 0 || height == 0 || stride < width {
            return None;
        }
        if pixels.len() < stride.checked_mul(height)? {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// Wrap raw framebuffer memory.
    ///
    /// # Safety
    ///
    /// `base` must point to at least `stride * height` writable `u32` pixels
    /// that nothing else accesses for `'a`.
    pub unsafe fn from_raw(base: *mut u32, width: usize, height: usize, stride: usize) -> Option<Self> {
        if base.is_null() || width == 0 || height == 0 || stride < width {
            return None;
        }
        let len = stride.checked_mul(height)?;
        let pixels = unsafe { core::slice::from_raw_parts_mut(base, len) };
        Self::new(pixels, width, height, stride)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color(self.pixels[y * self.stride + x]))
        } else {
            None
        }
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.stride + x] = color.0;
        }
    }

    pub fn fill(&mut self, color: Color) {
        let (width, stride) = (self.width, self.stride);
        for row in self.pixels.chunks_mut(stride).take(self.height) {
            row[..width].fill(color.0);
        }
    }

    /// Fill `rect`, clipped to the canvas.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = rect.x.saturating_add(rect.width).min(self.width);
        let y1 = rect.y.saturating_add(rect.height).min(self.height);
        for y in y0..y1 {
            let row = y * self.stride;
            self.pixels[row + x0..row + x1].fill(color.0);
        }
    }

    /// Blend `color` with coverage `alpha` over the pixel already there.
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Color, alpha: u8) {
        match alpha {
            0 => {}
            255 => self.put_pixel(x, y, color),
            _ => {
                if let Some(under) = self.pixel(x, y) {
                    self.put_pixel(x, y, color.blend_over(under, alpha));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;

    #[test]
    fn rejects_short_storage() {
        let mut pixels = vec![0; 10];
        assert!(Canvas::new(&mut pixels, 4, 3, 4).is_none());
        assert!(Canvas::new(&mut pixels, 4, 2, 3).is_none());
        assert!(Canvas::new(&mut pixels, 4, 2, 5).is_some());
    }

    #[test]
    fn rejects_empty_geometry() {
        assert!(Canvas::new(&mut [], 0, 10, 0).is_none());
        assert!(Canvas::new(&mut [], 0, 0, 0).is_none());
        let mut pixels = vec![0; 16];
        assert!(Canvas::new(&mut pixels, 4, 0, 4).is_none());
        assert!(Canvas::new(&mut pixels, 0, 4, 4).is_none());

        let base = pixels.as_mut_ptr();
        // SAFETY: `base` covers 16 pixels and the geometry is rejected
        // before any slice is built.
        assert!(unsafe { Canvas::from_raw(base, 0, 10, 0) }.is_none());
        assert!(unsafe { Canvas::from_raw(base, 4, 0, 4) }.is_none());
    }

    #[test]
    fn fill_leaves_stride_padding_alone() {
        let mut pixels = vec![7; 6 * 2];
        let mut canvas = Canvas::new(&mut pixels, 4, 2, 6).unwrap();
        canvas.fill(Color(1));
        assert_eq!(pixels, [1, 1, 1, 1, 7, 7, 1, 1, 1, 1, 7, 7]);
    }

    #[test]
    fn fill_rect_clips() {
        let mut pixels = vec![0; 16];
        let mut canvas = Canvas::new(&mut pixels, 4, 4, 4).unwrap();
        canvas.fill_rect(Rect::new(2, 3, 10, 10), Color(9));
        assert_eq!(canvas.pixel(1, 3), Some(Color(0)));
        assert_eq!(canvas.pixel(2, 3), Some(Color(9)));
        assert_eq!(canvas.pixel(3, 3), Some(Color(9)));
        assert_eq!(canvas.pixel(3, 2), Some(Color(0)));
        canvas.fill_rect(Rect::new(9, 9, 1, 1), Color(5));
        assert_eq!(canvas.pixel(4, 4), None);
    }

    #[test]
    fn blend_mixes_with_existing_pixel() {
        let mut pixels = vec![0; 1];
        let mut canvas = Canvas::new(&mut pixels, 1, 1, 1).unwrap();
        canvas.put_pixel(0, 0, Color::rgb(0, 0, 200));
        canvas.blend_pixel(0, 0, Color::rgb(255, 0, 0), 128);
        assert_eq!(canvas.pixel(0, 0), Some(Color::rgb(128, 0, 100)));

        canvas.blend_pixel(0, 0, Color::WHITE, 0);
        assert_eq!(canvas.pixel(0, 0), Some(Color::rgb(128, 0, 100)));
        canvas.blend_pixel(0, 0, Color::WHITE, 255);
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn inset_shrinks_both_sides() {
        assert_eq!(Rect::new(0, 0, 100, 50).inset(10), Rect::new(10, 10, 80, 30));
        assert_eq!(Rect::new(0, 0, 10, 10).inset(10), Rect::new(10, 10, 0, 0));
    }
}
