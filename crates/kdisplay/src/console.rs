//! Framebuffer text console.
//!
//! Text is drawn into a region inset from the canvas edges. A small escape
//! state machine understands the subset of ANSI SGR the kernel logger emits:
//! `ESC [ 3 n m` and `ESC [ 4 n m` pick palette colours, `ESC [ 1 m` selects
//! bold, `ESC [ 0 m` resets, and `ESC [ J` clears the screen. Any other
//! character inside a sequence ends it. `0` and `1` leave the sequence open
//! until that terminator arrives, so the trailing `m` is never drawn.
//!
//! There is no scrollback: running off the bottom clears the canvas and
//! starts again at the top.

use core::{fmt, ptr};

use crate::canvas::{Canvas, Color, Rect};
use crate::fmt::{FORMAT_CAPACITY, FmtBuffer};
use crate::font::{BAKED_FAMILY, FontAtlas, FontFamily};
use crate::utf8::Chars;

/// Colours selected by the digit after `3` or `4` in an escape sequence.
pub const PALETTE: [Color; 8] = [
    Color(0x181818),
    Color(0xFF5794),
    Color(0x66FFA8),
    Color(0xF1FF99),
    Color(0x61A0FF),
    Color(0xD966FF),
    Color(0x66E0FF),
    Color(0xE3E3E3),
];

/// Columns a tab inserts.
const TAB_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct ConsoleConfig {
    /// Gap between the canvas edge and the text region, in pixels.
    pub padding: usize,
    pub fonts: &'static FontFamily,
    pub default_fg: Color,
    pub default_bg: Color,
}

impl ConsoleConfig {
    pub const DEFAULT: Self = Self {
        padding: 40,
        fonts: &BAKED_FAMILY,
        default_fg: PALETTE[7],
        default_bg: PALETTE[0],
    };
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Where the console is inside an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    Default,
    Escape,
    Foreground,
    Background,
}

/// Cursor position inside the text region, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

pub struct Console<'a> {
    canvas: Canvas<'a>,
    region: Rect,
    cursor: Cursor,
    fg: Color,
    bg: Color,
    font: &'static FontAtlas,
    state: EscapeState,
    config: ConsoleConfig,
}

impl<'a> Console<'a> {
    /// Take over `canvas` and clear it to the default background.
    pub fn new(canvas: Canvas<'a>, config: ConsoleConfig) -> Self {
        let region = canvas.bounds().inset(config.padding);
        let fonts = config.fonts;
        let mut console = Self {
            canvas,
            region,
            cursor: Cursor::default(),
            fg: config.default_fg,
            bg: config.default_bg,
            font: &fonts.regular,
            state: EscapeState::Default,
            config,
        };
        console.clear();
        console
    }

    pub fn canvas(&self) -> &Canvas<'a> {
        &self.canvas
    }

    /// The drawable region in canvas coordinates.
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn foreground(&self) -> Color {
        self.fg
    }

    pub fn background(&self) -> Color {
        self.bg
    }

    pub fn state(&self) -> EscapeState {
        self.state
    }

    pub fn is_bold(&self) -> bool {
        ptr::eq(self.font, &self.config.fonts.bold)
    }

    /// Fill the whole canvas with the current background and home the cursor.
    pub fn clear(&mut self) {
        self.canvas.fill(self.bg);
        self.cursor = Cursor::default();
    }

    /// Feed one character through the state machine.
    pub fn put_char(&mut self, c: char) {
        match self.state {
            EscapeState::Default => {}
            EscapeState::Escape => return self.escape(c),
            EscapeState::Foreground => {
                if let Some(color) = palette_entry(c) {
                    self.fg = color;
                }
                self.state = EscapeState::Escape;
                return;
            }
            EscapeState::Background => {
                if let Some(color) = palette_entry(c) {
                    self.bg = color;
                }
                self.state = EscapeState::Escape;
                return;
            }
        }

        match c {
            '\x1b' => self.state = EscapeState::Escape,
            '\n' => self.newline(),
            '\r' => self.carriage_return(),
            '\t' => {
                for _ in 0..TAB_WIDTH {
                    self.draw(' ');
                }
            }
            _ => self.draw(c),
        }
    }

    /// Decode `bytes` as UTF-8 and feed every character through
    /// [`Self::put_char`].
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for decoded in Chars::new(bytes) {
            self.put_char(decoded.as_char());
        }
    }

    /// Format `args` into a bounded buffer, then write it. Returns `true`
    /// if the output was cut at [`FORMAT_CAPACITY`] bytes.
    pub fn print(&mut self, args: fmt::Arguments<'_>) -> bool {
        let buffer = FmtBuffer::<FORMAT_CAPACITY>::format(args);
        self.write_bytes(buffer.as_bytes());
        buffer.is_truncated()
    }

    /// `0` and `1` keep the sequence open so the closing `m` is swallowed.
    fn escape(&mut self, c: char) {
        let fonts = self.config.fonts;
        match c {
            '[' | ';' => {}
            '1' => self.font = &fonts.bold,
            '3' => self.state = EscapeState::Foreground,
            '4' => self.state = EscapeState::Background,
            '0' => {
                self.fg = self.config.default_fg;
                self.bg = self.config.default_bg;
                self.font = &fonts.regular;
            }
            'J' => {
                self.clear();
                self.state = EscapeState::Default;
            }
            _ => self.state = EscapeState::Default,
        }
    }

    fn line_height(&self) -> usize {
        self.font.glyph_height()
    }

    /// Next row, or back to the top of a cleared canvas if that row would
    /// not fit.
    fn newline(&mut self) {
        let line = self.line_height();
        let next = self.cursor.y + line;
        if next + line > self.region.height {
            self.clear();
        } else {
            self.cursor = Cursor { x: 0, y: next };
        }
    }

    fn carriage_return(&mut self) {
        self.cursor.x = 0;
        let band = Rect::new(
            self.region.x,
            self.region.y + self.cursor.y,
            self.region.width,
            self.line_height(),
        );
        self.canvas.fill_rect(band, self.bg);
    }

    /// Characters the font has no glyph for are skipped without moving the
    /// cursor.
    fn draw(&mut self, c: char) {
        let Some(advance) = self.font.advance(c) else {
            return;
        };
        if self.cursor.x + advance > self.region.width {
            self.newline();
        }
        let x = self.region.x + self.cursor.x;
        let y = self.region.y + self.cursor.y;
        self.font.blit(&mut self.canvas, x, y, c, self.fg, self.bg);
        self.cursor.x += advance;
    }
}

fn palette_entry(c: char) -> Option<Color> {
    let index = c.to_digit(10)? as usize;
    PALETTE.get(index).copied()
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
