//! Owned cell-grid surfaces and the clipped drawing primitives the menu
//! composes frames with. The menu core never talks to a real display; it
//! only ever draws onto these.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 24-bit color carried per cell so the presenter can map it to whatever the
/// host display supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Ink tone used for zone titles, captions, and filled bars.
pub const GRAY_MAIN: Color = Color::rgb(85, 85, 85);
/// Paper tone used for backgrounds and hollow bar interiors.
pub const WHITE_MAIN: Color = Color::rgb(236, 236, 236);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
}

impl Cell {
    pub const fn new(ch: char, fg: Color) -> Self {
        Self { ch, fg }
    }

    pub const BLANK: Cell = Cell::new(' ', WHITE_MAIN);
}

/// Rectangle in cell coordinates. Signed so callers can express positions
/// partially off a surface; every drawing primitive clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::BLANK)
    }

    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width + x as usize])
    }

    /// Out-of-bounds writes are dropped, not errors.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = cell;
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, cell: Cell) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        for yy in y0..y1 {
            for xx in x0..x1 {
                self.cells[yy as usize * self.width + xx as usize] = cell;
            }
        }
    }

    /// Copy `src` onto this surface with its top-left corner at (dx, dy),
    /// clipped to this surface's bounds. Negative offsets show a partial
    /// source, which is what the scroll animation relies on.
    pub fn blit(&mut self, src: &Surface, dx: i32, dy: i32) {
        for sy in 0..src.height as i32 {
            for sx in 0..src.width as i32 {
                if let Some(cell) = src.get(sx, sy) {
                    self.set(dx + sx, dy + sy, cell);
                }
            }
        }
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        let mut cx = x;
        for ch in text.chars() {
            self.set(cx, y, Cell::new(ch, color));
            cx += UnicodeWidthChar::width(ch).unwrap_or(1).max(1) as i32;
        }
    }

    pub fn draw_text_centered(&mut self, text: &str, y: i32, color: Color) {
        let text_width = UnicodeWidthStr::width(text) as i32;
        self.draw_text((self.width as i32 - text_width) / 2, y, text, color);
    }
}
