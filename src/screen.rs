//! Terminal presenter: the handheld's fixed logical screen, centered in a
//! real terminal. The menu core only ever sees `Surface`s; this is the one
//! place cells become a display.

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::Color as TermColor,
    widgets::Widget,
    Terminal,
};

use crate::surface::Surface;
use crate::terminal_restore::TerminalRestoreGuard;

pub struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    guard: TerminalRestoreGuard,
}

impl Screen {
    /// Take over the terminal: raw mode + alternate screen, restored by the
    /// guard on drop or panic.
    pub fn new() -> Result<Self> {
        let guard = TerminalRestoreGuard::new();
        guard.enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        guard
            .enter_alt_screen(&mut stdout)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(Self { terminal, guard })
    }

    pub fn present(&mut self, frame: &Surface) -> Result<()> {
        self.terminal
            .draw(|f| f.render_widget(SurfaceWidget(frame), f.size()))
            .context("failed to present frame")?;
        Ok(())
    }

    pub fn restore(&self) {
        self.guard.restore();
    }
}

struct SurfaceWidget<'a>(&'a Surface);

impl Widget for SurfaceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let src = self.0;
        let x0 = area.x + area.width.saturating_sub(src.width() as u16) / 2;
        let y0 = area.y + area.height.saturating_sub(src.height() as u16) / 2;
        for y in 0..src.height() {
            for x in 0..src.width() {
                let Some(cell) = src.get(x as i32, y as i32) else {
                    continue;
                };
                let tx = x0 + x as u16;
                let ty = y0 + y as u16;
                if tx >= area.right() || ty >= area.bottom() {
                    continue;
                }
                let target = buf.get_mut(tx, ty);
                target.set_char(cell.ch);
                target.set_fg(TermColor::Rgb(cell.fg.r, cell.fg.g, cell.fg.b));
            }
        }
    }
}
