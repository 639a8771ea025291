//! Session art assets loaded from the resource directory. A missing or
//! unreadable asset degrades to `None` and is skipped at draw time; the menu
//! stays available with reduced visuals.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::surface::{Cell, Surface, GRAY_MAIN};

const ZONE_BG_FILE: &str = "zone_bg.txt";
const ARROW_UP_FILE: &str = "arrow_up.txt";
const ARROW_DOWN_FILE: &str = "arrow_down.txt";

/// Static artwork shared by every zone of one session.
#[derive(Debug, Clone)]
pub struct MenuArt {
    pub zone_bg: Option<Surface>,
    pub arrow_up: Option<Surface>,
    pub arrow_down: Option<Surface>,
}

pub fn load_menu_art(resource_dir: &Path) -> MenuArt {
    MenuArt {
        zone_bg: load_art(&resource_dir.join(ZONE_BG_FILE)),
        arrow_up: load_art(&resource_dir.join(ARROW_UP_FILE)),
        arrow_down: load_art(&resource_dir.join(ARROW_DOWN_FILE)),
    }
}

/// Load one text-art file into a surface. Lines are padded to the widest
/// line; spaces stay background cells.
pub fn load_art(path: &Path) -> Option<Surface> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not load art asset");
            return None;
        }
    };
    let surface = surface_from_text(&text);
    if surface.is_none() {
        warn!(path = %path.display(), "art asset is empty");
    }
    surface
}

pub(crate) fn surface_from_text(text: &str) -> Option<Surface> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let width = lines.iter().map(|line| line.chars().count()).max()?;
    if width == 0 {
        return None;
    }
    let mut surface = Surface::new(width, lines.len());
    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            if ch != ' ' {
                surface.set(x as i32, y as i32, Cell::new(ch, GRAY_MAIN));
            }
        }
    }
    Some(surface)
}
