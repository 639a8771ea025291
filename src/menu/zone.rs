//! Zone identity, registry construction, and the per-zone static artwork
//! rendered once per session.

use anyhow::{bail, Result};

use crate::config::AppConfig;
use crate::resources::MenuArt;
use crate::surface::{Cell, Surface, GRAY_MAIN};

use super::render;

/// One selectable page of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneType {
    Volume,
    Brightness,
    Save,
    Load,
    AspectRatio,
    ReadWrite,
    Exit,
    Usb,
    Theme,
    Launcher,
    Powerdown,
}

/// Fixed on-screen ordering when every zone is enabled.
pub const ZONE_PRIORITY: &[ZoneType] = &[
    ZoneType::Volume,
    ZoneType::Brightness,
    ZoneType::Save,
    ZoneType::Load,
    ZoneType::AspectRatio,
    ZoneType::ReadWrite,
    ZoneType::Exit,
    ZoneType::Usb,
    ZoneType::Theme,
    ZoneType::Launcher,
    ZoneType::Powerdown,
];

pub const ASPECT_RATIO_NAMES: &[&str] = &["STRETCHED", "ORIGINAL", "4:3", "ZOOMED"];

impl ZoneType {
    /// Zones gated behind the two-step confirmation protocol.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            ZoneType::Save
                | ZoneType::Load
                | ZoneType::Usb
                | ZoneType::Theme
                | ZoneType::Launcher
                | ZoneType::Exit
                | ZoneType::Powerdown
                | ZoneType::ReadWrite
        )
    }

    /// Zones whose bound value reacts to left/right.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            ZoneType::Volume
                | ZoneType::Brightness
                | ZoneType::Save
                | ZoneType::Load
                | ZoneType::AspectRatio
                | ZoneType::Theme
        )
    }
}

/// Build the session's zone list from the runtime capability set,
/// deduplicated and ordered by the priority table. An empty result means
/// the menu cannot open.
pub fn build_zones(enabled: &[ZoneType]) -> Result<Vec<ZoneType>> {
    let zones: Vec<ZoneType> = ZONE_PRIORITY
        .iter()
        .copied()
        .filter(|zone| enabled.contains(zone))
        .collect();
    if zones.is_empty() {
        bail!("no menu zones enabled; the menu cannot open");
    }
    Ok(zones)
}

/// Render a zone's static content (background art plus fixed text) onto a
/// fresh surface. Cached by the session; the dynamic renderer draws over a
/// copy of it every frame.
pub fn render_static(zone: ZoneType, config: &AppConfig, art: &MenuArt) -> Surface {
    let mut surface = Surface::filled(
        config.screen_cols as usize,
        config.screen_rows as usize,
        Cell::BLANK,
    );
    if let Some(bg) = &art.zone_bg {
        surface.blit(bg, 0, 0);
    }

    let title = |surface: &mut Surface, text: &str, offset: i32| {
        let row = render::center_row(surface, offset);
        surface.draw_text_centered(text, row, GRAY_MAIN);
    };

    match zone {
        ZoneType::Volume => {
            title(&mut surface, "VOLUME", -1);
            let bar = render::progress_bar_rect(&surface);
            render::draw_progress_bar(
                &mut surface,
                bar.x,
                bar.y,
                bar.w,
                bar.h,
                0,
                i32::from(100 / config.volume_step),
            );
        }
        ZoneType::Brightness => {
            title(&mut surface, "BRIGHTNESS", -1);
            let bar = render::progress_bar_rect(&surface);
            render::draw_progress_bar(
                &mut surface,
                bar.x,
                bar.y,
                bar.w,
                bar.h,
                0,
                i32::from(100 / config.brightness_step),
            );
        }
        ZoneType::Save => title(&mut surface, "SAVE", -2),
        ZoneType::Load => title(&mut surface, "LOAD", -2),
        ZoneType::AspectRatio => title(&mut surface, "ASPECT RATIO", -1),
        ZoneType::ReadWrite => title(&mut surface, "SET SYSTEM:", -2),
        ZoneType::Exit => title(&mut surface, "EXIT GAME", 0),
        // The mount/eject caption is state-dependent, drawn every frame.
        ZoneType::Usb => {}
        ZoneType::Theme => title(&mut surface, "SET THEME", -2),
        ZoneType::Launcher => {
            title(&mut surface, "SET LAUNCHER", -2);
            title(&mut surface, &config.launcher_label, 0);
        }
        ZoneType::Powerdown => title(&mut surface, "POWERDOWN", 0),
    }

    surface
}
