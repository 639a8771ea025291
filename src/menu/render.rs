//! Per-frame rendering: scroll compositing between zone surfaces, dynamic
//! captions and progress bars for the settled zone, and the navigation
//! arrows. Pure functions of state onto a target surface.

use crate::resources::MenuArt;
use crate::surface::{Cell, Rect, Surface, GRAY_MAIN, WHITE_MAIN};

use super::state::MenuState;
use super::zone::{ZoneType, ASPECT_RATIO_NAMES};

/// Rows between caption slots, mirrored around the zone center.
pub(crate) const PADDING_ROWS: i32 = 2;
const PROGRESS_BAR_HEIGHT: i32 = 3;
const THEME_NAME_MAX_CHARS: usize = 15;

pub(crate) fn center_row(surface: &Surface, offset: i32) -> i32 {
    surface.height() as i32 / 2 + offset * PADDING_ROWS
}

/// Where the volume/brightness bar lives inside a zone surface.
pub(crate) fn progress_bar_rect(surface: &Surface) -> Rect {
    let width = (surface.width() as i32 - 8).clamp(5, 40);
    Rect {
        x: (surface.width() as i32 - width) / 2,
        y: center_row(surface, 1) - 1,
        w: width,
        h: PROGRESS_BAR_HEIGHT,
    }
}

/// Segmented percentage bar: filled bars are solid, unfilled bars hollow
/// with a one-cell border, laid out left-to-right with a 3:1 bar-to-padding
/// ratio. Geometry is clamped to the destination surface before any cell is
/// touched.
pub(crate) fn draw_progress_bar(
    surface: &mut Surface,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    percentage: u8,
    bars: i32,
) {
    let line_width = 1;
    let padding_ratio = 3;
    let percentage = i32::from(percentage.min(100));
    let surface_w = surface.width() as i32;
    let surface_h = surface.height() as i32;

    let x = x.clamp(0, surface_w - 1);
    let y = y.clamp(0, surface_h - 1);
    let width = width.max(line_width * 2 + 1).min(surface_w - x - 1);
    let height = height.max(line_width * 2 + 1).min(surface_h - y - 1);

    let bars_max = (width * padding_ratio / (line_width * 2 + 1) + 1) / (padding_ratio + 1);
    let bars = bars.clamp(1, bars_max.max(1));
    let bar_width = ((width / bars) * padding_ratio / (padding_ratio + 1)).max(line_width * 2 + 1);
    let bar_padding = bar_width / padding_ratio;
    let full_bars = bars * percentage / 100;

    let ink = Cell::new('█', GRAY_MAIN);
    let paper = Cell::new(' ', WHITE_MAIN);
    for i in 0..full_bars {
        surface.fill_rect(x + i * (bar_width + bar_padding), y, bar_width, height, ink);
    }
    for i in full_bars..bars {
        let bar_x = x + i * (bar_width + bar_padding);
        surface.fill_rect(bar_x, y, bar_width, height, ink);
        surface.fill_rect(
            bar_x + line_width,
            y + line_width,
            bar_width - line_width * 2,
            height - line_width * 2,
            paper,
        );
    }
}

/// Compose one frame: the scrolling zone pair during a transition, or the
/// settled zone plus its dynamic content, plus the nav arrows.
pub fn compose_frame(state: &MenuState, statics: &[Surface], art: &MenuArt, out: &mut Surface) {
    out.fill(Cell::BLANK);
    let height = out.height() as i32;
    let scroll = state.scroll();
    let previous = &statics[state.previous_index()];
    let current = &statics[state.current_index()];

    if scroll > 0 {
        // Travelling down: the old zone slides up, the new one rises from
        // the bottom edge.
        out.blit(previous, 0, -scroll);
        out.blit(current, 0, height - scroll);
    } else if scroll < 0 {
        out.blit(previous, 0, -scroll);
        out.blit(current, 0, -height - scroll);
    } else {
        out.blit(current, 0, 0);
        render_zone_dynamic(state, out);
    }

    if scroll == 0 && !state.values().usb_sharing {
        draw_arrows(art, out);
    }
}

/// Everything that changes per frame or per input for the settled zone.
pub fn render_zone_dynamic(state: &MenuState, out: &mut Surface) {
    let values = state.values();
    let action = state.action_in_progress();
    let confirmation = state.confirmation_pending();

    let caption = |out: &mut Surface, text: &str, offset: i32| {
        let row = center_row(out, offset);
        out.draw_text_centered(text, row, GRAY_MAIN);
    };

    match state.current_zone() {
        ZoneType::Volume => {
            let bar = progress_bar_rect(out);
            draw_progress_bar(
                out,
                bar.x,
                bar.y,
                bar.w,
                bar.h,
                values.volume_percent,
                i32::from(100 / state.volume_step()),
            );
        }
        ZoneType::Brightness => {
            let bar = progress_bar_rect(out);
            draw_progress_bar(
                out,
                bar.x,
                bar.y,
                bar.w,
                bar.h,
                values.brightness_percent,
                i32::from(100 / state.brightness_step()),
            );
        }
        ZoneType::Save => {
            caption(out, &format!("IN SLOT   < {} >", values.save_slot + 1), 0);
            if action {
                caption(out, "Saving...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
        ZoneType::Load => {
            caption(out, &format!("FROM SLOT   < {} >", values.save_slot + 1), 0);
            if action {
                caption(out, "Loading...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
        ZoneType::AspectRatio => {
            let name = ASPECT_RATIO_NAMES[values.aspect_ratio % ASPECT_RATIO_NAMES.len()];
            caption(out, &format!("<   {name}   >"), 1);
        }
        ZoneType::Usb => {
            let verb = if values.usb_sharing { "EJECT" } else { "MOUNT" };
            caption(out, &format!("{verb} USB"), 0);
            if action {
                caption(out, "in progress ...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
        ZoneType::Theme => {
            let name = truncate_name(state.layout_name().unwrap_or("none"));
            caption(out, &format!("< {name} >"), 0);
            if action {
                caption(out, "In progress...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
        ZoneType::Launcher => {
            if action {
                caption(out, "In progress...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
        ZoneType::ReadWrite => {
            let target = if values.read_write {
                "READ-ONLY"
            } else {
                "READ-WRITE"
            };
            caption(out, target, 0);
            if action {
                caption(out, "in progress ...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
        ZoneType::Exit | ZoneType::Powerdown => {
            if action {
                caption(out, "Shutting down...", 2);
            } else if confirmation {
                caption(out, "Are you sure?", 2);
            }
        }
    }
}

fn draw_arrows(art: &MenuArt, out: &mut Surface) {
    if let Some(arrow) = &art.arrow_up {
        let x = (out.width() as i32 - arrow.width() as i32) / 2;
        out.blit(arrow, x, 0);
    }
    if let Some(arrow) = &art.arrow_down {
        let x = (out.width() as i32 - arrow.width() as i32) / 2;
        let y = out.height() as i32 - arrow.height() as i32;
        out.blit(arrow, x, y);
    }
}

/// Theme names longer than the zone can show are cut with a `...` marker.
fn truncate_name(name: &str) -> String {
    if name.chars().count() > THEME_NAME_MAX_CHARS {
        let cut: String = name.chars().take(THEME_NAME_MAX_CHARS - 2).collect();
        format!("{cut}...")
    } else {
        name.to_string()
    }
}
