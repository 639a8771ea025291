//! Host stub: stands in for the emulator that would normally own the
//! screen. Sets up the terminal, paints a fake game frame, and hands
//! control to the overlay session, mapping its exit code back to the shell.

use anyhow::Result;
use clap::Parser;
use pocketmenu::config::AppConfig;
use pocketmenu::doctor::doctor_report;
use pocketmenu::effects::ShellDispatcher;
use pocketmenu::menu::{MenuExit, MenuSession, ZoneValues};
use pocketmenu::screen::Screen;
use pocketmenu::surface::{Cell, Color, Surface};
use pocketmenu::theme::LayoutStore;
use pocketmenu::{init_logging, log_file_path};
use tracing::debug;

fn main() -> Result<()> {
    let mut config = AppConfig::parse();
    config.validate()?;
    init_logging(&config);
    debug!(log = %log_file_path().display(), "pocketmenu starting");

    if config.doctor {
        println!("{}", doctor_report(&config).render());
        return Ok(());
    }

    let layouts = LayoutStore::discover(&config.resource_dir, &config.layout_conf_path());
    let dispatcher = Box::new(ShellDispatcher::from_config(&config));
    let mut session = MenuSession::open(&config, ZoneValues::default(), layouts.as_ref(), dispatcher)?;

    let backdrop = game_backdrop(
        config.screen_cols as usize,
        config.screen_rows as usize,
    );
    let mut screen = Screen::new()?;
    screen.present(&backdrop)?;

    let exit = session.run(&mut screen)?;
    let values = session.close();

    // Put the "game" frame back before giving the terminal up, the way the
    // real host restores its own framebuffer.
    screen.present(&backdrop)?;
    screen.restore();
    drop(screen);

    match exit {
        MenuExit::Closed => println!(
            "menu closed (volume {}%, brightness {}%, slot {})",
            values.volume_percent,
            values.brightness_percent,
            values.save_slot + 1
        ),
        MenuExit::Quit => println!("quit requested"),
        MenuExit::ExitRequested => println!("exit requested by a committed action"),
    }
    Ok(())
}

/// A stand-in for the paused game's framebuffer.
fn game_backdrop(cols: usize, rows: usize) -> Surface {
    let mut surface = Surface::new(cols, rows);
    let dim = Color::rgb(120, 120, 140);
    for y in 0..rows as i32 {
        for x in 0..cols as i32 {
            let ch = if (x + y) % 2 == 0 { '░' } else { '▒' };
            surface.set(x, y, Cell::new(ch, dim));
        }
    }
    surface.draw_text_centered("· PAUSED ·", rows as i32 / 2, Color::rgb(200, 200, 210));
    surface
}
