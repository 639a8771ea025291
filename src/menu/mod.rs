//! Menu session lifecycle and the fixed-rate frame driver.
//!
//! A session is opened over the host's screen, runs its own cooperative
//! single-threaded loop until the player leaves (or a committed action ends
//! it), and hands the per-zone values back to the host on close.

mod render;
mod state;
mod zone;

#[cfg(test)]
mod tests;

pub use render::compose_frame;
pub use state::{InputOutcome, MenuInput, MenuState, SessionEvent, ZoneValues};
pub use zone::{build_zones, ZoneType, ASPECT_RATIO_NAMES, ZONE_PRIORITY};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::effects::{Dispatcher, SideEffect};
use crate::resources::{self, MenuArt};
use crate::screen::Screen;
use crate::surface::Surface;
use crate::theme::LayoutStore;

/// How a finished session should be interpreted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    /// Player closed the menu (or a save/load committed); resume the game.
    Closed,
    /// The host received a quit event while the menu was up.
    Quit,
    /// A committed action wants a host-level exit (back to launcher,
    /// frontend restart, power-off).
    ExitRequested,
}

/// Clonable handle asking a running session to stop at the next frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

pub struct MenuSession {
    config: AppConfig,
    state: MenuState,
    statics: Vec<Surface>,
    art: MenuArt,
    stop: StopHandle,
    dispatcher: Box<dyn Dispatcher>,
}

impl MenuSession {
    /// Build the zone registry, render the static zone surfaces, and refresh
    /// system-owned values. Fails when the registry comes out empty.
    pub fn open(
        config: &AppConfig,
        values: ZoneValues,
        layouts: Option<&LayoutStore>,
        mut dispatcher: Box<dyn Dispatcher>,
    ) -> Result<Self> {
        let mut enabled = config.enabled_zones();
        if layouts.map_or(true, LayoutStore::is_empty) {
            if enabled.contains(&ZoneType::Theme) {
                debug!("theme zone disabled: no layouts available");
            }
            enabled.retain(|z| *z != ZoneType::Theme);
        }
        let zones = zone::build_zones(&enabled).context("cannot open menu")?;

        let art = resources::load_menu_art(&config.resource_dir);
        let statics = zones
            .iter()
            .map(|z| zone::render_static(*z, config, &art))
            .collect();

        let mut state = MenuState::new(zones, values, layouts, config);
        state.refresh_system_values(dispatcher.as_mut());

        Ok(Self {
            config: config.clone(),
            state,
            statics,
            art,
            stop: StopHandle::default(),
            dispatcher,
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Run the fixed-rate loop until the session ends. Blocks the calling
    /// thread; a dispatched side effect blocks the loop behind its committed
    /// frame, by contract.
    pub fn run(&mut self, screen: &mut Screen) -> Result<MenuExit> {
        let zone_height = i32::from(self.config.screen_rows);
        let scroll_speed = i32::from(self.config.scroll_speed);
        let frame_budget = Duration::from_millis(1000 / u64::from(self.config.fps));
        let mut frame = Surface::new(
            self.config.screen_cols as usize,
            self.config.screen_rows as usize,
        );
        let mut redraw = true;
        let mut previous_frame = Instant::now();
        let mut exit: Option<MenuExit> = None;

        while exit.is_none() {
            if self.stop.take() {
                exit = Some(MenuExit::Closed);
                break;
            }

            // Input is not polled mid-scroll: at most one pending navigation
            // transition exists at a time.
            if !self.state.is_scrolling() {
                while event::poll(Duration::ZERO).context("failed to poll input events")? {
                    match event::read().context("failed to read input event")? {
                        Event::Key(key) if key.kind != KeyEventKind::Release => {
                            if let Some(input) = map_key(key) {
                                match self.state.handle_input(input) {
                                    InputOutcome::Ignored => {}
                                    InputOutcome::Redraw => redraw = true,
                                    InputOutcome::Effect(effect) => {
                                        if !self.dispatcher.dispatch(&effect) {
                                            warn!(?effect, "value-change side effect failed");
                                        }
                                        redraw = true;
                                    }
                                    InputOutcome::Commit(effect) => {
                                        match self.commit(effect.as_ref(), screen, &mut frame)? {
                                            SessionEvent::Continue => redraw = true,
                                            SessionEvent::Close => exit = Some(MenuExit::Closed),
                                            SessionEvent::ExitRequested => {
                                                exit = Some(MenuExit::ExitRequested)
                                            }
                                        }
                                    }
                                    InputOutcome::CloseRequested => {
                                        exit = Some(MenuExit::Closed)
                                    }
                                    InputOutcome::QuitRequested => exit = Some(MenuExit::Quit),
                                }
                            }
                        }
                        Event::Resize(..) => redraw = true,
                        _ => {}
                    }
                    if exit.is_some() {
                        break;
                    }
                }
            }

            if self.state.step_scroll(scroll_speed, zone_height) {
                redraw = true;
            }

            // Hold the frame budget; overruns are never compensated by
            // skipping frames.
            let elapsed = previous_frame.elapsed();
            if elapsed < frame_budget {
                std::thread::sleep(frame_budget - elapsed);
            } else if self.config.log_timings {
                debug!(frame_ms = elapsed.as_millis() as u64, "frame overran budget");
            }
            previous_frame = Instant::now();

            if exit.is_none() && redraw {
                render::compose_frame(&self.state, &self.statics, &self.art, &mut frame);
                screen.present(&frame)?;
                redraw = false;
            }
        }

        let exit = exit.unwrap_or(MenuExit::Closed);
        debug!(?exit, "menu session finished");
        Ok(exit)
    }

    /// Tear the session down and hand the per-zone values back.
    pub fn close(self) -> ZoneValues {
        self.state.into_values()
    }

    /// Render the committed frame, run the blocking dispatch, fold the
    /// result back into the state machine.
    fn commit(
        &mut self,
        effect: Option<&SideEffect>,
        screen: &mut Screen,
        frame: &mut Surface,
    ) -> Result<SessionEvent> {
        self.state.begin_action();
        render::compose_frame(&self.state, &self.statics, &self.art, frame);
        screen.present(frame)?;

        let success = match effect {
            Some(effect) => {
                let ok = self.dispatcher.dispatch(effect);
                if !ok {
                    warn!(?effect, "dispatch failed; state left unchanged");
                }
                ok
            }
            None => true,
        };
        Ok(self.state.apply_commit(effect, success))
    }
}

/// Physical keys to logical menu inputs. Arrows or `u/d/l/r` move, Enter or
/// `a` confirms, Backspace or `b` backs out, Esc or `q` asks to close, and
/// Ctrl+C is the host quit event.
fn map_key(key: KeyEvent) -> Option<MenuInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(MenuInput::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('u') => Some(MenuInput::Up),
        KeyCode::Down | KeyCode::Char('d') => Some(MenuInput::Down),
        KeyCode::Left | KeyCode::Char('l') => Some(MenuInput::Left),
        KeyCode::Right | KeyCode::Char('r') => Some(MenuInput::Right),
        KeyCode::Enter | KeyCode::Char('a') => Some(MenuInput::Confirm),
        KeyCode::Backspace | KeyCode::Char('b') => Some(MenuInput::Back),
        KeyCode::Esc | KeyCode::Char('q') => Some(MenuInput::Close),
        _ => None,
    }
}
