//! Navigation state machine: indices, scroll bookkeeping, the two-step
//! confirmation protocol, and the input-to-effect mapping. Pure state; the
//! frame driver owns all I/O.

use crate::config::AppConfig;
use crate::effects::{Dispatcher, FlagQuery, PercentQuery, SideEffect};
use crate::theme::LayoutStore;

use super::zone::{ZoneType, ASPECT_RATIO_NAMES};

/// Per-zone values that outlive a single menu session. The host keeps them
/// between opens; volume, brightness, and the USB flags are refreshed from
/// the system at every open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneValues {
    pub volume_percent: u8,
    pub brightness_percent: u8,
    pub save_slot: u8,
    pub aspect_ratio: usize,
    pub usb_connected: bool,
    pub usb_sharing: bool,
    pub read_write: bool,
}

impl Default for ZoneValues {
    fn default() -> Self {
        Self {
            volume_percent: 50,
            brightness_percent: 50,
            save_slot: 0,
            aspect_ratio: 0,
            usb_connected: false,
            usb_sharing: false,
            read_write: false,
        }
    }
}

/// Logical menu inputs after key mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
    Close,
    Quit,
}

/// What the frame driver should do with a handled input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Redraw,
    /// Immediate value-change effect; no confirmation involved.
    Effect(SideEffect),
    /// Second confirm press: render the committed frame, dispatch, then
    /// apply the result. `None` means the action is purely host-level
    /// (the exit zone).
    Commit(Option<SideEffect>),
    CloseRequested,
    QuitRequested,
}

/// How a committed action leaves the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Continue,
    Close,
    ExitRequested,
}

pub struct MenuState {
    zones: Vec<ZoneType>,
    current: usize,
    previous: usize,
    scroll: i32,
    pending_scroll: i32,
    confirmation_pending: bool,
    action_in_progress: bool,
    values: ZoneValues,
    layout_names: Vec<String>,
    layout_index: usize,
    save_slots: u8,
    volume_step: u8,
    brightness_step: u8,
}

impl MenuState {
    pub fn new(
        zones: Vec<ZoneType>,
        mut values: ZoneValues,
        layouts: Option<&LayoutStore>,
        config: &AppConfig,
    ) -> Self {
        debug_assert!(!zones.is_empty());
        values.save_slot %= config.save_slots;
        let (layout_names, layout_index) = match layouts {
            Some(store) => (store.names().to_vec(), store.current()),
            None => (Vec::new(), 0),
        };
        Self {
            zones,
            current: 0,
            previous: 0,
            scroll: 0,
            pending_scroll: 0,
            confirmation_pending: false,
            action_in_progress: false,
            values,
            layout_names,
            layout_index,
            save_slots: config.save_slots,
            volume_step: config.volume_step,
            brightness_step: config.brightness_step,
        }
    }

    pub fn zones(&self) -> &[ZoneType] {
        &self.zones
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn previous_index(&self) -> usize {
        self.previous
    }

    pub fn current_zone(&self) -> ZoneType {
        self.zones[self.current]
    }

    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    pub fn confirmation_pending(&self) -> bool {
        self.confirmation_pending
    }

    pub fn action_in_progress(&self) -> bool {
        self.action_in_progress
    }

    pub fn values(&self) -> &ZoneValues {
        &self.values
    }

    pub fn volume_step(&self) -> u8 {
        self.volume_step
    }

    pub fn brightness_step(&self) -> u8 {
        self.brightness_step
    }

    pub fn layout_name(&self) -> Option<&str> {
        self.layout_names.get(self.layout_index).map(String::as_str)
    }

    pub fn into_values(self) -> ZoneValues {
        self.values
    }

    /// Open-time refresh of values the system owns. Also forces the session
    /// onto the USB zone when a share is already active, and off it when the
    /// cable is gone.
    pub fn refresh_system_values(&mut self, dispatcher: &mut dyn Dispatcher) {
        if self.zones.contains(&ZoneType::Volume) {
            self.values.volume_percent = dispatcher.query_percent(PercentQuery::Volume).min(100);
        }
        if self.zones.contains(&ZoneType::Brightness) {
            self.values.brightness_percent =
                dispatcher.query_percent(PercentQuery::Brightness).min(100);
        }
        if self.zones.contains(&ZoneType::Usb) {
            self.values.usb_connected = dispatcher.query_flag(FlagQuery::UsbConnected);
            self.values.usb_sharing = dispatcher.query_flag(FlagQuery::UsbSharing);

            if !self.values.usb_connected {
                self.values.usb_sharing = false;
                if self.current_zone() == ZoneType::Usb {
                    self.current = 0;
                    self.previous = 0;
                }
            }
            if self.values.usb_sharing {
                if let Some(usb) = self.zones.iter().position(|zone| *zone == ZoneType::Usb) {
                    self.current = usb;
                    self.previous = usb;
                }
            }
        }
    }

    pub fn handle_input(&mut self, input: MenuInput) -> InputOutcome {
        match input {
            MenuInput::Quit => InputOutcome::QuitRequested,
            MenuInput::Close => {
                // An active USB share is exclusive; the menu cannot be left
                // until the share ends.
                if self.values.usb_sharing {
                    InputOutcome::Ignored
                } else {
                    InputOutcome::CloseRequested
                }
            }
            MenuInput::Back => {
                if self.confirmation_pending {
                    self.confirmation_pending = false;
                    InputOutcome::Redraw
                } else {
                    InputOutcome::Ignored
                }
            }
            MenuInput::Down => self.navigate(1),
            MenuInput::Up => self.navigate(-1),
            MenuInput::Left => self.adjust(-1),
            MenuInput::Right => self.adjust(1),
            MenuInput::Confirm => self.confirm(),
        }
    }

    fn navigate(&mut self, direction: i32) -> InputOutcome {
        if self.values.usb_sharing {
            return InputOutcome::Ignored;
        }
        let len = self.zones.len() as i32;
        let mut next = (self.current as i32 + direction).rem_euclid(len);
        // Skip the USB zone while no cable is connected; exactly one more
        // step in the travel direction.
        if self.zones[next as usize] == ZoneType::Usb && !self.values.usb_connected {
            next = (next + direction).rem_euclid(len);
        }
        self.previous = self.current;
        self.current = next as usize;
        self.confirmation_pending = false;
        self.pending_scroll = direction.signum();
        InputOutcome::Redraw
    }

    fn adjust(&mut self, direction: i32) -> InputOutcome {
        match self.current_zone() {
            ZoneType::Volume => {
                self.values.volume_percent =
                    step_percent(self.values.volume_percent, self.volume_step, direction);
                InputOutcome::Effect(SideEffect::SetVolume(self.values.volume_percent))
            }
            ZoneType::Brightness => {
                self.values.brightness_percent = step_percent(
                    self.values.brightness_percent,
                    self.brightness_step,
                    direction,
                );
                InputOutcome::Effect(SideEffect::SetBrightness(self.values.brightness_percent))
            }
            ZoneType::Save | ZoneType::Load => {
                self.values.save_slot =
                    wrap_index(self.values.save_slot as usize, self.save_slots as usize, direction)
                        as u8;
                InputOutcome::Redraw
            }
            ZoneType::AspectRatio => {
                self.values.aspect_ratio =
                    wrap_index(self.values.aspect_ratio, ASPECT_RATIO_NAMES.len(), direction);
                InputOutcome::Redraw
            }
            ZoneType::Theme => {
                if self.layout_names.is_empty() {
                    return InputOutcome::Ignored;
                }
                self.layout_index =
                    wrap_index(self.layout_index, self.layout_names.len(), direction);
                InputOutcome::Redraw
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn confirm(&mut self) -> InputOutcome {
        let zone = self.current_zone();
        if !zone.is_action() {
            return InputOutcome::Ignored;
        }
        if zone == ZoneType::Theme && self.layout_names.is_empty() {
            return InputOutcome::Ignored;
        }
        if !self.confirmation_pending {
            self.confirmation_pending = true;
            return InputOutcome::Redraw;
        }
        let effect = match zone {
            ZoneType::Save => Some(SideEffect::SaveState(self.values.save_slot)),
            ZoneType::Load => Some(SideEffect::LoadState(self.values.save_slot)),
            ZoneType::Usb => Some(if self.values.usb_sharing {
                SideEffect::EjectUsb
            } else {
                SideEffect::MountUsb
            }),
            ZoneType::ReadWrite => Some(if self.values.read_write {
                SideEffect::MountReadOnly
            } else {
                SideEffect::MountReadWrite
            }),
            ZoneType::Theme => self.layout_name().map(|name| SideEffect::ApplyLayout {
                name: name.to_string(),
            }),
            ZoneType::Launcher => Some(SideEffect::SetLauncher),
            ZoneType::Powerdown => Some(SideEffect::Powerdown),
            // The exit action is performed by the host on the session's
            // return code; nothing to dispatch here.
            ZoneType::Exit => None,
            _ => unreachable!("confirm on a non-action zone"),
        };
        InputOutcome::Commit(effect)
    }

    /// Flag the one committed frame rendered before the blocking dispatch.
    /// Clears the confirmation so both flags are never true across frames.
    pub fn begin_action(&mut self) {
        self.action_in_progress = true;
        self.confirmation_pending = false;
    }

    /// Fold the dispatch result back into the session. Persistent flags only
    /// flip on success; a failed action is a no-op and the menu keeps
    /// running.
    pub fn apply_commit(&mut self, effect: Option<&SideEffect>, success: bool) -> SessionEvent {
        self.action_in_progress = false;
        self.confirmation_pending = false;
        let Some(effect) = effect else {
            return SessionEvent::ExitRequested;
        };
        match effect {
            SideEffect::SaveState(_) | SideEffect::LoadState(_) => SessionEvent::Close,
            SideEffect::ApplyLayout { .. } | SideEffect::SetLauncher | SideEffect::Powerdown => {
                SessionEvent::ExitRequested
            }
            SideEffect::MountUsb => {
                if success {
                    self.values.usb_sharing = true;
                }
                SessionEvent::Continue
            }
            SideEffect::EjectUsb => {
                if success {
                    self.values.usb_sharing = false;
                }
                SessionEvent::Continue
            }
            SideEffect::MountReadWrite => {
                if success {
                    self.values.read_write = true;
                }
                SessionEvent::Continue
            }
            SideEffect::MountReadOnly => {
                if success {
                    self.values.read_write = false;
                }
                SessionEvent::Continue
            }
            SideEffect::SetVolume(_) | SideEffect::SetBrightness(_) => SessionEvent::Continue,
        }
    }

    /// Input is only polled while the view is settled.
    pub fn is_scrolling(&self) -> bool {
        self.scroll != 0 || self.pending_scroll != 0
    }

    /// Advance the scroll animation by one frame. Returns true when the
    /// frame needs a redraw. The offset magnitude grows by at most `speed`,
    /// never past the zone height; reaching it snaps the view onto the
    /// target zone.
    pub fn step_scroll(&mut self, speed: i32, zone_height: i32) -> bool {
        if self.scroll > 0 || self.pending_scroll > 0 {
            self.scroll += speed.min(zone_height - self.scroll);
            self.pending_scroll = 0;
        } else if self.scroll < 0 || self.pending_scroll < 0 {
            self.scroll -= speed.min(zone_height + self.scroll);
            self.pending_scroll = 0;
        } else {
            return false;
        }
        if self.scroll.abs() >= zone_height {
            self.previous = self.current;
            self.scroll = 0;
        }
        true
    }
}

fn step_percent(value: u8, step: u8, direction: i32) -> u8 {
    if direction < 0 {
        value.saturating_sub(step)
    } else if value > 100 - step {
        100
    } else {
        value + step
    }
}

fn wrap_index(index: usize, len: usize, direction: i32) -> usize {
    debug_assert!(len > 0);
    (index as i32 + direction).rem_euclid(len as i32) as usize
}
