//! Command-line parsing and validation for the overlay. Every external
//! command the menu can trigger is a plain command string here, so a build
//! for a different handheld only swaps configuration, not code.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::menu::ZoneType;


pub const DEFAULT_SCREEN_COLS: u16 = 48;
pub const DEFAULT_SCREEN_ROWS: u16 = 16;
const DEFAULT_FPS: u32 = 60;
const DEFAULT_SCROLL_SPEED: u16 = 3;
const DEFAULT_VOLUME_STEP: u8 = 10;
const DEFAULT_BRIGHTNESS_STEP: u8 = 10;
const DEFAULT_SAVE_SLOTS: u8 = 9;
const MIN_FPS: u32 = 10;
const MAX_FPS: u32 = 240;

/// CLI options for the pause overlay. Validated values keep the frame loop
/// and the spawned system commands sane.
#[derive(Debug, Parser, Clone)]
#[command(about = "PocketMenu in-game pause overlay", author, version)]
pub struct AppConfig {
    /// Directory holding menu art and layout files
    #[arg(long, default_value = "assets", env = "POCKETMENU_RESOURCE_DIR")]
    pub resource_dir: PathBuf,

    /// Where the chosen layout is exported for the frontend (defaults to
    /// layout.conf inside the resource directory)
    #[arg(long, env = "POCKETMENU_LAYOUT_CONF")]
    pub layout_conf: Option<PathBuf>,

    /// Target frame rate for the menu loop
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Rows the scroll animation advances per frame
    #[arg(long, default_value_t = DEFAULT_SCROLL_SPEED)]
    pub scroll_speed: u16,

    /// Logical screen width in cells
    #[arg(long, default_value_t = DEFAULT_SCREEN_COLS)]
    pub screen_cols: u16,

    /// Logical screen height in cells
    #[arg(long, default_value_t = DEFAULT_SCREEN_ROWS)]
    pub screen_rows: u16,

    /// Volume change per left/right press (percent)
    #[arg(long, default_value_t = DEFAULT_VOLUME_STEP)]
    pub volume_step: u8,

    /// Brightness change per left/right press (percent)
    #[arg(long, default_value_t = DEFAULT_BRIGHTNESS_STEP)]
    pub brightness_step: u8,

    /// Number of save-state slots to cycle through
    #[arg(long, default_value_t = DEFAULT_SAVE_SLOTS)]
    pub save_slots: u8,

    /// Label shown for the alternate launcher
    #[arg(long, default_value = "GMENU2X")]
    pub launcher_label: String,

    /// Disable the volume zone
    #[arg(long = "no-volume", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_volume: bool,

    /// Disable the brightness zone
    #[arg(long = "no-brightness", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_brightness: bool,

    /// Disable the save-state zone
    #[arg(long = "no-save", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_save: bool,

    /// Disable the load-state zone
    #[arg(long = "no-load", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_load: bool,

    /// Disable the aspect-ratio zone
    #[arg(long = "no-aspect-ratio", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_aspect_ratio: bool,

    /// Disable the read-only/read-write zone
    #[arg(long = "no-read-write", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_read_write: bool,

    /// Disable the exit zone
    #[arg(long = "no-exit", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_exit: bool,

    /// Disable the USB-share zone
    #[arg(long = "no-usb", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_usb: bool,

    /// Disable the theme zone
    #[arg(long = "no-theme", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_theme: bool,

    /// Disable the launcher zone
    #[arg(long = "no-launcher", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_launcher: bool,

    /// Disable the power-down zone
    #[arg(long = "no-powerdown", action = ArgAction::SetFalse, default_value_t = true)]
    pub zone_powerdown: bool,

    /// Command printing the current volume percentage
    #[arg(long, default_value = "pocketctl get-volume")]
    pub volume_get_cmd: String,

    /// Command setting the volume; the percentage is appended
    #[arg(long, default_value = "pocketctl set-volume")]
    pub volume_set_cmd: String,

    /// Command printing the current brightness percentage
    #[arg(long, default_value = "pocketctl get-brightness")]
    pub brightness_get_cmd: String,

    /// Command setting the brightness; the percentage is appended
    #[arg(long, default_value = "pocketctl set-brightness")]
    pub brightness_set_cmd: String,

    /// Command succeeding when a USB data cable is connected
    #[arg(long, default_value = "pocketctl usb-connected")]
    pub usb_connected_cmd: String,

    /// Command succeeding when USB mass storage is currently shared
    #[arg(long, default_value = "pocketctl usb-sharing")]
    pub usb_sharing_cmd: String,

    /// Command exposing the storage over USB
    #[arg(long, default_value = "pocketctl usb-mount")]
    pub usb_mount_cmd: String,

    /// Command ending the USB share
    #[arg(long, default_value = "pocketctl usb-eject")]
    pub usb_eject_cmd: String,

    /// Command remounting the system read-only
    #[arg(long, default_value = "pocketctl mount-ro")]
    pub mount_ro_cmd: String,

    /// Command remounting the system read-write
    #[arg(long, default_value = "pocketctl mount-rw")]
    pub mount_rw_cmd: String,

    /// Command notified of a save-state commit; the slot is appended
    #[arg(long, default_value = "pocketctl save-state")]
    pub save_cmd: String,

    /// Command notified of a load-state commit; the slot is appended
    #[arg(long, default_value = "pocketctl load-state")]
    pub load_cmd: String,

    /// Command switching the default launcher
    #[arg(long, default_value = "pocketctl set-launcher")]
    pub launcher_cmd: String,

    /// Command powering the device off
    #[arg(long, default_value = "pocketctl powerdown")]
    pub powerdown_cmd: String,

    /// Write diagnostics to the temp-dir log file
    #[arg(long)]
    pub logs: bool,

    /// Also log per-frame timings (implies --logs)
    #[arg(long)]
    pub log_timings: bool,

    /// Print an environment report and exit
    #[arg(long)]
    pub doctor: bool,
}

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Bounds-check every knob before anything touches the terminal.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            bail!(
                "--fps must be between {MIN_FPS} and {MAX_FPS}, got {}",
                self.fps
            );
        }
        if self.screen_cols < 24 || self.screen_rows < 8 {
            bail!(
                "logical screen must be at least 24x8 cells, got {}x{}",
                self.screen_cols,
                self.screen_rows
            );
        }
        if self.scroll_speed == 0 || self.scroll_speed > self.screen_rows {
            bail!(
                "--scroll-speed must be between 1 and --screen-rows ({}), got {}",
                self.screen_rows,
                self.scroll_speed
            );
        }
        for (flag, step) in [
            ("--volume-step", self.volume_step),
            ("--brightness-step", self.brightness_step),
        ] {
            if step == 0 || step > 50 || 100 % step != 0 {
                bail!("{flag} must divide 100 evenly and be at most 50, got {step}");
            }
        }
        if self.save_slots == 0 || self.save_slots > 32 {
            bail!("--save-slots must be between 1 and 32, got {}", self.save_slots);
        }
        if self.launcher_label.trim().is_empty() {
            bail!("--launcher-label cannot be empty");
        }

        for (flag, command) in self.command_table() {
            let words = shell_words::split(command)
                .with_context(|| format!("{flag} is not a valid command line: '{command}'"))?;
            if words.is_empty() {
                bail!("{flag} cannot be empty");
            }
        }

        Ok(())
    }

    /// The runtime capability set: every zone the configuration left
    /// enabled, in no particular order (the registry imposes ordering).
    pub fn enabled_zones(&self) -> Vec<ZoneType> {
        let toggles = [
            (self.zone_volume, ZoneType::Volume),
            (self.zone_brightness, ZoneType::Brightness),
            (self.zone_save, ZoneType::Save),
            (self.zone_load, ZoneType::Load),
            (self.zone_aspect_ratio, ZoneType::AspectRatio),
            (self.zone_read_write, ZoneType::ReadWrite),
            (self.zone_exit, ZoneType::Exit),
            (self.zone_usb, ZoneType::Usb),
            (self.zone_theme, ZoneType::Theme),
            (self.zone_launcher, ZoneType::Launcher),
            (self.zone_powerdown, ZoneType::Powerdown),
        ];
        toggles
            .into_iter()
            .filter_map(|(enabled, zone)| enabled.then_some(zone))
            .collect()
    }

    pub fn layout_conf_path(&self) -> PathBuf {
        self.layout_conf
            .clone()
            .unwrap_or_else(|| self.resource_dir.join("layout.conf"))
    }

    /// All configured command strings with their flag names, for validation
    /// and the doctor report.
    pub fn command_table(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("--volume-get-cmd", self.volume_get_cmd.as_str()),
            ("--volume-set-cmd", self.volume_set_cmd.as_str()),
            ("--brightness-get-cmd", self.brightness_get_cmd.as_str()),
            ("--brightness-set-cmd", self.brightness_set_cmd.as_str()),
            ("--usb-connected-cmd", self.usb_connected_cmd.as_str()),
            ("--usb-sharing-cmd", self.usb_sharing_cmd.as_str()),
            ("--usb-mount-cmd", self.usb_mount_cmd.as_str()),
            ("--usb-eject-cmd", self.usb_eject_cmd.as_str()),
            ("--mount-ro-cmd", self.mount_ro_cmd.as_str()),
            ("--mount-rw-cmd", self.mount_rw_cmd.as_str()),
            ("--save-cmd", self.save_cmd.as_str()),
            ("--load-cmd", self.load_cmd.as_str()),
            ("--launcher-cmd", self.launcher_cmd.as_str()),
            ("--powerdown-cmd", self.powerdown_cmd.as_str()),
        ]
    }
}
