//! Shell-command dispatcher: every side effect maps to one configured
//! command line, run to completion on the menu thread.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::theme;

use super::{Dispatcher, FlagQuery, PercentQuery, SideEffect};

/// Reported when a percentage query yields nothing usable.
pub(super) const FALLBACK_PERCENT: u8 = 50;

#[derive(Debug, Clone)]
struct CommandTable {
    volume_get: String,
    volume_set: String,
    brightness_get: String,
    brightness_set: String,
    usb_connected: String,
    usb_sharing: String,
    usb_mount: String,
    usb_eject: String,
    mount_ro: String,
    mount_rw: String,
    save: String,
    load: String,
    launcher: String,
    powerdown: String,
}

pub struct ShellDispatcher {
    commands: CommandTable,
    layout_conf: PathBuf,
}

impl ShellDispatcher {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            commands: CommandTable {
                volume_get: config.volume_get_cmd.clone(),
                volume_set: config.volume_set_cmd.clone(),
                brightness_get: config.brightness_get_cmd.clone(),
                brightness_set: config.brightness_set_cmd.clone(),
                usb_connected: config.usb_connected_cmd.clone(),
                usb_sharing: config.usb_sharing_cmd.clone(),
                usb_mount: config.usb_mount_cmd.clone(),
                usb_eject: config.usb_eject_cmd.clone(),
                mount_ro: config.mount_ro_cmd.clone(),
                mount_rw: config.mount_rw_cmd.clone(),
                save: config.save_cmd.clone(),
                load: config.load_cmd.clone(),
                launcher: config.launcher_cmd.clone(),
                powerdown: config.powerdown_cmd.clone(),
            },
            layout_conf: config.layout_conf_path(),
        }
    }

    fn build_command(command: &str, arg: Option<&str>) -> Result<Command> {
        let mut words = shell_words::split(command)
            .with_context(|| format!("invalid command line '{command}'"))?;
        if let Some(arg) = arg {
            words.push(arg.to_string());
        }
        let mut iter = words.into_iter();
        let program = iter.next().ok_or_else(|| anyhow!("empty command line"))?;
        let mut cmd = Command::new(program);
        cmd.args(iter).stdin(Stdio::null());
        Ok(cmd)
    }

    fn run_status(command: &str, arg: Option<&str>) -> Result<bool> {
        let status = Self::build_command(command, arg)?
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to run '{command}'"))?;
        Ok(status.success())
    }

    /// Run a command for its effect. Any failure is a logged no-op.
    fn run_effect(&self, command: &str, arg: Option<&str>) -> bool {
        match Self::run_status(command, arg) {
            Ok(true) => {
                debug!(%command, ?arg, "command succeeded");
                true
            }
            Ok(false) => {
                warn!(%command, ?arg, "command reported failure");
                false
            }
            Err(err) => {
                warn!(%command, error = %format!("{err:#}"), "failed to run command");
                false
            }
        }
    }

    fn capture_first_line(command: &str) -> Result<String> {
        let output = Self::build_command(command, None)?
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("failed to run '{command}'"))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }
}

impl Dispatcher for ShellDispatcher {
    fn dispatch(&mut self, effect: &SideEffect) -> bool {
        match effect {
            SideEffect::SetVolume(pct) => {
                self.run_effect(&self.commands.volume_set, Some(&pct.to_string()))
            }
            SideEffect::SetBrightness(pct) => {
                self.run_effect(&self.commands.brightness_set, Some(&pct.to_string()))
            }
            SideEffect::SaveState(slot) => {
                self.run_effect(&self.commands.save, Some(&slot.to_string()))
            }
            SideEffect::LoadState(slot) => {
                self.run_effect(&self.commands.load, Some(&slot.to_string()))
            }
            SideEffect::MountUsb => self.run_effect(&self.commands.usb_mount, None),
            SideEffect::EjectUsb => self.run_effect(&self.commands.usb_eject, None),
            SideEffect::MountReadOnly => self.run_effect(&self.commands.mount_ro, None),
            SideEffect::MountReadWrite => self.run_effect(&self.commands.mount_rw, None),
            SideEffect::ApplyLayout { name } => {
                match theme::export_selection(&self.layout_conf, name) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(%name, error = %format!("{err:#}"), "layout export failed");
                        false
                    }
                }
            }
            SideEffect::SetLauncher => self.run_effect(&self.commands.launcher, None),
            SideEffect::Powerdown => self.run_effect(&self.commands.powerdown, None),
        }
    }

    fn query_percent(&mut self, query: PercentQuery) -> u8 {
        let command = match query {
            PercentQuery::Volume => &self.commands.volume_get,
            PercentQuery::Brightness => &self.commands.brightness_get,
        };
        match Self::capture_first_line(command) {
            Ok(line) => parse_percent(&line).unwrap_or_else(|| {
                warn!(%command, %line, "non-numeric response, using fallback");
                FALLBACK_PERCENT
            }),
            Err(err) => {
                warn!(%command, error = %format!("{err:#}"), "percentage query failed");
                FALLBACK_PERCENT
            }
        }
    }

    fn query_flag(&mut self, query: FlagQuery) -> bool {
        let command = match query {
            FlagQuery::UsbConnected => &self.commands.usb_connected,
            FlagQuery::UsbSharing => &self.commands.usb_sharing,
        };
        match Self::run_status(command, None) {
            Ok(flag) => flag,
            Err(err) => {
                warn!(%command, error = %format!("{err:#}"), "flag probe failed");
                false
            }
        }
    }
}

/// Leading digits of the trimmed line, clamped to 100. Anything else is
/// `None` so the caller can log and substitute the fallback.
pub(super) fn parse_percent(line: &str) -> Option<u8> {
    let digits: String = line
        .trim()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u32>().ok().map(|value| value.min(100) as u8)
}
