//! Environment report behind `--doctor`: what the menu would open with,
//! without taking over the terminal.

use crate::config::AppConfig;
use crate::menu::{build_zones, ZoneType};
use crate::theme::LayoutStore;

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

pub fn doctor_report(config: &AppConfig) -> DoctorReport {
    let mut lines = Vec::new();
    lines.push(format!("pocketmenu {}", env!("CARGO_PKG_VERSION")));
    lines.push(String::new());

    match build_zones(&config.enabled_zones()) {
        Ok(zones) => {
            let names: Vec<&str> = zones.iter().map(|z| zone_name(*z)).collect();
            lines.push(format!("zones ({}): {}", zones.len(), names.join(", ")));
        }
        Err(err) => lines.push(format!("zones: ERROR - {err}")),
    }

    let resource_dir = &config.resource_dir;
    let dir_state = if resource_dir.is_dir() { "ok" } else { "MISSING" };
    lines.push(format!(
        "resource dir: {} ({dir_state})",
        resource_dir.display()
    ));
    for art in ["zone_bg.txt", "arrow_up.txt", "arrow_down.txt"] {
        let state = if resource_dir.join(art).is_file() {
            "ok"
        } else {
            "missing (degraded visuals)"
        };
        lines.push(format!("  {art}: {state}"));
    }

    match LayoutStore::discover(resource_dir, &config.layout_conf_path()) {
        Some(store) => lines.push(format!(
            "layouts: {} found, current '{}'",
            store.len(),
            store.names()[store.current()]
        )),
        None => lines.push("layouts: none (theme zone disabled)".to_string()),
    }

    lines.push(String::new());
    lines.push("commands:".to_string());
    for (flag, command) in config.command_table() {
        let state = match shell_words::split(command) {
            Ok(words) if !words.is_empty() => "ok",
            _ => "INVALID",
        };
        lines.push(format!("  {flag}: '{command}' ({state})"));
    }

    DoctorReport { lines }
}

fn zone_name(zone: ZoneType) -> &'static str {
    match zone {
        ZoneType::Volume => "volume",
        ZoneType::Brightness => "brightness",
        ZoneType::Save => "save",
        ZoneType::Load => "load",
        ZoneType::AspectRatio => "aspect-ratio",
        ZoneType::ReadWrite => "read-write",
        ZoneType::Exit => "exit",
        ZoneType::Usb => "usb",
        ZoneType::Theme => "theme",
        ZoneType::Launcher => "launcher",
        ZoneType::Powerdown => "powerdown",
    }
}
