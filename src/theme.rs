//! Layout/theme store: the ordered set of frontend layouts the player can
//! pick from, the current selection, and the exported choice the frontend
//! reads back after it restarts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Subdirectory of the resource directory holding one file per layout.
pub const LAYOUT_DIR: &str = "layouts";

#[derive(Debug, Serialize, Deserialize)]
struct LayoutSelection {
    layout: String,
}

#[derive(Debug, Clone)]
pub struct LayoutStore {
    names: Vec<String>,
    current: usize,
}

impl LayoutStore {
    /// Scan the layout directory and line its entries up with the exported
    /// selection. Returns `None` when no layouts exist; the theme zone is
    /// then left out of the session.
    pub fn discover(resource_dir: &Path, layout_conf: &Path) -> Option<Self> {
        let layout_dir = resource_dir.join(LAYOUT_DIR);
        let entries = match fs::read_dir(&layout_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %layout_dir.display(), error = %err, "no layout directory");
                return None;
            }
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        if names.is_empty() {
            warn!(path = %layout_dir.display(), "layout directory is empty");
            return None;
        }

        let current = read_selection(layout_conf)
            .and_then(|selected| names.iter().position(|name| *name == selected))
            .unwrap_or(0);
        Some(Self { names, current })
    }

    pub fn from_names(names: Vec<String>, current: usize) -> Option<Self> {
        if names.is_empty() {
            return None;
        }
        let current = current.min(names.len() - 1);
        Some(Self { names, current })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }
}

/// Write the chosen layout where the frontend expects it. The frontend is
/// expected to restart itself once the menu exits.
pub fn export_selection(path: &Path, name: &str) -> Result<()> {
    let payload = serde_json::to_string_pretty(&LayoutSelection {
        layout: name.to_string(),
    })?;
    fs::write(path, payload)
        .with_context(|| format!("failed to export layout selection to '{}'", path.display()))
}

pub fn read_selection(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str::<LayoutSelection>(&text)
        .map(|selection| selection.layout)
        .ok()
}
