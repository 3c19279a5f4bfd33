//! UI preferences that survive restarts (`~/.salam/ui.json`).
//!
//! Only the theme lives here today. A missing or unreadable file yields the
//! defaults; nothing in the client fails because of it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::api::auth::{atomic_write_json, salam_dir};
use crate::core::state::Theme;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiPrefs {
    #[serde(default)]
    pub theme: Theme,
}

pub fn prefs_path() -> io::Result<PathBuf> {
    Ok(salam_dir()?.join("ui.json"))
}

/// `None` when the file is missing or corrupt.
pub fn load_prefs(path: &Path) -> Option<UiPrefs> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            warn!("Ignoring corrupt preferences at {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_prefs(path: &Path, prefs: &UiPrefs) -> io::Result<()> {
    atomic_write_json(path, prefs)?;
    debug!("Saved preferences to {}", path.display());
    Ok(())
}
