// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "metrica";
const SETTINGS_FILE: &str = "settings.json";

/// Return the host data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir(
        std::env::var("XDG_DATA_HOME").ok(),
        std::env::var("HOME").ok(),
    )
    .join(APP_DIR);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::debug!(path = %dir.display(), error = %e, "data dir not created");
    }
    dir
}

/// Default location of the settings file.
pub fn settings_path() -> PathBuf {
    data_dir().join(SETTINGS_FILE)
}

fn base_dir(xdg_data_home: Option<String>, home: Option<String>) -> PathBuf {
    // XDG first, then ~/.local/share
    if let Some(xdg) = xdg_data_home.filter(|s| !s.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = home {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = base_dir(Some("/data".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/data"));
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        let dir = base_dir(Some(String::new()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share"));
    }

    #[test]
    fn no_environment_uses_temp_dir() {
        assert_eq!(base_dir(None, None), std::env::temp_dir());
    }
}
