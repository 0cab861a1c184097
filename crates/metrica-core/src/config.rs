// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Host-side settings for the plugin. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Name given to the serial command worker thread.
    pub worker_thread_name: String,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Activation payload (same shape as the `activate` argument) applied at
    /// host startup.
    pub auto_activate: Option<serde_json::Value>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            worker_thread_name: "metrica-worker".into(),
            log_filter: "info".into(),
            auto_activate: None,
        }
    }
}

impl PluginSettings {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Load settings if the file exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write settings as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
