// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metrica host shell.
//
// Entry point. Loads settings, initialises logging, builds the plugin over
// the platform SDK and feeds it JSON lines from stdin until end of input.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use metrica_core::PluginSettings;
use metrica_core::error::Result;
use metrica_plugin::MetricaPlugin;

use services::data_dir;
use services::protocol;

fn main() -> ExitCode {
    let settings_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(data_dir::settings_path);
    let loaded = PluginSettings::load_or_default(&settings_path);
    let settings = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_filter)),
        )
        .init();

    if let Err(e) = &loaded {
        tracing::warn!(path = %settings_path.display(), error = %e, "settings unreadable; using defaults");
    }
    tracing::info!(settings = %settings_path.display(), "Metrica host starting");

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "host stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &PluginSettings) -> Result<()> {
    let plugin = MetricaPlugin::with_settings(metrica_bridge::platform_sdk(), settings)?;
    tracing::info!(platform = %plugin.platform_name(), "plugin ready");

    if let Some(payload) = &settings.auto_activate {
        match plugin.submit("activate", std::slice::from_ref(payload)).wait() {
            Ok(()) => tracing::info!("auto-activation applied"),
            Err(e) => tracing::warn!(error = %e, "auto-activation rejected"),
        }
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let served = protocol::serve(&plugin, stdin.lock(), stdout.lock());

    plugin.shutdown();
    served
}
