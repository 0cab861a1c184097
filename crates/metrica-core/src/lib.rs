// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metrica — Core types, command decoding and error definitions shared across
// all crates.

pub mod command;
pub mod config;
pub mod error;
mod json;
pub mod types;

pub use command::Command;
pub use config::PluginSettings;
pub use error::MetricaError;
pub use types::*;
