// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metrica — Plugin layer: decodes host commands, runs them one at a time on
// a worker thread and gates SDK lifecycle calls on activation.

pub mod plugin;
pub mod session;
pub mod worker;

#[cfg(test)]
mod testing;

pub use plugin::{ConfigListener, MetricaPlugin, Receipt};
pub use session::ActivationState;
