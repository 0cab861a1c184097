// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording SDK double for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrica_bridge::traits::*;
use metrica_core::types::{ActivationConfig, Location};

/// One observed SDK call.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkCall {
    Activate(String),
    AppOpen,
    Resume,
    Pause,
    Event(String, Option<String>),
    Error(String, Option<String>),
    Location(Location),
    LocationTracking(bool),
    AppVersion(String),
    EnvironmentValue(String, Option<String>),
    SessionTimeout(i32),
    ReportCrashes(bool),
    LoggingEnabled,
    CollectInstalledApps(bool),
}

/// Records every call in order and counts calls that overlapped in time.
#[derive(Clone, Default)]
pub struct RecordingSdk {
    calls: Arc<Mutex<Vec<SdkCall>>>,
    in_flight: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    /// How long each call pretends to take; widens the overlap window.
    hold: Duration,
}

impl RecordingSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hold(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn record(&self, call: SdkCall) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if !self.hold.is_zero() {
            std::thread::sleep(self.hold);
        }
        self.calls.lock().expect("calls lock").push(call);
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl MetricaSdk for RecordingSdk {
    fn platform_name(&self) -> &str {
        "Recording"
    }
}

impl NativeActivation for RecordingSdk {
    fn activate(&self, config: &ActivationConfig) {
        self.record(SdkCall::Activate(config.api_key.clone()));
    }
}

impl NativeSessionLifecycle for RecordingSdk {
    fn report_app_open(&self) {
        self.record(SdkCall::AppOpen);
    }

    fn resume_session(&self) {
        self.record(SdkCall::Resume);
    }

    fn pause_session(&self) {
        self.record(SdkCall::Pause);
    }
}

impl NativeReporting for RecordingSdk {
    fn report_event(&self, name: &str, params_json: Option<&str>) {
        self.record(SdkCall::Event(name.into(), params_json.map(str::to_owned)));
    }

    fn report_error(&self, name: &str, reason: Option<&str>) {
        self.record(SdkCall::Error(name.into(), reason.map(str::to_owned)));
    }
}

impl NativeLocation for RecordingSdk {
    fn set_location(&self, location: &Location) {
        self.record(SdkCall::Location(location.clone()));
    }

    fn set_location_tracking(&self, enabled: bool) {
        self.record(SdkCall::LocationTracking(enabled));
    }
}

impl NativeSettings for RecordingSdk {
    fn set_custom_app_version(&self, version: &str) {
        self.record(SdkCall::AppVersion(version.into()));
    }

    fn set_environment_value(&self, key: &str, value: Option<&str>) {
        self.record(SdkCall::EnvironmentValue(key.into(), value.map(str::to_owned)));
    }

    fn set_session_timeout(&self, seconds: i32) {
        self.record(SdkCall::SessionTimeout(seconds));
    }

    fn set_report_crashes_enabled(&self, enabled: bool) {
        self.record(SdkCall::ReportCrashes(enabled));
    }

    fn set_logging_enabled(&self) {
        self.record(SdkCall::LoggingEnabled);
    }

    fn set_collect_installed_apps(&self, enabled: bool) {
        self.record(SdkCall::CollectInstalledApps(enabled));
    }
}
