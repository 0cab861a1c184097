// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub SDK for desktop/CI builds where the native analytics library is
// unavailable.
//
// Every call is logged at debug level and dropped. Real implementations live
// in the `ios` and `android` modules.

use metrica_core::types::{ActivationConfig, Location};
use tracing::debug;

use crate::traits::*;

/// No-op SDK returned on non-mobile platforms.
pub struct StubSdk;

impl MetricaSdk for StubSdk {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeActivation for StubSdk {
    fn activate(&self, config: &ActivationConfig) {
        debug!(
            api_key = %config.api_key,
            session_timeout = ?config.session_timeout,
            "stub sdk: activate"
        );
    }
}

impl NativeSessionLifecycle for StubSdk {
    fn report_app_open(&self) {
        debug!("stub sdk: report_app_open");
    }

    fn resume_session(&self) {
        debug!("stub sdk: resume_session");
    }

    fn pause_session(&self) {
        debug!("stub sdk: pause_session");
    }
}

impl NativeReporting for StubSdk {
    fn report_event(&self, name: &str, params_json: Option<&str>) {
        debug!(event = name, params = ?params_json, "stub sdk: report_event");
    }

    fn report_error(&self, name: &str, reason: Option<&str>) {
        debug!(error = name, reason = ?reason, "stub sdk: report_error");
    }
}

impl NativeLocation for StubSdk {
    fn set_location(&self, location: &Location) {
        debug!(
            latitude = ?location.latitude,
            longitude = ?location.longitude,
            "stub sdk: set_location"
        );
    }

    fn set_location_tracking(&self, enabled: bool) {
        debug!(enabled, "stub sdk: set_location_tracking");
    }
}

impl NativeSettings for StubSdk {
    fn set_custom_app_version(&self, version: &str) {
        debug!(version, "stub sdk: set_custom_app_version");
    }

    fn set_environment_value(&self, key: &str, value: Option<&str>) {
        debug!(key, value = ?value, "stub sdk: set_environment_value");
    }

    fn set_session_timeout(&self, seconds: i32) {
        debug!(seconds, "stub sdk: set_session_timeout");
    }

    fn set_report_crashes_enabled(&self, enabled: bool) {
        debug!(enabled, "stub sdk: set_report_crashes_enabled");
    }

    fn set_logging_enabled(&self) {
        debug!("stub sdk: set_logging_enabled");
    }

    fn set_collect_installed_apps(&self, enabled: bool) {
        debug!(enabled, "stub sdk: set_collect_installed_apps");
    }
}
