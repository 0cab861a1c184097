// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native analytics SDK.
//
// Every SDK entry point is fire-and-forget: the native library queues the
// work internally and offers no failure channel back to us. Implementations
// therefore return `()` and log anything that goes wrong at the FFI layer.

use metrica_core::types::{ActivationConfig, Location};

/// Unified SDK handle that groups all native capabilities.
///
/// Implementations need not be thread-safe; the plugin serializes every call
/// through a single lock, so at most one method runs at a time.
pub trait MetricaSdk:
    NativeActivation + NativeSessionLifecycle + NativeReporting + NativeLocation + NativeSettings + Send
{
    /// Human-readable platform name (e.g. "Android", "iOS").
    fn platform_name(&self) -> &str;
}

/// SDK start-up.
pub trait NativeActivation {
    /// Initialise the SDK. May be called more than once; the native SDK is
    /// expected to tolerate re-activation.
    fn activate(&self, config: &ActivationConfig);
}

/// Foreground/background and app-open notifications.
pub trait NativeSessionLifecycle {
    /// The app was opened (launch or re-open via a new intent).
    fn report_app_open(&self);

    /// The host activity came to the foreground.
    fn resume_session(&self);

    /// The host activity went to the background.
    fn pause_session(&self);
}

/// Event and error reporting.
pub trait NativeReporting {
    /// Report a named event, optionally with parameters encoded as a JSON
    /// object string.
    fn report_event(&self, name: &str, params_json: Option<&str>);

    /// Report a named error with an optional human-readable reason.
    fn report_error(&self, name: &str, reason: Option<&str>);
}

/// Location reporting.
pub trait NativeLocation {
    /// Override the device location attached to reports.
    fn set_location(&self, location: &Location);

    /// Allow or forbid the SDK to collect location by itself.
    fn set_location_tracking(&self, enabled: bool);
}

/// Runtime settings that can change after activation.
pub trait NativeSettings {
    fn set_custom_app_version(&self, version: &str);

    /// Attach a key/value to future crash reports; `None` removes the key.
    fn set_environment_value(&self, key: &str, value: Option<&str>);

    fn set_session_timeout(&self, seconds: i32);

    fn set_report_crashes_enabled(&self, enabled: bool);

    /// Turn on SDK-internal logging. There is no matching "off".
    fn set_logging_enabled(&self);

    /// Allow the SDK to report the list of installed apps (Android only).
    fn set_collect_installed_apps(&self, enabled: bool);
}
