// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS analytics bridge via objc2.
//
// Requires compilation with the iOS SDK (Xcode) and the AppMetrica framework
// linked into the host app. Each trait method wraps the corresponding
// `YMMYandexMetrica` class method through Objective-C message sends.
//
// The iOS SDK tracks foreground/background transitions and app opens on its
// own, so the session lifecycle methods are no-ops here. Settings that the
// iOS SDK only accepts at activation time are logged and dropped when set at
// runtime.
//
// ## Unsafe code
//
// 1. **ObjC message sends** (msg_send!): selector correctness follows the
//    AppMetrica and Foundation headers. Classes are looked up with
//    `AnyClass::get` so a missing framework degrades to a warning instead of
//    a panic.
//
// 2. **Struct encoding** (`CLLocationCoordinate2D`): a `#[repr(C)]` mirror of
//    the CoreLocation struct with a matching `Encode` impl.

#![cfg(target_os = "ios")]

use std::ffi::{CStr, c_void};

use objc2::encode::{Encode, Encoding};
use objc2::rc::{Allocated, Retained};
use objc2::runtime::{AnyClass, AnyObject, Bool};
use objc2::msg_send;
use objc2_foundation::{NSData, NSJSONReadingOptions, NSJSONSerialization, NSString};

use metrica_core::types::{ActivationConfig, Location, PreloadInfo};

use crate::traits::*;

// ---------------------------------------------------------------------------
// Class lookup
// ---------------------------------------------------------------------------

const METRICA_CLASS: &CStr = c"YMMYandexMetrica";
const CONFIG_CLASS: &CStr = c"YMMYandexMetricaConfiguration";
const PRELOAD_CLASS: &CStr = c"YMMYandexMetricaPreloadInfo";
const LOCATION_CLASS: &CStr = c"CLLocation";

/// Look up an Objective-C class, logging when the framework is not linked.
fn class(name: &CStr) -> Option<&'static AnyClass> {
    let cls = AnyClass::get(name);
    if cls.is_none() {
        tracing::warn!(class = ?name, "iOS: class not found; is the framework linked?");
    }
    cls
}

/// Timeout as the configuration's `NSUInteger` seconds, or `None` when the
/// host sent a negative timeout.
fn session_timeout_seconds(seconds: i32) -> Option<usize> {
    let converted = usize::try_from(seconds).ok();
    if converted.is_none() {
        tracing::warn!(seconds, "iOS: negative session timeout ignored");
    }
    converted
}

// ---------------------------------------------------------------------------
// CoreLocation
// ---------------------------------------------------------------------------

/// Mirror of CoreLocation's `CLLocationCoordinate2D`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CLLocationCoordinate2D {
    latitude: f64,
    longitude: f64,
}

// SAFETY: the struct is `#[repr(C)]` with two `f64` fields, exactly as
// declared in <CoreLocation/CLLocation.h>.
unsafe impl Encode for CLLocationCoordinate2D {
    const ENCODING: Encoding =
        Encoding::Struct("CLLocationCoordinate2D", &[f64::ENCODING, f64::ENCODING]);
}

/// Build a `CLLocation`. Missing coordinates and altitude read as zero;
/// missing accuracies, course and speed read as -1, CoreLocation's marker
/// for "invalid".
fn build_location(location: &Location) -> Option<Retained<AnyObject>> {
    let cls = class(LOCATION_CLASS)?;
    let coordinate = CLLocationCoordinate2D {
        latitude: location.latitude.unwrap_or(0.0),
        longitude: location.longitude.unwrap_or(0.0),
    };
    let timestamp: Option<Retained<AnyObject>> = location.timestamp.and_then(|t| {
        let date_cls = class(c"NSDate")?;
        // SAFETY: `+[NSDate dateWithTimeIntervalSince1970:]` returns an
        // autoreleased NSDate.
        unsafe { msg_send![date_cls, dateWithTimeIntervalSince1970: t as f64] }
    });
    let timestamp = match timestamp {
        Some(t) => t,
        None => {
            let date_cls = class(c"NSDate")?;
            // SAFETY: `+[NSDate date]` returns the current instant.
            unsafe { msg_send![date_cls, date] }
        }
    };

    // SAFETY: alloc + designated initializer from <CoreLocation/CLLocation.h>.
    unsafe {
        let alloc: Allocated<AnyObject> = msg_send![cls, alloc];
        msg_send![
            alloc,
            initWithCoordinate: coordinate,
            altitude: location.altitude.unwrap_or(0.0),
            horizontalAccuracy: location.accuracy.map_or(-1.0, f64::from),
            verticalAccuracy: location.vertical_accuracy.map_or(-1.0, f64::from),
            course: location.bearing.map_or(-1.0, f64::from),
            speed: location.speed.map_or(-1.0, f64::from),
            timestamp: &*timestamp
        ]
    }
}

// ---------------------------------------------------------------------------
// AppMetrica objects
// ---------------------------------------------------------------------------

fn build_preload_info(info: &PreloadInfo) -> Option<Retained<AnyObject>> {
    let cls = class(PRELOAD_CLASS)?;
    let tracking_id = NSString::from_str(&info.tracking_id);
    // SAFETY: alloc + `initWithTrackingIdentifier:` from YMMYandexMetricaPreloadInfo.h.
    let preload: Option<Retained<AnyObject>> = unsafe {
        let alloc: Allocated<AnyObject> = msg_send![cls, alloc];
        msg_send![alloc, initWithTrackingIdentifier: &*tracking_id]
    };
    let preload = preload?;

    for (key, value) in &info.additional_info {
        let ns_key = NSString::from_str(key);
        let ns_value = NSString::from_str(value);
        // SAFETY: `setAdditionalInfo:forKey:` takes two NSStrings.
        unsafe {
            let _: () = msg_send![&preload, setAdditionalInfo: &*ns_value, forKey: &*ns_key];
        }
    }
    Some(preload)
}

fn build_config(config: &ActivationConfig) -> Option<Retained<AnyObject>> {
    let cls = class(CONFIG_CLASS)?;
    let api_key = NSString::from_str(&config.api_key);
    // SAFETY: alloc + `initWithApiKey:`; returns nil for a malformed key.
    let ns_config: Option<Retained<AnyObject>> = unsafe {
        let alloc: Allocated<AnyObject> = msg_send![cls, alloc];
        msg_send![alloc, initWithApiKey: &*api_key]
    };
    let ns_config = ns_config?;

    // SAFETY: property setters declared in YMMYandexMetricaConfiguration.h.
    unsafe {
        if let Some(v) = config.handle_first_activation_as_update {
            let _: () = msg_send![&ns_config, setHandleFirstActivationAsUpdate: Bool::new(v)];
        }
        if let Some(v) = config.track_location {
            let _: () = msg_send![&ns_config, setLocationTracking: Bool::new(v)];
        }
        if let Some(seconds) = config.session_timeout.and_then(session_timeout_seconds) {
            let _: () = msg_send![&ns_config, setSessionTimeout: seconds];
        }
        if let Some(v) = config.report_crashes {
            let _: () = msg_send![&ns_config, setCrashReporting: Bool::new(v)];
        }
        if let Some(version) = &config.app_version {
            let ns_version = NSString::from_str(version);
            let _: () = msg_send![&ns_config, setAppVersion: &*ns_version];
        }
        if config.logging_enabled {
            let _: () = msg_send![&ns_config, setLogs: Bool::YES];
        }
        if let Some(location) = config.location.as_ref().and_then(build_location) {
            let _: () = msg_send![&ns_config, setLocation: &*location];
        }
        if let Some(preload) = config.preload_info.as_ref().and_then(build_preload_info) {
            let _: () = msg_send![&ns_config, setPreloadInfo: &*preload];
        }
    }
    Some(ns_config)
}

/// Parse a JSON object string into an `NSDictionary` for event parameters.
fn parse_params(params_json: &str) -> Option<Retained<AnyObject>> {
    let data = NSData::with_bytes(params_json.as_bytes());
    // SAFETY: NSJSONSerialization only reads the data buffer.
    let parsed = unsafe {
        NSJSONSerialization::JSONObjectWithData_options_error(&data, NSJSONReadingOptions::empty())
    };
    match parsed {
        Ok(obj) => Some(obj),
        Err(e) => {
            tracing::warn!(error = ?e, "iOS: event parameters are not valid JSON");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// SDK struct
// ---------------------------------------------------------------------------

/// iOS implementation of the Metrica SDK bridge.
///
/// `YMMYandexMetrica` is a class-method API that is safe to call from any
/// thread, so the struct holds no state.
pub struct IosSdk;

impl IosSdk {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IosSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricaSdk for IosSdk {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

impl NativeActivation for IosSdk {
    fn activate(&self, config: &ActivationConfig) {
        let Some(cls) = class(METRICA_CLASS) else {
            return;
        };
        let Some(ns_config) = build_config(config) else {
            tracing::warn!("iOS: could not build activation configuration");
            return;
        };
        tracing::info!(
            session_timeout = ?config.session_timeout,
            preload = config.preload_info.is_some(),
            "iOS: activating sdk"
        );
        // SAFETY: `+activateWithConfiguration:` takes a configuration object.
        unsafe {
            let _: () = msg_send![cls, activateWithConfiguration: &*ns_config];
        }
    }
}

impl NativeSessionLifecycle for IosSdk {
    fn report_app_open(&self) {
        tracing::trace!("iOS: app opens are tracked by the sdk");
    }

    fn resume_session(&self) {
        tracing::trace!("iOS: session resume is tracked by the sdk");
    }

    fn pause_session(&self) {
        tracing::trace!("iOS: session pause is tracked by the sdk");
    }
}

impl NativeReporting for IosSdk {
    fn report_event(&self, name: &str, params_json: Option<&str>) {
        let Some(cls) = class(METRICA_CLASS) else {
            return;
        };
        let ns_name = NSString::from_str(name);
        let params = params_json.and_then(parse_params);
        // SAFETY: `+reportEvent:parameters:onFailure:`: nil parameters and a
        // nil failure block are both permitted.
        unsafe {
            let _: () = msg_send![
                cls,
                reportEvent: &*ns_name,
                parameters: params.as_deref(),
                onFailure: std::ptr::null::<c_void>()
            ];
        }
    }

    fn report_error(&self, name: &str, reason: Option<&str>) {
        let Some(cls) = class(METRICA_CLASS) else {
            return;
        };
        let ns_name = NSString::from_str(name);
        let exception: Option<Retained<AnyObject>> = reason.and_then(|reason| {
            let exc_cls = class(c"NSException")?;
            let ns_reason = NSString::from_str(reason);
            // SAFETY: `+exceptionWithName:reason:userInfo:` with a nil userInfo.
            unsafe {
                msg_send![
                    exc_cls,
                    exceptionWithName: &*ns_name,
                    reason: &*ns_reason,
                    userInfo: std::ptr::null::<AnyObject>()
                ]
            }
        });
        // SAFETY: `+reportError:exception:onFailure:`: exception may be nil.
        unsafe {
            let _: () = msg_send![
                cls,
                reportError: &*ns_name,
                exception: exception.as_deref(),
                onFailure: std::ptr::null::<c_void>()
            ];
        }
    }
}

impl NativeLocation for IosSdk {
    fn set_location(&self, location: &Location) {
        let Some(cls) = class(METRICA_CLASS) else {
            return;
        };
        let Some(cl_location) = build_location(location) else {
            return;
        };
        // SAFETY: `+setLocation:` takes a CLLocation.
        unsafe {
            let _: () = msg_send![cls, setLocation: &*cl_location];
        }
    }

    fn set_location_tracking(&self, enabled: bool) {
        let Some(cls) = class(METRICA_CLASS) else {
            return;
        };
        // SAFETY: `+setLocationTracking:` takes a BOOL.
        unsafe {
            let _: () = msg_send![cls, setLocationTracking: Bool::new(enabled)];
        }
    }
}

impl NativeSettings for IosSdk {
    fn set_custom_app_version(&self, version: &str) {
        tracing::warn!(version, "iOS: app version can only be set at activation");
    }

    fn set_environment_value(&self, key: &str, value: Option<&str>) {
        let Some(cls) = class(METRICA_CLASS) else {
            return;
        };
        let ns_key = NSString::from_str(key);
        let ns_value = value.map(NSString::from_str);
        let value_obj: Option<&AnyObject> = match &ns_value {
            Some(v) => {
                let obj: &AnyObject = v;
                Some(obj)
            }
            None => None,
        };
        // SAFETY: `+setErrorEnvironmentValue:forKey:`: a nil value removes
        // the key.
        unsafe {
            let _: () = msg_send![cls, setErrorEnvironmentValue: value_obj, forKey: &*ns_key];
        }
    }

    fn set_session_timeout(&self, seconds: i32) {
        tracing::warn!(seconds, "iOS: session timeout can only be set at activation");
    }

    fn set_report_crashes_enabled(&self, enabled: bool) {
        tracing::warn!(enabled, "iOS: crash reporting can only be set at activation");
    }

    fn set_logging_enabled(&self) {
        tracing::warn!("iOS: sdk logging can only be enabled at activation");
    }

    fn set_collect_installed_apps(&self, enabled: bool) {
        tracing::debug!(enabled, "iOS: installed-apps collection is Android only");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that the bridge reports the correct platform name.
    #[test]
    fn platform_name() {
        assert_eq!(IosSdk::new().platform_name(), "iOS");
    }

    #[test]
    fn coordinate_encoding_matches_corelocation() {
        assert_eq!(
            CLLocationCoordinate2D::ENCODING.to_string(),
            "{CLLocationCoordinate2D=dd}"
        );
    }

    #[test]
    fn negative_session_timeout_is_skipped() {
        assert_eq!(session_timeout_seconds(30), Some(30));
        assert_eq!(session_timeout_seconds(0), Some(0));
        assert_eq!(session_timeout_seconds(-5), None);
    }

    // Calls that reach the SDK need the AppMetrica framework linked into a
    // running app. They are exercised in the Xcode test target rather than
    // via `cargo test`.
}
