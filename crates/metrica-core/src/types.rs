// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed records handed to the native analytics SDK.
//
// Each record is translated once from the host's loosely-typed JSON and is
// never mutated afterwards. `None` means "leave the SDK default in place".
// The `Serialize` impls emit the same camelCase wire keys the translators
// read, so a serialized record translates back to itself.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::json::{self, as_object};

/// A device location supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Metres above sea level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Horizontal accuracy in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f32>,
    /// Vertical accuracy in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_accuracy: Option<f32>,
    /// Movement course in degrees. The wire key is `course`.
    #[serde(rename = "course", skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Fix time as reported by the host, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Location {
    /// Translate a host location object. Absent keys stay `None`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "location")?;
        Ok(Self {
            latitude: json::opt_f64(obj, "latitude")?,
            longitude: json::opt_f64(obj, "longitude")?,
            altitude: json::opt_f64(obj, "altitude")?,
            accuracy: json::opt_f32(obj, "accuracy")?,
            vertical_accuracy: json::opt_f32(obj, "verticalAccuracy")?,
            bearing: json::opt_f32(obj, "course")?,
            speed: json::opt_f32(obj, "speed")?,
            timestamp: json::opt_i64(obj, "timestamp")?,
        })
    }
}

/// Attribution data for apps pre-installed by a distribution partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadInfo {
    pub tracking_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: BTreeMap<String, String>,
}

impl PreloadInfo {
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "preloadInfo")?;
        let tracking_id = json::req_str(obj, "trackingId")?;

        let mut additional_info = BTreeMap::new();
        if let Some(extra) = obj.get("additionalInfo").filter(|v| !v.is_null()) {
            for (key, value) in as_object(extra, "additionalInfo")? {
                let value = value.as_str().ok_or_else(|| {
                    crate::MetricaError::invalid(format!(
                        "additionalInfo value for \"{key}\" is not a string"
                    ))
                })?;
                additional_info.insert(key.clone(), value.to_owned());
            }
        }

        Ok(Self {
            tracking_id,
            additional_info,
        })
    }
}

/// Everything the SDK needs to activate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationConfig {
    pub api_key: String,
    /// Treat the first launch with the SDK as an update rather than an
    /// install.
    #[serde(
        rename = "handleFirstActivationAsUpdateEnabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub handle_first_activation_as_update: Option<bool>,
    #[serde(rename = "trackLocationEnabled", skip_serializing_if = "Option::is_none")]
    pub track_location: Option<bool>,
    /// Seconds in background before a session ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_timeout: Option<i32>,
    #[serde(rename = "reportCrashesEnabled", skip_serializing_if = "Option::is_none")]
    pub report_crashes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// SDK logging is switch-on only; `false` leaves the SDK default.
    pub logging_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload_info: Option<PreloadInfo>,
}

impl ActivationConfig {
    /// A config carrying only the API key; every other field at its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            handle_first_activation_as_update: None,
            track_location: None,
            session_timeout: None,
            report_crashes: None,
            app_version: None,
            logging_enabled: false,
            location: None,
            preload_info: None,
        }
    }

    /// Translate a host activation object. `apiKey` is mandatory; any
    /// present-but-mistyped field fails the whole translation.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "config")?;
        let location = match obj.get("location").filter(|v| !v.is_null()) {
            Some(v) => Some(Location::from_json(v)?),
            None => None,
        };
        let preload_info = match obj.get("preloadInfo").filter(|v| !v.is_null()) {
            Some(v) => Some(PreloadInfo::from_json(v)?),
            None => None,
        };

        Ok(Self {
            api_key: json::req_str(obj, "apiKey")?,
            handle_first_activation_as_update: json::opt_bool(
                obj,
                "handleFirstActivationAsUpdateEnabled",
            )?,
            track_location: json::opt_bool(obj, "trackLocationEnabled")?,
            session_timeout: json::opt_i32(obj, "sessionTimeout")?,
            report_crashes: json::opt_bool(obj, "reportCrashesEnabled")?,
            app_version: json::opt_str(obj, "appVersion")?,
            logging_enabled: json::opt_bool(obj, "loggingEnabled")?.unwrap_or(false),
            location,
            preload_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_key_only_leaves_everything_default() {
        let config = ActivationConfig::from_json(&json!({"apiKey": "K"})).expect("valid config");
        assert_eq!(config, ActivationConfig::new("K"));
    }

    #[test]
    fn session_timeout_is_copied() {
        let config = ActivationConfig::from_json(&json!({"apiKey": "K", "sessionTimeout": 30}))
            .expect("valid config");
        let mut expected = ActivationConfig::new("K");
        expected.session_timeout = Some(30);
        assert_eq!(config, expected);
    }

    #[test]
    fn missing_api_key_fails() {
        let err = ActivationConfig::from_json(&json!({"sessionTimeout": 30}))
            .expect_err("apiKey required");
        assert_eq!(err.to_string(), "missing required field \"apiKey\"");
    }

    #[test]
    fn mistyped_optional_field_fails_whole_config() {
        let err = ActivationConfig::from_json(&json!({"apiKey": "K", "reportCrashesEnabled": "yes"}))
            .expect_err("wrong type");
        assert_eq!(err.to_string(), "field \"reportCrashesEnabled\" is not a boolean");
    }

    #[test]
    fn non_object_config_fails() {
        let err = ActivationConfig::from_json(&json!("K")).expect_err("not an object");
        assert_eq!(err.to_string(), "config is not an object");
    }

    #[test]
    fn full_config_translates_every_field() {
        let input = json!({
            "apiKey": "5012c3cc-20a4-4dac-92d1-83ebc27c0fa9",
            "handleFirstActivationAsUpdateEnabled": true,
            "trackLocationEnabled": false,
            "sessionTimeout": 15,
            "reportCrashesEnabled": false,
            "appVersion": "2.1.0",
            "loggingEnabled": true,
            "location": {"latitude": 53.890651, "longitude": 27.525408},
            "preloadInfo": {
                "trackingId": "654321",
                "additionalInfo": {"source": "partner", "campaign": "spring"}
            }
        });
        let config = ActivationConfig::from_json(&input).expect("valid config");

        assert_eq!(config.handle_first_activation_as_update, Some(true));
        assert_eq!(config.track_location, Some(false));
        assert_eq!(config.session_timeout, Some(15));
        assert_eq!(config.report_crashes, Some(false));
        assert_eq!(config.app_version.as_deref(), Some("2.1.0"));
        assert!(config.logging_enabled);

        let location = config.location.as_ref().expect("location");
        assert_eq!(location.latitude, Some(53.890651));
        assert_eq!(location.altitude, None);

        let preload = config.preload_info.as_ref().expect("preload info");
        assert_eq!(preload.tracking_id, "654321");
        assert_eq!(preload.additional_info.len(), 2);
        assert_eq!(preload.additional_info["campaign"], "spring");

        // Serializing emits the wire keys, so the record translates back to itself.
        let wire = serde_json::to_value(&config).expect("serialize");
        assert_eq!(ActivationConfig::from_json(&wire).expect("re-translate"), config);
    }

    #[test]
    fn location_reads_course_as_bearing() {
        let location = Location::from_json(&json!({
            "latitude": 55.734417,
            "longitude": 37.588029,
            "altitude": 157,
            "accuracy": 45,
            "verticalAccuracy": 25,
            "course": 42,
            "speed": 1,
            "timestamp": 1490352342
        }))
        .expect("valid location");

        assert_eq!(location.altitude, Some(157.0));
        assert_eq!(location.accuracy, Some(45.0));
        assert_eq!(location.vertical_accuracy, Some(25.0));
        assert_eq!(location.bearing, Some(42.0));
        assert_eq!(location.speed, Some(1.0));
        assert_eq!(location.timestamp, Some(1490352342));
    }

    #[test]
    fn empty_location_is_all_defaults() {
        let location = Location::from_json(&json!({})).expect("valid location");
        assert_eq!(location, Location::default());
    }

    #[test]
    fn location_with_string_latitude_fails() {
        let err = Location::from_json(&json!({"latitude": "53.9"})).expect_err("wrong type");
        assert_eq!(err.to_string(), "field \"latitude\" is not a number");
    }

    #[test]
    fn preload_info_rejects_non_string_values() {
        let err = PreloadInfo::from_json(&json!({
            "trackingId": "1",
            "additionalInfo": {"count": 3}
        }))
        .expect_err("value must be a string");
        assert_eq!(err.to_string(), "additionalInfo value for \"count\" is not a string");
    }

    #[test]
    fn preload_info_requires_tracking_id() {
        let err = PreloadInfo::from_json(&json!({"additionalInfo": {}})).expect_err("required");
        assert_eq!(err.to_string(), "missing required field \"trackingId\"");
    }

    #[test]
    fn bad_nested_location_aborts_config() {
        let err = ActivationConfig::from_json(&json!({"apiKey": "K", "location": {"speed": true}}))
            .expect_err("nested failure");
        assert_eq!(err.to_string(), "field \"speed\" is not a number");
    }
}
