// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The closed set of commands the host may invoke.
//
// The host bridge calls us with an action name and a JSON argument array.
// `Command::decode` validates both once, at the boundary, so everything
// downstream works with typed payloads only.

use serde_json::Value;

use crate::error::{MetricaError, Result};
use crate::json::{arg_bool, arg_i32, arg_opt, arg_str, arg_value};
use crate::types::{ActivationConfig, Location};

/// A decoded host command with its validated payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Activate(ActivationConfig),
    ReportEvent {
        name: String,
        /// Event parameters re-serialized as compact JSON.
        params_json: Option<String>,
    },
    ReportError {
        name: String,
        reason: Option<String>,
    },
    SetLocation(Location),
    SetLocationTracking(bool),
    SetCustomAppVersion(String),
    SetEnvironmentValue {
        key: String,
        /// `None` removes a previously set value.
        value: Option<String>,
    },
    SetSessionTimeout(i32),
    SetReportCrashesEnabled(bool),
    SetLoggingEnabled,
    SetCollectInstalledAppsEnabled(bool),
}

impl Command {
    /// Decode a host invocation.
    ///
    /// Unknown actions yield [`MetricaError::UnknownAction`] carrying the name
    /// verbatim; malformed arguments yield [`MetricaError::InvalidArgument`].
    pub fn decode(action: &str, args: &[Value]) -> Result<Self> {
        let command = match action {
            "activate" => Self::Activate(ActivationConfig::from_json(arg_value(args, 0, action)?)?),
            "reportEvent" => Self::ReportEvent {
                name: arg_str(args, 0, action)?,
                // Anything other than an object means "no parameters".
                params_json: arg_opt(args, 1)
                    .filter(|v| v.is_object())
                    .map(serde_json::to_string)
                    .transpose()?,
            },
            "reportError" => Self::ReportError {
                name: arg_str(args, 0, action)?,
                reason: arg_opt(args, 1).and_then(Value::as_str).map(str::to_owned),
            },
            "setLocation" => Self::SetLocation(Location::from_json(arg_value(args, 0, action)?)?),
            "setLocationTracking" | "setTrackLocationEnabled" => {
                Self::SetLocationTracking(arg_bool(args, 0, action)?)
            }
            "setCustomAppVersion" => Self::SetCustomAppVersion(arg_str(args, 0, action)?),
            "setEnvironmentValue" => Self::SetEnvironmentValue {
                key: arg_str(args, 0, action)?,
                value: match arg_opt(args, 1) {
                    Some(_) => Some(arg_str(args, 1, action)?),
                    None => None,
                },
            },
            "setSessionTimeout" => Self::SetSessionTimeout(arg_i32(args, 0, action)?),
            "setReportCrashesEnabled" => Self::SetReportCrashesEnabled(arg_bool(args, 0, action)?),
            "setLoggingEnabled" => Self::SetLoggingEnabled,
            "setCollectInstalledAppsEnabled" => {
                Self::SetCollectInstalledAppsEnabled(arg_bool(args, 0, action)?)
            }
            other => return Err(MetricaError::UnknownAction(other.to_owned())),
        };
        Ok(command)
    }

    /// Canonical action name, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Activate(_) => "activate",
            Self::ReportEvent { .. } => "reportEvent",
            Self::ReportError { .. } => "reportError",
            Self::SetLocation(_) => "setLocation",
            Self::SetLocationTracking(_) => "setLocationTracking",
            Self::SetCustomAppVersion(_) => "setCustomAppVersion",
            Self::SetEnvironmentValue { .. } => "setEnvironmentValue",
            Self::SetSessionTimeout(_) => "setSessionTimeout",
            Self::SetReportCrashesEnabled(_) => "setReportCrashesEnabled",
            Self::SetLoggingEnabled => "setLoggingEnabled",
            Self::SetCollectInstalledAppsEnabled(_) => "setCollectInstalledAppsEnabled",
        }
    }
}
