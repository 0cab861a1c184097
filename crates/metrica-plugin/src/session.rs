// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Activation and foreground state, together with the SDK handle they gate.
//
// The session is the only place the SDK is reachable from. It is shared as
// `Arc<Mutex<Session>>` between the command worker and the host's lifecycle
// hooks, so holding the lock is what guarantees a single in-flight SDK call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use metrica_bridge::MetricaSdk;
use metrica_core::{ActivationConfig, Command};

/// Session handle shared by the worker and the lifecycle hooks.
pub type SharedSession = Arc<Mutex<Session>>;

/// Whether the SDK has been activated. One-way: there is no deactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    NotActivated,
    /// Activated, first at `since`.
    Activated { since: DateTime<Utc> },
}

/// SDK handle plus the two pieces of state that gate it.
pub struct Session {
    sdk: Box<dyn MetricaSdk>,
    activation: ActivationState,
    /// The host starts out backgrounded until it reports a resume.
    paused: bool,
}

impl Session {
    pub fn new(sdk: Box<dyn MetricaSdk>) -> Self {
        Self {
            sdk,
            activation: ActivationState::NotActivated,
            paused: true,
        }
    }

    /// Wrap a new session for sharing.
    pub fn shared(sdk: Box<dyn MetricaSdk>) -> SharedSession {
        Arc::new(Mutex::new(Self::new(sdk)))
    }

    pub fn activation(&self) -> ActivationState {
        self.activation
    }

    pub fn is_activated(&self) -> bool {
        matches!(self.activation, ActivationState::Activated { .. })
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn platform_name(&self) -> &str {
        self.sdk.platform_name()
    }

    /// Host came to the foreground. Returns whether the SDK was told.
    pub fn resume(&mut self) -> bool {
        self.paused = false;
        if self.is_activated() {
            self.sdk.resume_session();
            true
        } else {
            debug!("resume before activation; not forwarded");
            false
        }
    }

    /// Host went to the background. Returns whether the SDK was told.
    pub fn pause(&mut self) -> bool {
        self.paused = true;
        if self.is_activated() {
            self.sdk.pause_session();
            true
        } else {
            debug!("pause before activation; not forwarded");
            false
        }
    }

    /// The app was re-opened through a new intent. Returns whether the SDK
    /// was told.
    pub fn reopen(&mut self) -> bool {
        if self.is_activated() {
            self.sdk.report_app_open();
            true
        } else {
            debug!("app reopen before activation; not forwarded");
            false
        }
    }

    /// Activate the SDK. Every call re-initialises the SDK; only the first
    /// one reports the app open and, when the host is already in the
    /// foreground, catches up on the resume the SDK never saw.
    ///
    /// Returns `true` on the first activation.
    pub fn activate(&mut self, config: &ActivationConfig) -> bool {
        self.sdk.activate(config);
        if self.is_activated() {
            debug!("sdk re-activated");
            return false;
        }

        let since = Utc::now();
        self.activation = ActivationState::Activated { since };
        info!(platform = self.sdk.platform_name(), %since, "sdk activated");

        self.sdk.report_app_open();
        if !self.paused {
            self.sdk.resume_session();
        }
        true
    }

    /// Forward a decoded command to the SDK.
    pub fn apply(&mut self, command: &Command) {
        let sdk = self.sdk.as_ref();
        match command {
            Command::Activate(config) => {
                self.activate(config);
            }
            Command::ReportEvent { name, params_json } => {
                sdk.report_event(name, params_json.as_deref());
            }
            Command::ReportError { name, reason } => {
                sdk.report_error(name, reason.as_deref());
            }
            Command::SetLocation(location) => sdk.set_location(location),
            Command::SetLocationTracking(enabled) => sdk.set_location_tracking(*enabled),
            Command::SetCustomAppVersion(version) => sdk.set_custom_app_version(version),
            Command::SetEnvironmentValue { key, value } => {
                sdk.set_environment_value(key, value.as_deref());
            }
            Command::SetSessionTimeout(seconds) => sdk.set_session_timeout(*seconds),
            Command::SetReportCrashesEnabled(enabled) => sdk.set_report_crashes_enabled(*enabled),
            Command::SetLoggingEnabled => sdk.set_logging_enabled(),
            Command::SetCollectInstalledAppsEnabled(enabled) => {
                sdk.set_collect_installed_apps(*enabled);
            }
        }
    }
}

/// Lock the session, recovering the state if a previous holder panicked.
///
/// The flags are plain values that are always left consistent between
/// statements, so a poisoned lock carries no torn state.
pub(crate) fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("session lock poisoned; recovering");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSdk, SdkCall};

    fn session() -> (Session, RecordingSdk) {
        let sdk = RecordingSdk::new();
        (Session::new(Box::new(sdk.clone())), sdk)
    }

    #[test]
    fn starts_paused_and_not_activated() {
        let (session, _) = session();
        assert!(session.is_paused());
        assert_eq!(session.activation(), ActivationState::NotActivated);
    }

    #[test]
    fn lifecycle_before_activation_updates_flag_only() {
        let (mut session, sdk) = session();
        assert!(!session.resume());
        assert!(!session.is_paused());
        assert!(!session.pause());
        assert!(session.is_paused());
        assert!(!session.reopen());
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn first_activation_in_background_reports_open_only() {
        let (mut session, sdk) = session();
        assert!(session.activate(&ActivationConfig::new("K")));
        assert_eq!(
            sdk.calls(),
            vec![SdkCall::Activate("K".into()), SdkCall::AppOpen]
        );
    }

    #[test]
    fn first_activation_in_foreground_catches_up_resume() {
        let (mut session, sdk) = session();
        session.resume();
        session.activate(&ActivationConfig::new("K"));
        assert_eq!(
            sdk.calls(),
            vec![
                SdkCall::Activate("K".into()),
                SdkCall::AppOpen,
                SdkCall::Resume
            ]
        );
    }

    #[test]
    fn second_activation_skips_catch_up() {
        let (mut session, sdk) = session();
        session.resume();
        session.activate(&ActivationConfig::new("K"));
        let since = session.activation();
        sdk.clear();

        assert!(!session.activate(&ActivationConfig::new("K2")));
        assert_eq!(sdk.calls(), vec![SdkCall::Activate("K2".into())]);
        // The activation instant is the first one.
        assert_eq!(session.activation(), since);
    }

    #[test]
    fn lifecycle_after_activation_is_forwarded() {
        let (mut session, sdk) = session();
        session.activate(&ActivationConfig::new("K"));
        sdk.clear();

        assert!(session.resume());
        assert!(session.pause());
        assert!(session.reopen());
        assert_eq!(
            sdk.calls(),
            vec![SdkCall::Resume, SdkCall::Pause, SdkCall::AppOpen]
        );
    }

    #[test]
    fn apply_forwards_setters() {
        let (mut session, sdk) = session();
        session.apply(&Command::SetSessionTimeout(30));
        session.apply(&Command::SetEnvironmentValue {
            key: "build".into(),
            value: None,
        });
        session.apply(&Command::SetLoggingEnabled);
        assert_eq!(
            sdk.calls(),
            vec![
                SdkCall::SessionTimeout(30),
                SdkCall::EnvironmentValue("build".into(), None),
                SdkCall::LoggingEnabled,
            ]
        );
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = Session::shared(Box::new(RecordingSdk::new()));
        let clone = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().expect("first lock");
            panic!("poison the session lock");
        })
        .join();

        assert!(shared.is_poisoned());
        let mut guard = lock(&shared);
        guard.resume();
        assert!(!guard.is_paused());
    }
}
