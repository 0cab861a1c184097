// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android analytics bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method invokes the corresponding
// static method on `com.yandex.metrica.YandexMetrica` through JNI calls into
// the ART runtime.
//
// ## Architecture notes
//
// The SDK is called from the plugin's worker thread and, for pause/resume,
// from the host's UI thread. Both are attached to the JVM permanently on
// first use; every call runs inside its own local reference frame so that
// long-lived attached threads do not leak local refs.
//
// A Java exception thrown by the SDK surfaces here as
// `jni::errors::Error::JavaException`. It is cleared and logged; the SDK
// contract is fire-and-forget, so nothing is propagated to the host.

#![cfg(target_os = "android")]

use jni::objects::{JObject, JValue};
use jni::JNIEnv;

use metrica_core::error::{MetricaError, Result};
use metrica_core::types::{ActivationConfig, Location, PreloadInfo};

use crate::traits::*;

// ---------------------------------------------------------------------------
// Java class names and signatures
// ---------------------------------------------------------------------------

const METRICA_CLASS: &str = "com/yandex/metrica/YandexMetrica";
const CONFIG_CLASS: &str = "com/yandex/metrica/YandexMetricaConfig";
const CONFIG_BUILDER_SIG: &str = "Lcom/yandex/metrica/YandexMetricaConfig$Builder;";
const PRELOAD_CLASS: &str = "com/yandex/metrica/PreloadInfo";
const PRELOAD_BUILDER_SIG: &str = "Lcom/yandex/metrica/PreloadInfo$Builder;";
const LOCATION_CLASS: &str = "android/location/Location";

/// Provider name stamped on host-supplied locations.
const LOCATION_PROVIDER: &str = "Custom";

/// Local reference capacity for a single SDK call.
const LOCAL_FRAME_CAPACITY: i32 = 32;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Obtain the current Android `Activity` as a [`JObject`].
///
/// The pointer comes from `ndk_context::android_context().context()` which
/// is the global `jobject` for the `Activity` hosting the native code.
fn activity() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(MetricaError::Bridge(
            "Android context is null; host activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity. `JObject` does not delete the reference on drop.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Run `f` with an attached [`JNIEnv`] and the host activity.
///
/// The current thread is attached permanently (the worker and UI threads
/// live for the whole process) and `f` runs inside a fresh local frame.
fn with_env<F>(what: &'static str, f: F) -> Result<()>
where
    F: for<'local> FnOnce(&mut JNIEnv<'local>, &JObject<'static>) -> jni::errors::Result<()>,
{
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| MetricaError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let mut env = vm
        .attach_current_thread_permanently()
        .map_err(|e| MetricaError::Bridge(format!("failed to attach JNI thread: {e}")))?;
    let activity = activity()?;

    let outcome = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env, &activity));
    if let Err(e) = outcome {
        if matches!(e, jni::errors::Error::JavaException) {
            // Leave no exception pending for the next JNI call.
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        return Err(jni_err(what, e));
    }
    Ok(())
}

/// Convenience: map any `jni::errors::Error` into `MetricaError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> MetricaError {
    MetricaError::Bridge(format!("{context}: {e}"))
}

/// Log the outcome of a fire-and-forget SDK call.
fn fire(what: &'static str, result: Result<()>) {
    match result {
        Ok(()) => tracing::debug!(call = what, "Android: sdk call dispatched"),
        Err(e) => tracing::warn!(call = what, error = %e, "Android: sdk call failed"),
    }
}

fn jbool(value: bool) -> JValue<'static, 'static> {
    JValue::Bool(u8::from(value))
}

// ---------------------------------------------------------------------------
// Java object builders
// ---------------------------------------------------------------------------

/// Build an `android.location.Location`, applying only the present fields.
///
/// Vertical accuracy needs API 26 and is not forwarded.
fn build_location<'local>(
    env: &mut JNIEnv<'local>,
    location: &Location,
) -> jni::errors::Result<JObject<'local>> {
    let provider = env.new_string(LOCATION_PROVIDER)?;
    let obj = env.new_object(
        LOCATION_CLASS,
        "(Ljava/lang/String;)V",
        &[JValue::Object(&provider)],
    )?;

    if let Some(v) = location.latitude {
        env.call_method(&obj, "setLatitude", "(D)V", &[JValue::Double(v)])?;
    }
    if let Some(v) = location.longitude {
        env.call_method(&obj, "setLongitude", "(D)V", &[JValue::Double(v)])?;
    }
    if let Some(v) = location.altitude {
        env.call_method(&obj, "setAltitude", "(D)V", &[JValue::Double(v)])?;
    }
    if let Some(v) = location.accuracy {
        env.call_method(&obj, "setAccuracy", "(F)V", &[JValue::Float(v)])?;
    }
    if let Some(v) = location.bearing {
        env.call_method(&obj, "setBearing", "(F)V", &[JValue::Float(v)])?;
    }
    if let Some(v) = location.speed {
        env.call_method(&obj, "setSpeed", "(F)V", &[JValue::Float(v)])?;
    }
    if let Some(v) = location.timestamp {
        env.call_method(&obj, "setTime", "(J)V", &[JValue::Long(v)])?;
    }
    Ok(obj)
}

/// Build a `com.yandex.metrica.PreloadInfo` through its builder.
fn build_preload_info<'local>(
    env: &mut JNIEnv<'local>,
    info: &PreloadInfo,
) -> jni::errors::Result<JObject<'local>> {
    let tracking_id = env.new_string(&info.tracking_id)?;
    let mut builder = env
        .call_static_method(
            PRELOAD_CLASS,
            "newBuilder",
            format!("(Ljava/lang/String;){PRELOAD_BUILDER_SIG}"),
            &[JValue::Object(&tracking_id)],
        )?
        .l()?;

    for (key, value) in &info.additional_info {
        let j_key = env.new_string(key)?;
        let j_value = env.new_string(value)?;
        builder = env
            .call_method(
                &builder,
                "setAdditionalParams",
                format!("(Ljava/lang/String;Ljava/lang/String;){PRELOAD_BUILDER_SIG}"),
                &[JValue::Object(&j_key), JValue::Object(&j_value)],
            )?
            .l()?;
    }

    env.call_method(&builder, "build", "()Lcom/yandex/metrica/PreloadInfo;", &[])?
        .l()
}

/// Build a `com.yandex.metrica.YandexMetricaConfig`, applying only the
/// present fields so the SDK defaults hold for the rest.
fn build_config<'local>(
    env: &mut JNIEnv<'local>,
    config: &ActivationConfig,
) -> jni::errors::Result<JObject<'local>> {
    let api_key = env.new_string(&config.api_key)?;
    let builder = env
        .call_static_method(
            CONFIG_CLASS,
            "newConfigBuilder",
            format!("(Ljava/lang/String;){CONFIG_BUILDER_SIG}"),
            &[JValue::Object(&api_key)],
        )?
        .l()?;

    let bool_setter = format!("(Z){CONFIG_BUILDER_SIG}");
    if let Some(v) = config.handle_first_activation_as_update {
        env.call_method(&builder, "handleFirstActivationAsUpdate", &bool_setter, &[jbool(v)])?;
    }
    if let Some(v) = config.track_location {
        env.call_method(&builder, "setTrackLocationEnabled", &bool_setter, &[jbool(v)])?;
    }
    if let Some(v) = config.session_timeout {
        env.call_method(
            &builder,
            "setSessionTimeout",
            format!("(I){CONFIG_BUILDER_SIG}"),
            &[JValue::Int(v)],
        )?;
    }
    if let Some(v) = config.report_crashes {
        env.call_method(&builder, "setReportCrashesEnabled", &bool_setter, &[jbool(v)])?;
    }
    if let Some(version) = &config.app_version {
        let j_version = env.new_string(version)?;
        env.call_method(
            &builder,
            "setAppVersion",
            format!("(Ljava/lang/String;){CONFIG_BUILDER_SIG}"),
            &[JValue::Object(&j_version)],
        )?;
    }
    if config.logging_enabled {
        env.call_method(&builder, "setLogEnabled", format!("(){CONFIG_BUILDER_SIG}"), &[])?;
    }
    if let Some(location) = &config.location {
        let j_location = build_location(env, location)?;
        env.call_method(
            &builder,
            "setLocation",
            format!("(Landroid/location/Location;){CONFIG_BUILDER_SIG}"),
            &[JValue::Object(&j_location)],
        )?;
    }
    if let Some(info) = &config.preload_info {
        let j_info = build_preload_info(env, info)?;
        env.call_method(
            &builder,
            "setPreloadInfo",
            format!("(Lcom/yandex/metrica/PreloadInfo;){CONFIG_BUILDER_SIG}"),
            &[JValue::Object(&j_info)],
        )?;
    }

    env.call_method(&builder, "build", "()Lcom/yandex/metrica/YandexMetricaConfig;", &[])?
        .l()
}

/// Call a `void` static method on `YandexMetrica`.
fn call_metrica(
    env: &mut JNIEnv<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> jni::errors::Result<()> {
    env.call_static_method(METRICA_CLASS, name, sig, args)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// SDK struct
// ---------------------------------------------------------------------------

/// Android implementation of the Metrica SDK bridge.
///
/// The struct is zero-sized; all state lives in the Java SDK.
pub struct AndroidSdk;

impl AndroidSdk {
    /// Create a new Android SDK bridge.
    ///
    /// This does **not** touch JNI. The first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricaSdk for AndroidSdk {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// NativeActivation: YandexMetrica.activate
// ---------------------------------------------------------------------------

impl NativeActivation for AndroidSdk {
    fn activate(&self, config: &ActivationConfig) {
        tracing::info!(
            session_timeout = ?config.session_timeout,
            preload = config.preload_info.is_some(),
            "Android: activating sdk"
        );
        fire(
            "activate",
            with_env("activate", |env, activity| {
                let j_config = build_config(env, config)?;
                let app_context = env
                    .call_method(activity, "getApplicationContext", "()Landroid/content/Context;", &[])?
                    .l()?;
                call_metrica(
                    env,
                    "activate",
                    "(Landroid/content/Context;Lcom/yandex/metrica/YandexMetricaConfig;)V",
                    &[JValue::Object(&app_context), JValue::Object(&j_config)],
                )
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// NativeSessionLifecycle: activity-scoped calls
// ---------------------------------------------------------------------------

impl NativeSessionLifecycle for AndroidSdk {
    fn report_app_open(&self) {
        fire(
            "reportAppOpen",
            with_env("reportAppOpen", |env, activity| {
                call_metrica(
                    env,
                    "reportAppOpen",
                    "(Landroid/app/Activity;)V",
                    &[JValue::Object(activity)],
                )
            }),
        );
    }

    fn resume_session(&self) {
        fire(
            "onResumeActivity",
            with_env("onResumeActivity", |env, activity| {
                call_metrica(
                    env,
                    "onResumeActivity",
                    "(Landroid/app/Activity;)V",
                    &[JValue::Object(activity)],
                )
            }),
        );
    }

    fn pause_session(&self) {
        fire(
            "onPauseActivity",
            with_env("onPauseActivity", |env, activity| {
                call_metrica(
                    env,
                    "onPauseActivity",
                    "(Landroid/app/Activity;)V",
                    &[JValue::Object(activity)],
                )
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// NativeReporting
// ---------------------------------------------------------------------------

impl NativeReporting for AndroidSdk {
    fn report_event(&self, name: &str, params_json: Option<&str>) {
        fire(
            "reportEvent",
            with_env("reportEvent", |env, _| {
                let j_name = env.new_string(name)?;
                match params_json {
                    Some(params) => {
                        let j_params = env.new_string(params)?;
                        call_metrica(
                            env,
                            "reportEvent",
                            "(Ljava/lang/String;Ljava/lang/String;)V",
                            &[JValue::Object(&j_name), JValue::Object(&j_params)],
                        )
                    }
                    None => call_metrica(
                        env,
                        "reportEvent",
                        "(Ljava/lang/String;)V",
                        &[JValue::Object(&j_name)],
                    ),
                }
            }),
        );
    }

    fn report_error(&self, name: &str, reason: Option<&str>) {
        fire(
            "reportError",
            with_env("reportError", |env, _| {
                let j_name = env.new_string(name)?;
                // The SDK takes a Throwable; the reason becomes its message.
                let throwable = match reason {
                    Some(reason) => {
                        let j_reason = env.new_string(reason)?;
                        env.new_object(
                            "java/lang/Throwable",
                            "(Ljava/lang/String;)V",
                            &[JValue::Object(&j_reason)],
                        )?
                    }
                    None => JObject::null(),
                };
                call_metrica(
                    env,
                    "reportError",
                    "(Ljava/lang/String;Ljava/lang/Throwable;)V",
                    &[JValue::Object(&j_name), JValue::Object(&throwable)],
                )
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// NativeLocation
// ---------------------------------------------------------------------------

impl NativeLocation for AndroidSdk {
    fn set_location(&self, location: &Location) {
        fire(
            "setLocation",
            with_env("setLocation", |env, _| {
                let j_location = build_location(env, location)?;
                call_metrica(
                    env,
                    "setLocation",
                    "(Landroid/location/Location;)V",
                    &[JValue::Object(&j_location)],
                )
            }),
        );
    }

    fn set_location_tracking(&self, enabled: bool) {
        fire(
            "setTrackLocationEnabled",
            with_env("setTrackLocationEnabled", |env, _| {
                call_metrica(env, "setTrackLocationEnabled", "(Z)V", &[jbool(enabled)])
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// NativeSettings
// ---------------------------------------------------------------------------

impl NativeSettings for AndroidSdk {
    fn set_custom_app_version(&self, version: &str) {
        fire(
            "setCustomAppVersion",
            with_env("setCustomAppVersion", |env, _| {
                let j_version = env.new_string(version)?;
                call_metrica(
                    env,
                    "setCustomAppVersion",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&j_version)],
                )
            }),
        );
    }

    fn set_environment_value(&self, key: &str, value: Option<&str>) {
        fire(
            "setEnvironmentValue",
            with_env("setEnvironmentValue", |env, _| {
                let j_key = env.new_string(key)?;
                let j_value = match value {
                    Some(v) => JObject::from(env.new_string(v)?),
                    None => JObject::null(),
                };
                call_metrica(
                    env,
                    "setEnvironmentValue",
                    "(Ljava/lang/String;Ljava/lang/String;)V",
                    &[JValue::Object(&j_key), JValue::Object(&j_value)],
                )
            }),
        );
    }

    fn set_session_timeout(&self, seconds: i32) {
        fire(
            "setSessionTimeout",
            with_env("setSessionTimeout", |env, _| {
                call_metrica(env, "setSessionTimeout", "(I)V", &[JValue::Int(seconds)])
            }),
        );
    }

    fn set_report_crashes_enabled(&self, enabled: bool) {
        fire(
            "setReportCrashesEnabled",
            with_env("setReportCrashesEnabled", |env, _| {
                call_metrica(env, "setReportCrashesEnabled", "(Z)V", &[jbool(enabled)])
            }),
        );
    }

    fn set_logging_enabled(&self) {
        fire(
            "setLogEnabled",
            with_env("setLogEnabled", |env, _| call_metrica(env, "setLogEnabled", "()V", &[])),
        );
    }

    fn set_collect_installed_apps(&self, enabled: bool) {
        fire(
            "setCollectInstalledApps",
            with_env("setCollectInstalledApps", |env, _| {
                call_metrica(env, "setCollectInstalledApps", "(Z)V", &[jbool(enabled)])
            }),
        );
    }
}
