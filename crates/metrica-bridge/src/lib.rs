// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Metrica — Native analytics SDK bridge abstractions.
//!
//! This crate defines the [`traits::MetricaSdk`] seam and its per-platform
//! implementations. Higher layers only ever see the trait object; the
//! Android (JNI) and iOS (objc2) specifics stay behind it.

pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod stub;

pub use traits::MetricaSdk;

/// Returns the SDK bridge for the target operating system.
///
/// RETURNS: A boxed trait object (`dyn MetricaSdk`) that abstracts away
/// the underlying native SDK details.
pub fn platform_sdk() -> Box<dyn MetricaSdk> {
    #[cfg(target_os = "ios")]
    {
        // iOS: `objc2` message sends to the YMMYandexMetrica class.
        Box::new(ios::IosSdk::new())
    }
    #[cfg(target_os = "android")]
    {
        // Android: `jni-rs` calls into the YandexMetrica static API.
        Box::new(android::AndroidSdk::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        // DESKTOP/CI: logs and drops every call.
        Box::new(stub::StubSdk)
    }
}
