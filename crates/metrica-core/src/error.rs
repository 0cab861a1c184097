// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Metrica bridge.

use thiserror::Error;

/// Top-level error type for all Metrica bridge operations.
///
/// Only `UnknownAction` and `InvalidArgument` ever reach the host as command
/// results; the rest come from settings loading and the worker plumbing.
#[derive(Debug, Error)]
pub enum MetricaError {
    // -- Command surface --
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Argument or payload shape rejected by the translator. The message is
    /// surfaced to the host verbatim.
    #[error("{0}")]
    InvalidArgument(String),

    // -- Settings / host input --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("command worker has stopped")]
    WorkerStopped,
}

impl MetricaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MetricaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_message_carries_the_name() {
        let err = MetricaError::UnknownAction("frobnicate".into());
        assert_eq!(err.to_string(), "Unknown action: frobnicate");
    }

    #[test]
    fn invalid_argument_message_is_verbatim() {
        let err = MetricaError::invalid("field \"apiKey\" is not a string");
        assert_eq!(err.to_string(), "field \"apiKey\" is not a string");
    }
}
