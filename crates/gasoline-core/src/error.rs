//! Unified error taxonomy for the gasoline daemon.
//!
//! A single [`GasolineError`] enum is shared by every crate in the
//! workspace, mirroring the "one error type per layer" convention used
//! throughout this codebase. Each variant carries a recovery hint so
//! that tool-layer responses (see `gasoline-protocol::ToolError`) never
//! have to invent one ad hoc.

use std::fmt;

/// Result type alias used across the workspace.
pub type GasolineResult<T> = Result<T, GasolineError>;

/// The five error categories from the design's error taxonomy
/// (validation, state, capacity, remote/infra, internal), flattened
/// into one enum so conversions at the protocol boundary stay simple.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum GasolineError {
    // --- Validation ---
    /// The request body was not valid JSON.
    #[error("invalid JSON: {reason}")]
    InvalidJson {
        /// Parser-reported reason.
        reason: String,
    },

    /// A required parameter was missing.
    #[error("missing parameter '{name}'")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// A parameter was present but held an invalid value.
    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidParameterValue {
        /// Name of the offending parameter.
        name: String,
        /// Human-readable reason.
        reason: String,
    },

    // --- State ---
    /// A read was attempted before the relevant subsystem finished
    /// initializing.
    #[error("not initialized")]
    NotInitialized,

    /// A query matched nothing (e.g. an empty diff window).
    #[error("no data available")]
    NoData,

    /// A verification or snapshot session id did not resolve.
    #[error("session not found: {id}")]
    SessionNotFound {
        /// The id that failed to resolve.
        id: String,
    },

    /// A named checkpoint did not resolve in the checkpoint manager.
    #[error("checkpoint unknown: {name}")]
    CheckpointUnknown {
        /// The name that failed to resolve.
        name: String,
    },

    // --- Capacity ---
    /// An ingest endpoint's token bucket is exhausted.
    #[error("rate limited")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if known.
        retry_after_ms: Option<u64>,
    },

    /// A request body exceeded its endpoint's size cap.
    #[error("body too large: {actual} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge {
        /// The cap that was exceeded.
        limit: usize,
        /// The actual observed size.
        actual: usize,
    },

    /// A bounded collection (verification sessions, named checkpoints,
    /// snapshots) is already at capacity.
    #[error("max concurrent {what} reached ({limit})")]
    CapacityExceeded {
        /// What kind of resource hit its cap.
        what: &'static str,
        /// The configured cap.
        limit: usize,
    },

    // --- Remote / infra ---
    /// The capture daemon has not finished starting; callers on the
    /// bridge path turn this into a retry-style success payload rather
    /// than surfacing it as an error.
    #[error("daemon not ready")]
    DaemonNotReady,

    /// A forwarded HTTP call to the local daemon timed out.
    #[error("upstream timeout after {0:?}")]
    UpstreamTimeout(std::time::Duration),

    // --- Internal ---
    /// A programming error. Never retried; logged locally and reported
    /// generically to avoid leaking internals to the AI client.
    #[error("internal error: {message}")]
    Internal {
        /// Internal diagnostic message (not necessarily client-safe).
        message: String,
    },
}

impl GasolineError {
    /// A short, user-facing hint explaining how to recover, per the
    /// "every error carries a recovery hint" requirement.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::InvalidJson { .. } => "fix JSON syntax and retry",
            Self::MissingParameter { .. } => "add the missing parameter",
            Self::InvalidParameterValue { .. } => "check the parameter's allowed values",
            Self::NotInitialized => "retry shortly; the capture backend is still starting",
            Self::NoData => "no data matched this query; widen the window or checkpoint",
            Self::SessionNotFound { .. } => "start a new session; this id has expired or never existed",
            Self::CheckpointUnknown { .. } => "create the checkpoint before diffing against it",
            Self::RateLimited { .. } => "slow down and retry after the suggested delay",
            Self::BodyTooLarge { .. } => "reduce payload size or split the request",
            Self::CapacityExceeded { .. } => "free a slot (cancel a session or evict a checkpoint) and retry",
            Self::DaemonNotReady => "retry shortly; the capture backend is still starting",
            Self::UpstreamTimeout(_) => "retry; the local daemon did not respond in time",
            Self::Internal { .. } => "internal error — do not retry",
        }
    }

    /// Stable machine-readable code used by the tool-error payload
    /// (`isError:true` content) and mapped onto JSON-RPC codes at the
    /// dispatcher boundary.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson { .. } => "invalid_json",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidParameterValue { .. } => "invalid_parameter_value",
            Self::NotInitialized => "not_initialized",
            Self::NoData => "no_data",
            Self::SessionNotFound { .. } => "session_not_found",
            Self::CheckpointUnknown { .. } => "checkpoint_unknown",
            Self::RateLimited { .. } => "rate_limited",
            Self::BodyTooLarge { .. } => "body_too_large",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::DaemonNotReady => "daemon_not_ready",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::Internal { .. } => "internal",
        }
    }

    /// The parameter name implicated by this error, if any, for the
    /// structured tool error record's optional `param` field.
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::MissingParameter { name } | Self::InvalidParameterValue { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Build an [`Internal`](Self::Internal) variant from any
    /// `Display`-able error, logging it at `error` level as it crosses
    /// this boundary (internal errors are logged locally, never
    /// retried).
    pub fn internal(err: impl fmt::Display) -> Self {
        let message = err.to_string();
        tracing::error!(%message, "internal error");
        Self::Internal { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_non_empty_hint() {
        let errs = [
            GasolineError::InvalidJson { reason: "x".into() },
            GasolineError::MissingParameter { name: "x".into() },
            GasolineError::NotInitialized,
            GasolineError::NoData,
            GasolineError::SessionNotFound { id: "x".into() },
            GasolineError::CheckpointUnknown { name: "x".into() },
            GasolineError::RateLimited { retry_after_ms: None },
            GasolineError::BodyTooLarge { limit: 1, actual: 2 },
            GasolineError::CapacityExceeded { what: "sessions", limit: 3 },
            GasolineError::DaemonNotReady,
            GasolineError::Internal { message: "x".into() },
        ];
        for e in errs {
            assert!(!e.hint().is_empty());
            assert!(!e.code().is_empty());
        }
    }

    #[test]
    fn missing_parameter_carries_its_name() {
        let e = GasolineError::MissingParameter { name: "action".into() };
        assert_eq!(e.param(), Some("action"));
    }
}
