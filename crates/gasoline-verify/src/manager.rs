//! `VerificationManager`: at most 3 concurrent sessions, TTL-swept
//! lazily on `start` (spec §4.5/§5).

use crate::session::{VerificationSession, DEFAULT_TTL_SECS};
use crate::state::VerificationState;
use gasoline_capture::CapturePipeline;
use gasoline_core::GasolineError;
use parking_lot::Mutex;
use std::collections::HashMap;

pub const MAX_CONCURRENT_SESSIONS: usize = 3;

pub struct VerificationManager {
    sessions: Mutex<HashMap<String, VerificationSession>>,
    ttl_secs: i64,
}

impl Default for VerificationManager {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}

impl VerificationManager {
    #[must_use]
    pub fn new(ttl_secs: i64) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), ttl_secs }
    }

    /// Sweep expired sessions, then start a new one if under the
    /// concurrency cap.
    pub fn start(
        &self,
        pipeline: &CapturePipeline,
        label: Option<String>,
        url_filter: Option<String>,
    ) -> Result<String, GasolineError> {
        let mut sessions = self.sessions.lock();
        sessions.retain(|_, s| !s.is_expired(self.ttl_secs));
        if sessions.len() >= MAX_CONCURRENT_SESSIONS {
            return Err(GasolineError::CapacityExceeded { what: "verification sessions", limit: MAX_CONCURRENT_SESSIONS });
        }
        let session = VerificationSession::start(pipeline, label, url_filter);
        let id = session.id.clone();
        sessions.insert(id.clone(), session);
        Ok(id)
    }

    /// `watch(id)`: idempotent transition into `Watching`.
    pub fn watch(&self, id: &str) -> Result<(), GasolineError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| GasolineError::SessionNotFound { id: id.to_string() })?;
        if !session.state.can_watch() {
            return Err(GasolineError::InvalidParameterValue {
                name: "session_id".into(),
                reason: format!("session is {:?}, cannot watch", session.state),
            });
        }
        session.state = VerificationState::Watching;
        Ok(())
    }

    /// `cancel(id)`.
    pub fn cancel(&self, id: &str) -> Result<(), GasolineError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| GasolineError::SessionNotFound { id: id.to_string() })?;
        if !session.state.can_cancel() {
            return Err(GasolineError::InvalidParameterValue {
                name: "session_id".into(),
                reason: "session already cancelled".into(),
            });
        }
        session.state = VerificationState::Cancelled;
        Ok(())
    }

    /// Access a session's baseline + url filter for compare; caller
    /// is responsible for validating state transitions via `mark_compared`.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&VerificationSession) -> R) -> Result<R, GasolineError> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(id)
            .ok_or_else(|| GasolineError::SessionNotFound { id: id.to_string() })?;
        if !session.state.can_compare() {
            return Err(GasolineError::InvalidParameterValue {
                name: "session_id".into(),
                reason: format!("session is {:?}, must be watching before compare", session.state),
            });
        }
        Ok(f(session))
    }

    pub fn mark_compared(&self, id: &str) -> Result<(), GasolineError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| GasolineError::SessionNotFound { id: id.to_string() })?;
        session.state = VerificationState::Compared;
        Ok(())
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoline_capture::CaptureConfig;

    #[test]
    fn at_most_three_concurrent_sessions() {
        let mgr = VerificationManager::new(DEFAULT_TTL_SECS);
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        for _ in 0..MAX_CONCURRENT_SESSIONS {
            mgr.start(&pipeline, None, None).unwrap();
        }
        let err = mgr.start(&pipeline, None, None).unwrap_err();
        assert_eq!(err.code(), "capacity_exceeded");
    }

    #[test]
    fn compare_rejects_session_not_watching() {
        let mgr = VerificationManager::new(DEFAULT_TTL_SECS);
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        let id = mgr.start(&pipeline, None, None).unwrap();
        let err = mgr.with_session(&id, |_| ()).unwrap_err();
        assert!(matches!(err, GasolineError::InvalidParameterValue { .. }));
        mgr.watch(&id).unwrap();
        assert!(mgr.with_session(&id, |_| ()).is_ok());
    }

    #[test]
    fn watch_is_idempotent() {
        let mgr = VerificationManager::new(DEFAULT_TTL_SECS);
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        let id = mgr.start(&pipeline, None, None).unwrap();
        mgr.watch(&id).unwrap();
        mgr.watch(&id).unwrap();
    }
}
