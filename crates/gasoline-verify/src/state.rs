//! Verification session state machine (spec §4.5): a closed enum,
//! transitions as the only way to mutate state -- "state machines
//! over ad-hoc booleans" (spec §9).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    BaselineCaptured,
    Watching,
    Compared,
    Cancelled,
}

impl VerificationState {
    /// `watch(id)` is idempotent: calling it again while already
    /// `Watching` is allowed, it's only `Compared`/`Cancelled` that
    /// reject the transition.
    #[must_use]
    pub fn can_watch(self) -> bool {
        matches!(self, Self::BaselineCaptured | Self::Watching)
    }

    /// `compare(id)` requires the session to be in `Watching` (spec
    /// testable property 8: "compare rejects a session not in the
    /// `watching` state").
    #[must_use]
    pub fn can_compare(self) -> bool {
        matches!(self, Self::Watching)
    }

    #[must_use]
    pub fn can_cancel(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_only_allowed_from_watching() {
        assert!(!VerificationState::BaselineCaptured.can_compare());
        assert!(VerificationState::Watching.can_compare());
        assert!(!VerificationState::Compared.can_compare());
        assert!(!VerificationState::Cancelled.can_compare());
    }

    #[test]
    fn watch_is_idempotent_from_baseline_or_watching() {
        assert!(VerificationState::BaselineCaptured.can_watch());
        assert!(VerificationState::Watching.can_watch());
        assert!(!VerificationState::Compared.can_watch());
    }
}
