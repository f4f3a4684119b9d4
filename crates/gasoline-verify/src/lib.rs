//! Verification sessions (baseline/watch/compare state machine) and
//! named session-diff snapshots (spec §4.5).

pub mod compare;
pub mod manager;
pub mod session;
pub mod snapshot;
pub mod state;

pub use compare::{compare as compare_verdict, ChangeKind, CompareResult, Verdict};
pub use manager::{VerificationManager, MAX_CONCURRENT_SESSIONS};
pub use session::{Baseline, VerificationSession};
pub use snapshot::{SessionDiff, SessionDiffVerdict, Snapshot, SnapshotStore, CURRENT};
pub use state::VerificationState;
