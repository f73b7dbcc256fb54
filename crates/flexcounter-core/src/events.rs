use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerStatus;

/// Every state change of the engine produces an Event.
/// The presentation layer renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    TimerStarted {
        target_secs: u64,
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// The countdown crossed zero. Emitted once per countdown.
    TimerExpired {
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    TimerSuspended {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// Remaining time was rebuilt from the persisted snapshot.
    TimerReconciled {
        status: TimerStatus,
        remaining_secs: i64,
        /// Wall-clock seconds charged against the countdown.
        elapsed_secs: i64,
        /// The catch-up carried a running countdown across zero.
        expired: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        remaining_secs: i64,
        target_secs: u64,
        display: String,
        expired: bool,
        at: DateTime<Utc>,
    },
}

impl TimerEvent {
    /// True for the events that should trigger the "time's up" cue.
    pub fn is_expiry(&self) -> bool {
        matches!(
            self,
            TimerEvent::TimerExpired { .. } | TimerEvent::TimerReconciled { expired: true, .. }
        )
    }
}
