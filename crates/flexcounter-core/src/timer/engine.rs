//! Timer engine implementation.
//!
//! The timer engine is a countdown state machine driven by two inputs:
//! a 1 Hz `tick()` from the host's run loop, and lifecycle calls
//! (`suspend()` / `reconcile()`) when the host loses or regains the
//! foreground. It does not use internal threads and never ticks while
//! suspended; time that passed in the background is charged retroactively
//! from the persisted snapshot.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^        |          |
//!   +--------+----------+   reset()
//! ```
//!
//! Running continues below zero (overtime) until paused, reset or saved.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(store, SystemClock);
//! engine.reconcile()?;          // on load
//! let handle = engine.start(600)?;
//! // once per second:
//! engine.tick();                // Some(TimerExpired) on the 1 -> 0 edge
//! engine.suspend()?;            // before the host goes away
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::format::format_clock;
use super::schedule::{TickHandle, TickSchedule};
use super::snapshot::SuspendRecord;
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result};
use crate::events::TimerEvent;
use crate::lifecycle::Lifecycle;
use crate::storage::KvStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "idle" => Ok(TimerStatus::Idle),
            "running" => Ok(TimerStatus::Running),
            "paused" => Ok(TimerStatus::Paused),
            other => Err(format!("unknown timer status: {other}")),
        }
    }
}

/// The countdown reading owned by one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    /// Goes negative in overtime.
    pub remaining_secs: i64,
    pub status: TimerStatus,
    /// The originally chosen duration.
    pub target_secs: u64,
}

/// Core timer engine.
///
/// Owns its state exclusively; persistence goes through `S`, time through `C`.
pub struct TimerEngine<S: KvStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    state: TimerState,
    schedule: TickSchedule,
    /// Set once the current countdown has reported expiry.
    expiry_reported: bool,
}

impl<S: KvStore, C: Clock> TimerEngine<S, C> {
    /// Create an idle engine. Nothing is read from the store until
    /// [`reconcile`](Self::reconcile) is called.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            state: TimerState::default(),
            schedule: TickSchedule::new(),
            expiry_reported: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn remaining_secs(&self) -> i64 {
        self.state.remaining_secs
    }

    pub fn target_secs(&self) -> u64 {
        self.state.target_secs
    }

    /// Running with the countdown at or below zero.
    pub fn is_expired(&self) -> bool {
        self.state.status == TimerStatus::Running && self.state.remaining_secs <= 0
    }

    /// The currently armed tick schedule, if the engine is running.
    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.schedule.active()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> TimerEvent {
        TimerEvent::StateSnapshot {
            status: self.state.status,
            remaining_secs: self.state.remaining_secs,
            target_secs: self.state.target_secs,
            display: format_clock(self.state.remaining_secs),
            expired: self.is_expired(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown of `target_secs` from Idle, or continue a paused
    /// one (the target is then ignored). No-op while running.
    pub fn start(&mut self, target_secs: u64) -> Result<Option<TimerEvent>> {
        match self.state.status {
            TimerStatus::Idle => {
                let remaining_secs = i64::try_from(target_secs).map_err(|_| {
                    CoreError::invalid_duration(&target_secs.to_string(), "duration is too large")
                })?;
                let next = TimerState {
                    remaining_secs,
                    status: TimerStatus::Running,
                    target_secs,
                };
                self.persist(next)?;
                self.state = next;
                self.expiry_reported = remaining_secs <= 0;
                let handle = self.schedule.arm();
                tracing::debug!(target_secs, handle = handle.id(), "timer started");
                Ok(Some(TimerEvent::TimerStarted {
                    target_secs,
                    remaining_secs,
                    at: self.clock.now(),
                }))
            }
            TimerStatus::Paused => self.resume(),
            TimerStatus::Running => Ok(None),
        }
    }

    /// Continue a paused countdown from where it stopped.
    pub fn resume(&mut self) -> Result<Option<TimerEvent>> {
        if self.state.status != TimerStatus::Paused {
            return Ok(None);
        }
        let next = TimerState {
            status: TimerStatus::Running,
            ..self.state
        };
        self.persist(next)?;
        self.state = next;
        let handle = self.schedule.arm();
        tracing::debug!(
            remaining_secs = next.remaining_secs,
            handle = handle.id(),
            "timer resumed"
        );
        Ok(Some(TimerEvent::TimerResumed {
            remaining_secs: next.remaining_secs,
            at: self.clock.now(),
        }))
    }

    pub fn pause(&mut self) -> Result<Option<TimerEvent>> {
        if self.state.status != TimerStatus::Running {
            return Ok(None);
        }
        let next = TimerState {
            status: TimerStatus::Paused,
            ..self.state
        };
        self.persist(next)?;
        self.state = next;
        self.schedule.cancel();
        tracing::debug!(remaining_secs = next.remaining_secs, "timer paused");
        Ok(Some(TimerEvent::TimerPaused {
            remaining_secs: next.remaining_secs,
            at: self.clock.now(),
        }))
    }

    /// Back to Idle at zero and forget the persisted snapshot.
    /// The session ledger is not touched.
    pub fn reset(&mut self) -> Result<Option<TimerEvent>> {
        SuspendRecord::clear(&self.store)?;
        self.state = TimerState::default();
        self.schedule.cancel();
        self.expiry_reported = false;
        tracing::debug!("timer reset");
        Ok(Some(TimerEvent::TimerReset {
            at: self.clock.now(),
        }))
    }

    /// Count down one second. Call once per period while running.
    ///
    /// Returns `Some(TimerExpired)` on the tick that reaches zero and never
    /// again for the same countdown.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.state.status != TimerStatus::Running || !self.schedule.is_armed() {
            return None;
        }
        let before = self.state.remaining_secs;
        self.state.remaining_secs = before.saturating_sub(1);

        if before > 0 && self.state.remaining_secs <= 0 && !self.expiry_reported {
            self.expiry_reported = true;
            tracing::debug!("time's up");
            return Some(TimerEvent::TimerExpired {
                at: self.clock.now(),
            });
        }
        None
    }

    /// Tick on behalf of the schedule identified by `handle`. Callbacks from
    /// a schedule that has since been cancelled or replaced are ignored.
    pub fn fire(&mut self, handle: TickHandle) -> Option<TimerEvent> {
        if !self.schedule.is_current(handle) {
            tracing::trace!(handle = handle.id(), "ignoring stale tick");
            return None;
        }
        self.tick()
    }

    /// Persist the current reading before the host loses the foreground.
    ///
    /// Runs synchronously to completion. Repeating it without a state change
    /// in between writes the same record.
    pub fn suspend(&mut self) -> Result<Option<TimerEvent>> {
        self.persist(self.state)?;
        tracing::debug!(
            remaining_secs = self.state.remaining_secs,
            status = %self.state.status,
            "timer suspended"
        );
        Ok(Some(TimerEvent::TimerSuspended {
            remaining_secs: self.state.remaining_secs,
            at: self.clock.now(),
        }))
    }

    /// Catch up after the host regains the foreground.
    ///
    /// The persisted record wins over in-memory state. A running countdown is
    /// charged the whole seconds elapsed since the record was written; a
    /// paused or idle one is restored as it was. The record is then
    /// re-anchored at "now" so later reconciles charge only new time.
    /// Returns `None` when there is no record.
    pub fn reconcile(&mut self) -> Result<Option<TimerEvent>> {
        let Some(record) = SuspendRecord::load(&self.store)? else {
            tracing::debug!("no timer snapshot to reconcile");
            return Ok(None);
        };

        let now = self.clock.epoch_secs();
        let status = record.status.unwrap_or(TimerStatus::Running);
        let elapsed_secs = match status {
            TimerStatus::Running => now.saturating_sub(record.suspended_at).max(0),
            TimerStatus::Paused | TimerStatus::Idle => 0,
        };
        let next = TimerState {
            remaining_secs: record.remaining_secs.saturating_sub(elapsed_secs),
            status,
            target_secs: record.target_secs.unwrap_or(self.state.target_secs),
        };

        self.persist(next)?;
        self.state = next;

        let crossed_zero = !self.expiry_reported
            && status == TimerStatus::Running
            && record.remaining_secs > 0
            && next.remaining_secs <= 0;
        self.expiry_reported = status != TimerStatus::Idle && next.remaining_secs <= 0;

        match status {
            TimerStatus::Running => {
                if !self.schedule.is_armed() {
                    self.schedule.arm();
                }
            }
            TimerStatus::Paused | TimerStatus::Idle => {
                self.schedule.cancel();
            }
        }

        tracing::debug!(
            remaining_secs = next.remaining_secs,
            elapsed_secs,
            %status,
            "timer reconciled"
        );
        Ok(Some(TimerEvent::TimerReconciled {
            status,
            remaining_secs: next.remaining_secs,
            elapsed_secs,
            expired: crossed_zero,
            at: self.clock.now(),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&self, state: TimerState) -> Result<()> {
        SuspendRecord {
            remaining_secs: state.remaining_secs,
            suspended_at: self.clock.epoch_secs(),
            status: Some(state.status),
            target_secs: Some(state.target_secs),
        }
        .write(&self.store)?;
        Ok(())
    }
}

impl<S: KvStore, C: Clock> Lifecycle for TimerEngine<S, C> {
    fn suspend(&mut self) -> Result<Option<TimerEvent>> {
        TimerEngine::suspend(self)
    }

    fn reconcile(&mut self) -> Result<Option<TimerEvent>> {
        TimerEngine::reconcile(self)
    }
}
