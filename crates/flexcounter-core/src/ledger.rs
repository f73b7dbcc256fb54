//! Session ledger and running balance.
//!
//! Saving a session records how far the countdown was from zero at that
//! moment: positive when finished early, negative when it ran into overtime.
//! The balance is the sum of those values and is only ever reset together
//! with the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{CoreError, Result, StorageError};
use crate::storage::KvStore;
use crate::timer::TimerEngine;

pub const ENTRIES_KEY: &str = "ledger.entries";
pub const BALANCE_KEY: &str = "ledger.balance";

/// One saved session. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub label: String,
    pub completed_at: DateTime<Utc>,
    pub seconds_over_under: i64,
}

/// Aggregate view of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub sessions: usize,
    /// Seconds left over across sessions finished early.
    pub total_under_secs: u64,
    /// Seconds of overtime across sessions that ran past zero.
    pub total_over_secs: u64,
    pub balance: i64,
}

pub struct Ledger<S: KvStore> {
    store: S,
    entries: Vec<SessionEntry>,
    balance: i64,
}

impl<S: KvStore> Ledger<S> {
    /// Read the ledger from the store.
    ///
    /// Unreadable entries fall back to an empty ledger; an unreadable or
    /// missing balance is recomputed from the entries.
    pub fn load(store: S) -> Result<Self, StorageError> {
        let entries = match store.get(ENTRIES_KEY)? {
            None => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<SessionEntry>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring corrupt session ledger");
                Vec::new()
            }),
        };

        let recomputed = sum_entries(&entries);
        let balance = match store.get(BALANCE_KEY)? {
            None => recomputed,
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring corrupt ledger balance");
                recomputed
            }),
        };

        Ok(Self {
            store,
            entries,
            balance,
        })
    }

    /// Saved sessions in insertion order.
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            sessions: self.entries.len(),
            balance: self.balance,
            ..LedgerSummary::default()
        };
        for entry in &self.entries {
            let magnitude = entry.seconds_over_under.unsigned_abs();
            if entry.seconds_over_under > 0 {
                summary.total_under_secs = summary.total_under_secs.saturating_add(magnitude);
            } else {
                summary.total_over_secs = summary.total_over_secs.saturating_add(magnitude);
            }
        }
        summary
    }

    /// Record the engine's current reading as a finished session, then reset
    /// the engine.
    ///
    /// # Errors
    /// [`CoreError::InvalidSaveState`] when the engine reads exactly zero;
    /// nothing is recorded in that case.
    pub fn save<ES, C>(&mut self, engine: &mut TimerEngine<ES, C>, label: &str) -> Result<SessionEntry>
    where
        ES: KvStore,
        C: Clock,
    {
        let seconds_over_under = engine.remaining_secs();
        if seconds_over_under == 0 {
            return Err(CoreError::InvalidSaveState);
        }

        let entry = SessionEntry {
            label: label.to_string(),
            completed_at: engine.clock().now(),
            seconds_over_under,
        };

        let mut entries = self.entries.clone();
        entries.push(entry.clone());
        let balance = self.balance.saturating_add(seconds_over_under);
        self.persist(&entries, balance)?;
        self.entries = entries;
        self.balance = balance;

        tracing::info!(
            label = %entry.label,
            seconds_over_under,
            balance,
            "session saved"
        );
        engine.reset()?;
        Ok(entry)
    }

    /// Drop every entry and zero the balance.
    pub fn clear(&mut self) -> Result<()> {
        self.persist(&[], 0)?;
        self.entries.clear();
        self.balance = 0;
        tracing::info!("session ledger cleared");
        Ok(())
    }

    fn persist(&self, entries: &[SessionEntry], balance: i64) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(ENTRIES_KEY, &json)?;
        self.store.set(BALANCE_KEY, &balance.to_string())?;
        Ok(())
    }
}

fn sum_entries(entries: &[SessionEntry]) -> i64 {
    entries
        .iter()
        .fold(0i64, |acc, e| acc.saturating_add(e.seconds_over_under))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use crate::timer::TimerStatus;
    use std::rc::Rc;

    type Shared = Rc<MemoryStore>;

    fn setup() -> (Ledger<Shared>, TimerEngine<Shared, ManualClock>) {
        let store = Rc::new(MemoryStore::new());
        let ledger = Ledger::load(Rc::clone(&store)).unwrap();
        let engine = TimerEngine::new(store, ManualClock::default());
        (ledger, engine)
    }

    #[test]
    fn overtime_session_decreases_balance() {
        let (mut ledger, mut engine) = setup();
        engine.start(10).unwrap();
        for _ in 0..12 {
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), -2);

        let entry = ledger.save(&mut engine, "run1").unwrap();
        assert_eq!(entry.seconds_over_under, -2);
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.balance(), -2);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn early_finish_increases_balance() {
        let (mut ledger, mut engine) = setup();
        engine.start(60).unwrap();
        engine.tick();
        ledger.save(&mut engine, "quick").unwrap();
        assert_eq!(ledger.balance(), 59);
    }

    #[test]
    fn save_at_zero_is_rejected() {
        let (mut ledger, mut engine) = setup();
        engine.start(1).unwrap();
        engine.tick();
        assert!(matches!(
            ledger.save(&mut engine, "zero"),
            Err(CoreError::InvalidSaveState)
        ));
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.balance(), 0);
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn ledger_survives_reload_in_order() {
        let (mut ledger, mut engine) = setup();
        for (label, target) in [("a", 5), ("b", 7)] {
            engine.start(target).unwrap();
            ledger.save(&mut engine, label).unwrap();
        }
        let reloaded = Ledger::load(Rc::clone(engine.store())).unwrap();
        let labels: Vec<_> = reloaded.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
        assert_eq!(reloaded.balance(), 12);
    }

    #[test]
    fn clear_empties_everything() {
        let (mut ledger, mut engine) = setup();
        engine.start(5).unwrap();
        ledger.save(&mut engine, "x").unwrap();
        ledger.clear().unwrap();
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.balance(), 0);

        let reloaded = Ledger::load(Rc::clone(engine.store())).unwrap();
        assert!(reloaded.entries().is_empty());
        assert_eq!(reloaded.balance(), 0);
    }

    #[test]
    fn corrupt_values_fall_back() {
        let store = MemoryStore::new();
        store.set(ENTRIES_KEY, "not json").unwrap();
        store.set(BALANCE_KEY, "12abc").unwrap();
        let ledger = Ledger::load(&store).unwrap();
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn missing_balance_is_recomputed() {
        let store = MemoryStore::new();
        let entries = vec![
            SessionEntry {
                label: "a".into(),
                completed_at: DateTime::<Utc>::UNIX_EPOCH,
                seconds_over_under: 30,
            },
            SessionEntry {
                label: "b".into(),
                completed_at: DateTime::<Utc>::UNIX_EPOCH,
                seconds_over_under: -45,
            },
        ];
        store
            .set(ENTRIES_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();
        let ledger = Ledger::load(&store).unwrap();
        assert_eq!(ledger.balance(), -15);
        assert_eq!(
            ledger.summary(),
            LedgerSummary {
                sessions: 2,
                total_under_secs: 30,
                total_over_secs: 45,
                balance: -15,
            }
        );
    }
}
