//! The persisted suspend snapshot.
//!
//! Four keys, each written as a plain decimal (or lowercase status) string:
//!
//! ```text
//! timer.remainingSeconds  reading at the moment of the write
//! timer.suspendedAt       epoch seconds of the write
//! timer.status            idle | running | paused      (optional)
//! timer.targetSeconds     originally chosen duration   (optional)
//! ```
//!
//! The first two form the record; without both of them there is no record.

use crate::error::{CoreError, StorageError};
use crate::storage::KvStore;

use super::engine::TimerStatus;

pub const REMAINING_KEY: &str = "timer.remainingSeconds";
pub const SUSPENDED_AT_KEY: &str = "timer.suspendedAt";
pub const STATUS_KEY: &str = "timer.status";
pub const TARGET_KEY: &str = "timer.targetSeconds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendRecord {
    pub remaining_secs: i64,
    pub suspended_at: i64,
    pub status: Option<TimerStatus>,
    pub target_secs: Option<u64>,
}

impl SuspendRecord {
    /// Overwrite the persisted record. Last write wins.
    pub fn write<S: KvStore + ?Sized>(&self, store: &S) -> Result<(), StorageError> {
        store.set(REMAINING_KEY, &self.remaining_secs.to_string())?;
        store.set(SUSPENDED_AT_KEY, &self.suspended_at.to_string())?;
        match self.status {
            Some(status) => store.set(STATUS_KEY, status.as_str())?,
            None => store.remove(STATUS_KEY)?,
        }
        match self.target_secs {
            Some(target) => store.set(TARGET_KEY, &target.to_string())?,
            None => store.remove(TARGET_KEY)?,
        }
        Ok(())
    }

    /// Read the persisted record.
    ///
    /// A partial or unparsable record is discarded (and removed from the
    /// store) rather than reported: it means "no prior session".
    pub fn load<S: KvStore + ?Sized>(store: &S) -> Result<Option<Self>, StorageError> {
        let remaining = store.get(REMAINING_KEY)?;
        let suspended_at = store.get(SUSPENDED_AT_KEY)?;

        let (remaining, suspended_at) = match (remaining, suspended_at) {
            (None, None) => return Ok(None),
            (Some(remaining), Some(suspended_at)) => (remaining, suspended_at),
            (remaining, suspended_at) => {
                tracing::warn!(
                    has_remaining = remaining.is_some(),
                    has_suspended_at = suspended_at.is_some(),
                    "discarding incomplete timer snapshot"
                );
                Self::clear(store)?;
                return Ok(None);
            }
        };

        let parsed = parse_field::<i64>(REMAINING_KEY, &remaining)
            .and_then(|r| parse_field::<i64>(SUSPENDED_AT_KEY, &suspended_at).map(|s| (r, s)));
        let (remaining_secs, suspended_at) = match parsed {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(error = %err, "discarding corrupt timer snapshot");
                Self::clear(store)?;
                return Ok(None);
            }
        };

        let status = optional_field(store, STATUS_KEY, |raw| raw.parse::<TimerStatus>().ok())?;
        let target_secs = optional_field(store, TARGET_KEY, |raw| raw.trim().parse::<u64>().ok())?;

        Ok(Some(Self {
            remaining_secs,
            suspended_at,
            status,
            target_secs,
        }))
    }

    /// Remove every snapshot key.
    pub fn clear<S: KvStore + ?Sized>(store: &S) -> Result<(), StorageError> {
        for key in [REMAINING_KEY, SUSPENDED_AT_KEY, STATUS_KEY, TARGET_KEY] {
            store.remove(key)?;
        }
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CoreError::CorruptSnapshot {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

fn optional_field<S, T, F>(store: &S, key: &str, parse: F) -> Result<Option<T>, StorageError>
where
    S: KvStore + ?Sized,
    F: FnOnce(&str) -> Option<T>,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let value = parse(&raw);
    if value.is_none() {
        tracing::warn!(key, value = %raw, "ignoring corrupt snapshot field");
    }
    Ok(value)
}
