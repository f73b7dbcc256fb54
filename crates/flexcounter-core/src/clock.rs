//! Wall-clock source.
//!
//! The engine never reads the system time directly; everything goes through
//! a [`Clock`] so reconciliation can be tested with a clock that only moves
//! when told to.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};

/// A source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Whole seconds since the Unix epoch.
    fn epoch_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_secs: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(epoch_secs: i64) -> Self {
        Self {
            epoch_secs: Rc::new(Cell::new(epoch_secs)),
        }
    }

    /// Move the clock forward (or backward, for negative values).
    pub fn advance(&self, secs: i64) {
        self.epoch_secs.set(self.epoch_secs.get() + secs);
    }

    pub fn set(&self, epoch_secs: i64) {
        self.epoch_secs.set(epoch_secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        // 2024-01-01T00:00:00Z
        Self::new(1_704_067_200)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.epoch_secs.get(), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn epoch_secs(&self) -> i64 {
        self.epoch_secs.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn epoch_secs(&self) -> i64 {
        (**self).epoch_secs()
    }
}
