//! The engine's periodic tick schedule.
//!
//! The engine never spawns anything. Arming hands out a [`TickHandle`]; the
//! host calls back with that handle once per period. Every re-arm or cancel
//! retires the previous handle, so callbacks still in flight from an old
//! schedule are recognised as stale and ignored.

use serde::{Deserialize, Serialize};

/// Identifies one armed schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct TickSchedule {
    next_id: u64,
    active: Option<TickHandle>,
}

impl TickSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any armed schedule and arm a fresh one.
    pub fn arm(&mut self) -> TickHandle {
        if let Some(previous) = self.cancel() {
            tracing::trace!(handle = previous.id(), "re-arming tick schedule");
        }
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.active = Some(handle);
        handle
    }

    /// Retire the armed schedule, if any.
    pub fn cancel(&mut self) -> Option<TickHandle> {
        self.active.take()
    }

    pub fn active(&self) -> Option<TickHandle> {
        self.active
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_current(&self, handle: TickHandle) -> bool {
        self.active == Some(handle)
    }
}
