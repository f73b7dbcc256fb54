//! # FlexCounter Core Library
//!
//! This library provides the core logic for FlexCounter, a countdown timer
//! that keeps an accurate reading across reloads and backgrounding and keeps
//! a running balance of saved sessions. The `flexcounter` CLI is a thin host
//! over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a countdown state machine ticked once per second by
//!   the host; time spent suspended is charged from a persisted snapshot on
//!   `reconcile()`
//! - **Lifecycle**: the two calls (`suspend`, `reconcile`) every host signal
//!   maps onto
//! - **Ledger**: saved sessions and their over/under balance
//! - **Storage**: a client-local key-value store (SQLite or in-memory) and
//!   TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Ledger`]: Session ledger and balance
//! - [`KvStore`]: Persistence contract, implemented by [`Database`]
//! - [`Clock`]: Wall-clock source, replaceable in tests
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::TimerEvent;
pub use ledger::{Ledger, LedgerSummary, SessionEntry};
pub use lifecycle::{dispatch, Lifecycle, LifecycleSignal};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{
    duration_from_parts, format_clock, format_reading, parse_duration, TickHandle, TimerEngine,
    TimerState, TimerStatus,
};
