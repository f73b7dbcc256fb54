mod duration;
mod engine;
mod format;
mod schedule;
pub mod snapshot;

pub use duration::{duration_from_parts, parse_duration};
pub use engine::{TimerEngine, TimerState, TimerStatus};
pub use format::{format_clock, format_reading};
pub use schedule::{TickHandle, TickSchedule};
pub use snapshot::SuspendRecord;
