//! Reminder planning: local notifications ahead of document deadlines,
//! reminder grouping, the upcoming digest, and snooze.

pub mod planner;
pub mod scheduler;
pub mod sink;
pub mod types;

pub use planner::ReminderPlanner;
pub use scheduler::ReminderScheduler;
pub use sink::{MemorySink, NotificationSink};
pub use types::*;
