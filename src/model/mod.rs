pub mod hierarchy;
pub mod milestone;
pub mod task;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub use hierarchy::{build_hierarchy, HierarchyEntry, HierarchyGroup};
pub use milestone::{Milestone, MilestoneStatus};
pub use task::{Task, TaskPriority, TaskStatus};

/// Scheduling works at day granularity; stored timestamps pin to midnight UTC.
pub fn day_start_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
