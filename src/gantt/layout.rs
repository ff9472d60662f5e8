use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::model::{HierarchyEntry, HierarchyGroup, Milestone, MilestoneStatus, Task, TaskStatus};

/// Synthetic window length for a task missing its due date.
const DEFAULT_TASK_SPAN_DAYS: i64 = 3;
/// Synthetic window length for a milestone missing its end date.
const DEFAULT_MILESTONE_SPAN_DAYS: i64 = 7;

/// Discriminates the two record kinds behind a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Milestone,
    Task,
}

/// The record a bar was derived from.
#[derive(Debug, Clone)]
pub enum BarSource {
    Milestone(Milestone),
    Task(Task),
}

/// Style bucket for a bar; first matching rule wins (Completed > Blocked >
/// Critical > High > default), milestones always get their own class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualClass {
    Completed,
    Blocked,
    Critical,
    High,
    Task,
    Milestone,
}

/// A renderable bar: concrete day-granular window, derived progress, style
/// class, and the originating record. Rebuilt every layout pass.
#[derive(Debug, Clone)]
pub struct BarDescriptor {
    /// Kind-prefixed id ("milestone-…" / "task-…") keeping the two record id
    /// spaces disjoint; also the suppression-map key.
    pub id: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// 0–100.
    pub progress: u8,
    pub class: VisualClass,
    pub kind: BarKind,
    pub source: BarSource,
}

impl BarDescriptor {
    /// The raw record id without the kind prefix.
    pub fn record_id(&self) -> &str {
        match &self.source {
            BarSource::Milestone(m) => &m.id,
            BarSource::Task(t) => &t.id,
        }
    }
}

pub fn milestone_bar_id(id: &str) -> String {
    format!("milestone-{id}")
}

pub fn task_bar_id(id: &str) -> String {
    format!("task-{id}")
}

/// Resolve an optional timestamp pair into a concrete day-granular window.
///
/// Present timestamps are truncated to their UTC date. Missing endpoints get
/// display-only defaults relative to `today`: a missing start is `today`, a
/// missing end is `start + span` when the start was stored and `today` when
/// both were absent. The result always satisfies `start <= end`.
fn resolve_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    span_days: i64,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let (start, end) = match (start.map(|s| s.date_naive()), end.map(|e| e.date_naive())) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, s + Duration::days(span_days)),
        (None, Some(e)) => (today, e),
        (None, None) => (today, today),
    };
    (start, end.max(start))
}

/// Progress derived from task status. Presentational only; status stays the
/// source of truth. Blocked fills like InProgress but keeps its own class.
pub fn task_progress(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::NotStarted => 0,
        TaskStatus::InProgress | TaskStatus::Blocked => 50,
        TaskStatus::Completed => 100,
    }
}

/// Progress derived from milestone status.
pub fn milestone_progress(status: MilestoneStatus) -> u8 {
    match status {
        MilestoneStatus::NotStarted => 0,
        MilestoneStatus::InProgress => 50,
        MilestoneStatus::Completed => 100,
    }
}

fn task_class(task: &Task) -> VisualClass {
    use crate::model::TaskPriority;
    if task.status == TaskStatus::Completed {
        VisualClass::Completed
    } else if task.status == TaskStatus::Blocked {
        VisualClass::Blocked
    } else if task.priority == TaskPriority::Critical {
        VisualClass::Critical
    } else if task.priority == TaskPriority::High {
        VisualClass::High
    } else {
        VisualClass::Task
    }
}

fn milestone_bar(milestone: &Milestone, today: NaiveDate) -> BarDescriptor {
    let (start, end) = resolve_window(
        milestone.start_date,
        milestone.end_date,
        DEFAULT_MILESTONE_SPAN_DAYS,
        today,
    );
    BarDescriptor {
        id: milestone_bar_id(&milestone.id),
        label: milestone.name.clone(),
        start,
        end,
        progress: milestone_progress(milestone.status),
        class: VisualClass::Milestone,
        kind: BarKind::Milestone,
        source: BarSource::Milestone(milestone.clone()),
    }
}

fn task_bar(task: &Task, today: NaiveDate) -> BarDescriptor {
    let (start, end) = resolve_window(
        task.start_date,
        task.due_date,
        DEFAULT_TASK_SPAN_DAYS,
        today,
    );
    BarDescriptor {
        id: task_bar_id(&task.id),
        label: task.title.clone(),
        start,
        end,
        progress: task_progress(task.status),
        class: task_class(task),
        kind: BarKind::Task,
        source: BarSource::Task(task.clone()),
    }
}

/// Flatten hierarchy entries into bar descriptors: per entry, its milestone
/// bar (if any) immediately followed by its child task bars. Pure function of
/// its inputs; `today` is the injected clock date for synthetic defaults.
pub fn layout_bars(entries: &[HierarchyEntry], today: NaiveDate) -> Vec<BarDescriptor> {
    let mut bars = Vec::new();
    for entry in entries {
        if let HierarchyGroup::Milestone(milestone) = &entry.group {
            bars.push(milestone_bar(milestone, today));
        }
        for task in &entry.tasks {
            bars.push(task_bar(task, today));
        }
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build_hierarchy, TaskPriority};
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 14, 30, 0).unwrap()
    }

    fn fixed_today() -> NaiveDate {
        day(2024, 3, 15)
    }

    #[test]
    fn missing_both_dates_defaults_to_today_today() {
        let task = Task::new("undated");
        let bar = task_bar(&task, fixed_today());
        assert_eq!(bar.start, fixed_today());
        assert_eq!(bar.end, fixed_today());
    }

    #[test]
    fn missing_end_extends_from_start_by_kind_span() {
        let mut task = Task::new("open ended");
        task.start_date = Some(at(2024, 3, 1));
        let bar = task_bar(&task, fixed_today());
        assert_eq!(bar.start, day(2024, 3, 1));
        assert_eq!(bar.end, day(2024, 3, 4));

        let mut milestone = Milestone::new("open ended");
        milestone.start_date = Some(at(2024, 3, 1));
        let bar = milestone_bar(&milestone, fixed_today());
        assert_eq!(bar.end, day(2024, 3, 8));
    }

    #[test]
    fn timestamps_truncate_to_day_granularity() {
        let mut task = Task::new("timed");
        task.start_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap());
        task.due_date = Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 1).unwrap());
        let bar = task_bar(&task, fixed_today());
        assert_eq!(bar.start, day(2024, 3, 1));
        assert_eq!(bar.end, day(2024, 3, 5));
    }

    #[test]
    fn out_of_order_dates_clamp_end_to_start() {
        let mut task = Task::new("backwards");
        task.start_date = Some(at(2024, 3, 10));
        task.due_date = Some(at(2024, 3, 2));
        let bar = task_bar(&task, fixed_today());
        assert_eq!(bar.start, day(2024, 3, 10));
        assert_eq!(bar.end, day(2024, 3, 10));
    }

    #[test]
    fn progress_is_total_over_all_statuses() {
        assert_eq!(task_progress(TaskStatus::NotStarted), 0);
        assert_eq!(task_progress(TaskStatus::InProgress), 50);
        assert_eq!(task_progress(TaskStatus::Blocked), 50);
        assert_eq!(task_progress(TaskStatus::Completed), 100);
    }

    #[test]
    fn class_precedence_completed_blocked_critical_high_default() {
        let mut task = Task::new("t");
        task.priority = TaskPriority::Critical;
        task.status = TaskStatus::Completed;
        assert_eq!(task_class(&task), VisualClass::Completed);

        task.status = TaskStatus::Blocked;
        assert_eq!(task_class(&task), VisualClass::Blocked);

        task.status = TaskStatus::InProgress;
        assert_eq!(task_class(&task), VisualClass::Critical);

        task.priority = TaskPriority::High;
        assert_eq!(task_class(&task), VisualClass::High);

        task.priority = TaskPriority::Medium;
        assert_eq!(task_class(&task), VisualClass::Task);
    }

    #[test]
    fn milestone_bar_precedes_its_children() {
        let mut milestone = Milestone::new("Build");
        milestone.id = "m1".into();
        milestone.status = MilestoneStatus::Completed;
        let mut task = Task::new("t1");
        task.id = "t1".into();
        task.milestone_id = Some("m1".into());
        task.status = TaskStatus::Completed;

        let entries = build_hierarchy(&[task], &[milestone]);
        let bars = layout_bars(&entries, fixed_today());

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].id, "milestone-m1");
        assert_eq!(bars[0].kind, BarKind::Milestone);
        assert_eq!(bars[0].class, VisualClass::Milestone);
        assert_eq!(bars[0].progress, 100);
        assert_eq!(bars[1].id, "task-t1");
        assert_eq!(bars[1].progress, 100);
        assert_eq!(bars[1].class, VisualClass::Completed);
    }

    #[test]
    fn milestone_progress_comes_from_its_own_status_not_children() {
        let mut milestone = Milestone::new("Build");
        milestone.id = "m1".into();
        let mut task = Task::new("t1");
        task.milestone_id = Some("m1".into());
        task.status = TaskStatus::Completed;

        let entries = build_hierarchy(&[task], &[milestone]);
        let bars = layout_bars(&entries, fixed_today());
        assert_eq!(bars[0].progress, 0);
    }

    #[test]
    fn dangling_reference_still_lays_out() {
        let mut task = Task::new("orphan");
        task.id = "t2".into();
        task.milestone_id = Some("nonexistent".into());

        let entries = build_hierarchy(&[task], &[]);
        let bars = layout_bars(&entries, fixed_today());
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].id, "task-t2");
    }

    #[test]
    fn every_bar_satisfies_start_le_end() {
        let mut a = Task::new("a");
        a.due_date = Some(at(2024, 1, 1));
        let b = Task::new("b");
        let entries = build_hierarchy(&[a, b], &[]);
        for bar in layout_bars(&entries, fixed_today()) {
            assert!(bar.start <= bar.end, "{}", bar.id);
        }
    }
}
