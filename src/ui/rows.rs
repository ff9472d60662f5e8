use std::collections::HashSet;

use crate::gantt::layout::{milestone_bar_id, task_bar_id};
use crate::model::{HierarchyEntry, HierarchyGroup, Milestone, Task};

/// One vertical row of the timeline view. The sidebar and the chart iterate
/// the same row list so their rows stay pixel-aligned.
#[derive(Debug, Clone)]
pub enum TimelineRow {
    /// Group header: a milestone (with its own bar) or the Unassigned bucket
    /// (no bar, not collapsible).
    Group {
        key: String,
        label: String,
        milestone: Option<Milestone>,
        expanded: bool,
        bar_id: Option<String>,
    },
    Task {
        bar_id: String,
        task: Task,
    },
    /// The sidebar's "add task" affordance under an expanded milestone;
    /// renders as empty space in the chart.
    AddTask {
        milestone: Milestone,
    },
}

impl TimelineRow {
    pub fn bar_id(&self) -> Option<&str> {
        match self {
            TimelineRow::Group { bar_id, .. } => bar_id.as_deref(),
            TimelineRow::Task { bar_id, .. } => Some(bar_id),
            TimelineRow::AddTask { .. } => None,
        }
    }
}

/// Flatten hierarchy entries into display rows, honoring collapsed groups.
/// Collapsed milestones keep their own bar row but hide children and the
/// add-task row; the Unassigned bucket is always expanded.
pub fn build_rows(entries: &[HierarchyEntry], collapsed: &HashSet<String>) -> Vec<TimelineRow> {
    let mut rows = Vec::new();
    for entry in entries {
        match &entry.group {
            HierarchyGroup::Milestone(milestone) => {
                let expanded = !collapsed.contains(&milestone.id);
                rows.push(TimelineRow::Group {
                    key: milestone.id.clone(),
                    label: milestone.name.clone(),
                    milestone: Some(milestone.clone()),
                    expanded,
                    bar_id: Some(milestone_bar_id(&milestone.id)),
                });
                if expanded {
                    for task in &entry.tasks {
                        rows.push(TimelineRow::Task {
                            bar_id: task_bar_id(&task.id),
                            task: task.clone(),
                        });
                    }
                    rows.push(TimelineRow::AddTask {
                        milestone: milestone.clone(),
                    });
                }
            }
            HierarchyGroup::Unassigned => {
                rows.push(TimelineRow::Group {
                    key: entry.key().to_string(),
                    label: entry.label().to_string(),
                    milestone: None,
                    expanded: true,
                    bar_id: None,
                });
                for task in &entry.tasks {
                    rows.push(TimelineRow::Task {
                        bar_id: task_bar_id(&task.id),
                        task: task.clone(),
                    });
                }
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_hierarchy;

    fn fixtures() -> (Vec<Task>, Vec<Milestone>) {
        let mut m = Milestone::new("Build");
        m.id = "m1".into();
        let mut t1 = Task::new("frame");
        t1.id = "t1".into();
        t1.milestone_id = Some("m1".into());
        let mut t2 = Task::new("loose end");
        t2.id = "t2".into();
        (vec![t1, t2], vec![m])
    }

    #[test]
    fn expanded_milestone_lists_children_and_add_row() {
        let (tasks, milestones) = fixtures();
        let entries = build_hierarchy(&tasks, &milestones);
        let rows = build_rows(&entries, &HashSet::new());

        // milestone, its task, add-task, unassigned header, unassigned task
        assert_eq!(rows.len(), 5);
        assert!(matches!(&rows[0], TimelineRow::Group { bar_id: Some(id), .. } if id == "milestone-m1"));
        assert!(matches!(&rows[1], TimelineRow::Task { bar_id, .. } if bar_id == "task-t1"));
        assert!(matches!(&rows[2], TimelineRow::AddTask { milestone } if milestone.id == "m1"));
        assert!(matches!(&rows[3], TimelineRow::Group { bar_id: None, .. }));
        assert!(matches!(&rows[4], TimelineRow::Task { bar_id, .. } if bar_id == "task-t2"));
    }

    #[test]
    fn collapsed_milestone_keeps_its_bar_but_hides_children() {
        let (tasks, milestones) = fixtures();
        let entries = build_hierarchy(&tasks, &milestones);
        let collapsed: HashSet<String> = ["m1".to_string()].into();
        let rows = build_rows(&entries, &collapsed);

        assert_eq!(rows.len(), 3);
        assert!(matches!(&rows[0], TimelineRow::Group { expanded: false, bar_id: Some(_), .. }));
        assert!(matches!(&rows[1], TimelineRow::Group { bar_id: None, .. }));
    }
}
