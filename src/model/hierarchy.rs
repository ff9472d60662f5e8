use std::collections::HashSet;

use super::milestone::Milestone;
use super::task::Task;

/// Synthetic group key for tasks without a resolvable milestone.
pub const UNASSIGNED_ID: &str = "unassigned";

/// What a hierarchy entry groups under: a real milestone, or the synthetic
/// Unassigned bucket.
#[derive(Debug, Clone)]
pub enum HierarchyGroup {
    Milestone(Milestone),
    Unassigned,
}

/// One row group of the timeline: a milestone (or Unassigned) plus the tasks
/// that belong to it. Rebuilt from scratch on every data change; never stored.
#[derive(Debug, Clone)]
pub struct HierarchyEntry {
    pub group: HierarchyGroup,
    pub tasks: Vec<Task>,
}

impl HierarchyEntry {
    /// Stable key for collapse state and row identity.
    pub fn key(&self) -> &str {
        match &self.group {
            HierarchyGroup::Milestone(m) => &m.id,
            HierarchyGroup::Unassigned => UNASSIGNED_ID,
        }
    }

    pub fn label(&self) -> &str {
        match &self.group {
            HierarchyGroup::Milestone(m) => &m.name,
            HierarchyGroup::Unassigned => "Unassigned",
        }
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self.group, HierarchyGroup::Milestone(_))
    }
}

/// Group flat task and milestone collections into ordered hierarchy entries:
/// one entry per milestone in input order, then a single Unassigned entry iff
/// any task has no resolvable `milestone_id`.
///
/// A task referencing a milestone that is not in `milestones` is treated the
/// same as a task with no milestone at all. Pure function; both empty inputs
/// produce an empty sequence and the caller renders the empty state.
pub fn build_hierarchy(tasks: &[Task], milestones: &[Milestone]) -> Vec<HierarchyEntry> {
    let known: HashSet<&str> = milestones.iter().map(|m| m.id.as_str()).collect();

    let mut entries: Vec<HierarchyEntry> = milestones
        .iter()
        .map(|milestone| HierarchyEntry {
            group: HierarchyGroup::Milestone(milestone.clone()),
            tasks: tasks
                .iter()
                .filter(|t| t.milestone_id.as_deref() == Some(milestone.id.as_str()))
                .cloned()
                .collect(),
        })
        .collect();

    let unassigned: Vec<Task> = tasks
        .iter()
        .filter(|t| match t.milestone_id.as_deref() {
            Some(id) => !known.contains(id),
            None => true,
        })
        .cloned()
        .collect();

    if !unassigned.is_empty() {
        entries.push(HierarchyEntry {
            group: HierarchyGroup::Unassigned,
            tasks: unassigned,
        });
    }

    entries
}

/// Filter tasks to the active category; `None` passes everything through.
pub fn tasks_in_category<'a>(tasks: &'a [Task], category: Option<&str>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| match category {
            Some(c) => t.category.as_deref() == Some(c),
            None => true,
        })
        .collect()
}

/// Filter milestones to the active category; `None` passes everything through.
pub fn milestones_in_category<'a>(
    milestones: &'a [Milestone],
    category: Option<&str>,
) -> Vec<&'a Milestone> {
    milestones
        .iter()
        .filter(|m| match category {
            Some(c) => m.category.as_deref() == Some(c),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn task(id: &str, milestone_id: Option<&str>) -> Task {
        let mut t = Task::new(format!("task {id}"));
        t.id = id.to_string();
        t.milestone_id = milestone_id.map(str::to_string);
        t
    }

    fn milestone(id: &str) -> Milestone {
        let mut m = Milestone::new(format!("milestone {id}"));
        m.id = id.to_string();
        m
    }

    #[test]
    fn groups_tasks_under_their_milestones_in_input_order() {
        let milestones = vec![milestone("m1"), milestone("m2")];
        let tasks = vec![
            task("t1", Some("m2")),
            task("t2", Some("m1")),
            task("t3", Some("m1")),
        ];

        let entries = build_hierarchy(&tasks, &milestones);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key(), "m1");
        assert_eq!(
            entries[0].tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            ["t2", "t3"]
        );
        assert_eq!(entries[1].key(), "m2");
        assert_eq!(entries[1].tasks[0].id, "t1");
    }

    #[test]
    fn no_unassigned_entry_when_every_task_resolves() {
        let milestones = vec![milestone("m1")];
        let tasks = vec![task("t1", Some("m1"))];

        let entries = build_hierarchy(&tasks, &milestones);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_milestone());
    }

    #[test]
    fn dangling_milestone_reference_falls_back_to_unassigned() {
        let tasks = vec![task("t2", Some("nonexistent"))];

        let entries = build_hierarchy(&tasks, &[]);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_milestone());
        assert_eq!(entries[0].key(), UNASSIGNED_ID);
        assert_eq!(entries[0].tasks[0].id, "t2");
    }

    #[test]
    fn milestones_without_tasks_still_appear() {
        let milestones = vec![milestone("m1")];
        let entries = build_hierarchy(&[], &milestones);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].tasks.is_empty());
    }

    #[test]
    fn empty_inputs_produce_empty_sequence() {
        assert!(build_hierarchy(&[], &[]).is_empty());
    }

    #[test]
    fn category_filters_pass_everything_when_unset() {
        let tasks = vec![task("t1", None)];
        let milestones = vec![milestone("m1")];
        assert_eq!(tasks_in_category(&tasks, None).len(), 1);
        assert_eq!(milestones_in_category(&milestones, None).len(), 1);
    }

    #[test]
    fn category_filters_match_exactly() {
        let mut a = task("t1", None);
        a.category = Some("FRC".into());
        let mut b = task("t2", None);
        b.category = Some("FTC".into());
        let c = task("t3", None);

        let all = [a, b, c];
        let filtered = tasks_in_category(&all, Some("FRC"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "t1");
    }

    proptest! {
        /// Every task appears in exactly one entry, resolvable references
        /// under their milestone and everything else under Unassigned.
        #[test]
        fn every_task_appears_exactly_once(
            refs in proptest::collection::vec(proptest::option::of(0usize..6), 0..30),
            milestone_count in 0usize..4,
        ) {
            let milestones: Vec<Milestone> =
                (0..milestone_count).map(|i| milestone(&format!("m{i}"))).collect();
            let tasks: Vec<Task> = refs
                .iter()
                .enumerate()
                .map(|(i, r)| task(&format!("t{i}"), r.map(|n| format!("m{n}")).as_deref()))
                .collect();

            let entries = build_hierarchy(&tasks, &milestones);

            let mut seen: Vec<&str> = Vec::new();
            for entry in &entries {
                for t in &entry.tasks {
                    seen.push(&t.id);
                    match (&entry.group, t.milestone_id.as_deref()) {
                        (HierarchyGroup::Milestone(m), Some(id)) => prop_assert_eq!(&m.id, id),
                        (HierarchyGroup::Milestone(_), None) => prop_assert!(false),
                        (HierarchyGroup::Unassigned, Some(id)) => {
                            prop_assert!(!milestones.iter().any(|m| m.id == id));
                        }
                        (HierarchyGroup::Unassigned, None) => {}
                    }
                }
            }
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), tasks.len());
        }
    }
}
