use std::path::Path;

use crate::gantt::layout::{BarDescriptor, BarSource};

/// Export the laid-out schedule to a semicolon-delimited CSV file.
///
/// Columns: Kind ; Name ; Start ; End ; Status ; Priority
/// Dates are the resolved display windows, formatted YYYY-MM-DD.
/// Returns the number of rows written.
pub fn export_schedule(bars: &[BarDescriptor], path: &Path) -> Result<usize, String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)
        .map_err(|e| format!("Failed to create CSV file: {}", e))?;

    wtr.write_record(["Kind", "Name", "Start", "End", "Status", "Priority"])
        .map_err(|e| format!("Failed to write header: {}", e))?;

    for bar in bars {
        let (kind, status, priority) = match &bar.source {
            BarSource::Milestone(m) => ("Milestone", m.status.label(), ""),
            BarSource::Task(t) => ("Task", t.status.label(), t.priority.label()),
        };
        wtr.write_record([
            kind,
            &bar.label,
            &bar.start.format("%Y-%m-%d").to_string(),
            &bar.end.format("%Y-%m-%d").to_string(),
            status,
            priority,
        ])
        .map_err(|e| format!("Failed to write row '{}': {}", bar.label, e))?;
    }

    wtr.flush().map_err(|e| format!("Failed to flush CSV: {}", e))?;
    Ok(bars.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gantt::layout::layout_bars;
    use crate::model::{build_hierarchy, Milestone, Task};
    use chrono::NaiveDate;

    #[test]
    fn writes_one_row_per_bar_plus_header() {
        let mut milestone = Milestone::new("Kickoff");
        milestone.id = "m1".into();
        let mut task = Task::new("Pack the trailer");
        task.milestone_id = Some("m1".into());

        let entries = build_hierarchy(&[task], &[milestone]);
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let bars = layout_bars(&entries, today);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.csv");
        let written = export_schedule(&bars, &path).unwrap();
        assert_eq!(written, 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Milestone;Kickoff;"));
        assert!(lines[2].starts_with("Task;Pack the trailer;2024-03-15;2024-03-15;"));
    }
}
