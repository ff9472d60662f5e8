use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};
use serde_json::{json, Map, Value};

use crate::model::{
    day_start_utc, Milestone, MilestoneStatus, Task, TaskPriority, TaskStatus,
};
use crate::ui::theme;

/// What a detail dialog asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Keep,
    Save,
    Delete,
    Cancel,
}

// ── Task dialog ──────────────────────────────────────────────────────────────

/// Edit buffer for the task detail / create dialog. Patches are built by
/// diffing against the original so only changed fields travel.
pub struct TaskDialogState {
    pub original: Task,
    pub is_new: bool,
    pub milestone_name: Option<String>,
    title: String,
    description: String,
    assigned_to: String,
    category: String,
    status: TaskStatus,
    priority: TaskPriority,
    has_start: bool,
    start: NaiveDate,
    has_due: bool,
    due: NaiveDate,
}

impl TaskDialogState {
    pub fn edit(task: &Task, today: NaiveDate) -> Self {
        Self {
            is_new: false,
            milestone_name: None,
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to.clone().unwrap_or_default(),
            category: task.category.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            has_start: task.start_date.is_some(),
            start: task.start_date.map(|d| d.date_naive()).unwrap_or(today),
            has_due: task.due_date.is_some(),
            due: task.due_date.map(|d| d.date_naive()).unwrap_or(today),
            original: task.clone(),
        }
    }

    /// Buffer for a task created from the sidebar, pre-assigned to the
    /// milestone it was requested under.
    pub fn create(milestone: Option<&Milestone>, today: NaiveDate) -> Self {
        let mut task = Task::new("");
        task.milestone_id = milestone.map(|m| m.id.clone());
        task.category = milestone.and_then(|m| m.category.clone());
        Self {
            is_new: true,
            milestone_name: milestone.map(|m| m.name.clone()),
            title: String::new(),
            description: String::new(),
            assigned_to: String::new(),
            category: task.category.clone().unwrap_or_default(),
            status: TaskStatus::NotStarted,
            priority: TaskPriority::Medium,
            has_start: true,
            start: today,
            has_due: true,
            due: today + chrono::Duration::days(7),
            original: task,
        }
    }

    fn edited(&self) -> Task {
        let mut task = self.original.clone();
        task.title = if self.title.trim().is_empty() {
            "Untitled task".to_string()
        } else {
            self.title.trim().to_string()
        };
        task.description = self.description.clone();
        task.assigned_to = non_empty(&self.assigned_to);
        task.category = non_empty(&self.category);
        task.status = self.status;
        task.priority = self.priority;
        task.start_date = self.has_start.then(|| day_start_utc(self.start));
        task.due_date = self.has_due.then(|| day_start_utc(self.due));
        task
    }

    /// The task as edited, for optimistic local application.
    pub fn result(&self) -> Task {
        self.edited()
    }

    /// Partial update: only the fields that differ from the original.
    pub fn patch(&self) -> Value {
        let edited = self.edited();
        let mut patch = Map::new();
        if edited.title != self.original.title {
            patch.insert("title".into(), json!(edited.title));
        }
        if edited.description != self.original.description {
            patch.insert("description".into(), json!(edited.description));
        }
        if edited.assigned_to != self.original.assigned_to {
            patch.insert("assigned_to".into(), json!(edited.assigned_to));
        }
        if edited.category != self.original.category {
            patch.insert("category".into(), json!(edited.category));
        }
        if edited.status != self.original.status {
            patch.insert("status".into(), json!(edited.status.label()));
        }
        if edited.priority != self.original.priority {
            patch.insert("priority".into(), json!(edited.priority.label()));
        }
        if edited.start_date != self.original.start_date {
            patch.insert(
                "start_date".into(),
                json!(edited.start_date.map(|d| d.to_rfc3339())),
            );
        }
        if edited.due_date != self.original.due_date {
            patch.insert(
                "due_date".into(),
                json!(edited.due_date.map(|d| d.to_rfc3339())),
            );
        }
        Value::Object(patch)
    }

    /// Full document for a create.
    pub fn document(&self) -> Value {
        let task = self.edited();
        json!({
            "title": task.title,
            "description": task.description,
            "category": task.category,
            "milestone_id": task.milestone_id,
            "assigned_to": task.assigned_to,
            "status": task.status.label(),
            "priority": task.priority.label(),
            "start_date": task.start_date.map(|d| d.to_rfc3339()),
            "due_date": task.due_date.map(|d| d.to_rfc3339()),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn show_task_dialog(state: &mut TaskDialogState, ctx: &Context) -> DialogAction {
    let mut action = DialogAction::Keep;
    let title = if state.is_new { "Add Task" } else { "Task" };

    Window::new(RichText::new(title).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([340.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("task_dialog_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut state.title).hint_text("Task title..."),
                    );
                    ui.end_row();

                    if let Some(name) = &state.milestone_name {
                        ui.label(RichText::new("Milestone").color(theme::TEXT_SECONDARY));
                        ui.label(RichText::new(name).color(theme::TEXT_PRIMARY));
                        ui.end_row();
                    }

                    ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("task_dlg_status")
                        .selected_text(state.status.label())
                        .show_ui(ui, |ui| {
                            for status in TaskStatus::ALL {
                                ui.selectable_value(&mut state.status, status, status.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Priority").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("task_dlg_priority")
                        .selected_text(state.priority.label())
                        .show_ui(ui, |ui| {
                            for priority in TaskPriority::ALL {
                                ui.selectable_value(&mut state.priority, priority, priority.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        ui.checkbox(&mut state.has_start, "");
                        ui.add_enabled(
                            state.has_start,
                            egui_extras::DatePickerButton::new(&mut state.start)
                                .id_salt("task_dlg_start"),
                        );
                    });
                    ui.end_row();

                    ui.label(RichText::new("Due").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        ui.checkbox(&mut state.has_due, "");
                        ui.add_enabled(
                            state.has_due,
                            egui_extras::DatePickerButton::new(&mut state.due)
                                .id_salt("task_dlg_due"),
                        );
                    });
                    ui.end_row();

                    ui.label(RichText::new("Assigned").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut state.assigned_to).hint_text("Who..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Category").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut state.category).hint_text("FRC, FTC..."),
                    );
                    ui.end_row();
                });

            ui.add_space(4.0);
            ui.label(RichText::new("Description").color(theme::TEXT_SECONDARY));
            ui.add(
                egui::TextEdit::multiline(&mut state.description)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_label = if state.is_new { "Create" } else { "Save" };
                let save_btn = egui::Button::new(RichText::new(save_label).color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    action = DialogAction::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = DialogAction::Cancel;
                }
                if !state.is_new {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let del_btn = egui::Button::new(
                            RichText::new("Delete").color(Color32::from_rgb(240, 120, 120)),
                        );
                        if ui.add_sized([80.0, 28.0], del_btn).clicked() {
                            action = DialogAction::Delete;
                        }
                    });
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = DialogAction::Cancel;
    }
    action
}

// ── Milestone dialog ─────────────────────────────────────────────────────────

pub struct MilestoneDialogState {
    pub original: Milestone,
    pub is_new: bool,
    name: String,
    category: String,
    color: String,
    status: MilestoneStatus,
    has_start: bool,
    start: NaiveDate,
    has_end: bool,
    end: NaiveDate,
}

impl MilestoneDialogState {
    pub fn edit(milestone: &Milestone, today: NaiveDate) -> Self {
        Self {
            is_new: false,
            name: milestone.name.clone(),
            category: milestone.category.clone().unwrap_or_default(),
            color: milestone.color.clone().unwrap_or_default(),
            status: milestone.status,
            has_start: milestone.start_date.is_some(),
            start: milestone.start_date.map(|d| d.date_naive()).unwrap_or(today),
            has_end: milestone.end_date.is_some(),
            end: milestone.end_date.map(|d| d.date_naive()).unwrap_or(today),
            original: milestone.clone(),
        }
    }

    pub fn create(today: NaiveDate) -> Self {
        Self {
            is_new: true,
            name: String::new(),
            category: String::new(),
            color: String::new(),
            status: MilestoneStatus::NotStarted,
            has_start: true,
            start: today,
            has_end: true,
            end: today + chrono::Duration::days(14),
            original: Milestone::new(""),
        }
    }

    /// Full document for a create.
    pub fn document(&self) -> Value {
        let milestone = self.edited();
        json!({
            "name": milestone.name,
            "category": milestone.category,
            "color": milestone.color,
            "status": milestone.status.label(),
            "start_date": milestone.start_date.map(|d| d.to_rfc3339()),
            "end_date": milestone.end_date.map(|d| d.to_rfc3339()),
        })
    }

    fn edited(&self) -> Milestone {
        let mut milestone = self.original.clone();
        milestone.name = if self.name.trim().is_empty() {
            "Untitled milestone".to_string()
        } else {
            self.name.trim().to_string()
        };
        milestone.category = non_empty(&self.category);
        milestone.color = non_empty(&self.color);
        milestone.status = self.status;
        milestone.start_date = self.has_start.then(|| day_start_utc(self.start));
        milestone.end_date = self.has_end.then(|| day_start_utc(self.end));
        milestone
    }

    pub fn result(&self) -> Milestone {
        self.edited()
    }

    pub fn patch(&self) -> Value {
        let edited = self.edited();
        let mut patch = Map::new();
        if edited.name != self.original.name {
            patch.insert("name".into(), json!(edited.name));
        }
        if edited.category != self.original.category {
            patch.insert("category".into(), json!(edited.category));
        }
        if edited.color != self.original.color {
            patch.insert("color".into(), json!(edited.color));
        }
        if edited.status != self.original.status {
            patch.insert("status".into(), json!(edited.status.label()));
        }
        if edited.start_date != self.original.start_date {
            patch.insert(
                "start_date".into(),
                json!(edited.start_date.map(|d| d.to_rfc3339())),
            );
        }
        if edited.end_date != self.original.end_date {
            patch.insert(
                "end_date".into(),
                json!(edited.end_date.map(|d| d.to_rfc3339())),
            );
        }
        Value::Object(patch)
    }
}

pub fn show_milestone_dialog(state: &mut MilestoneDialogState, ctx: &Context) -> DialogAction {
    let mut action = DialogAction::Keep;
    let title = if state.is_new { "Add Milestone" } else { "Milestone" };

    Window::new(RichText::new(title).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([340.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("milestone_dialog_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut state.name).hint_text("Milestone name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("ms_dlg_status")
                        .selected_text(state.status.label())
                        .show_ui(ui, |ui| {
                            for status in MilestoneStatus::ALL {
                                ui.selectable_value(&mut state.status, status, status.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        ui.checkbox(&mut state.has_start, "");
                        ui.add_enabled(
                            state.has_start,
                            egui_extras::DatePickerButton::new(&mut state.start)
                                .id_salt("ms_dlg_start"),
                        );
                    });
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        ui.checkbox(&mut state.has_end, "");
                        ui.add_enabled(
                            state.has_end,
                            egui_extras::DatePickerButton::new(&mut state.end)
                                .id_salt("ms_dlg_end"),
                        );
                    });
                    ui.end_row();

                    ui.label(RichText::new("Category").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut state.category).hint_text("FRC, FTC..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        ui.add_sized(
                            [90.0, 24.0],
                            egui::TextEdit::singleline(&mut state.color).hint_text("#4285f4"),
                        );
                        if let Some(color) = theme::parse_hex_color(&state.color) {
                            let (rect, _) = ui
                                .allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
                            ui.painter()
                                .rect_filled(rect, egui::Rounding::same(4.0), color);
                        }
                    });
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_label = if state.is_new { "Create" } else { "Save" };
                let save_btn = egui::Button::new(RichText::new(save_label).color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    action = DialogAction::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = DialogAction::Cancel;
                }
                if !state.is_new {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let del_btn = egui::Button::new(
                            RichText::new("Delete").color(Color32::from_rgb(240, 120, 120)),
                        );
                        if ui.add_sized([80.0, 28.0], del_btn).clicked() {
                            action = DialogAction::Delete;
                        }
                    });
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = DialogAction::Cancel;
    }
    action
}

// ── About ────────────────────────────────────────────────────────────────────

/// Returns true when the dialog asked to close.
pub fn show_about_dialog(ctx: &Context) -> bool {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([280.0, 150.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Teamline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("A timeline scheduler for robotics teams,");
                ui.label("built with Rust and egui.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn patch_contains_only_changed_fields() {
        let mut task = Task::new("Build intake");
        task.status = TaskStatus::NotStarted;
        let mut state = TaskDialogState::edit(&task, today());
        state.status = TaskStatus::InProgress;

        let patch = state.patch();
        let obj = patch.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["status"], "In Progress");
    }

    #[test]
    fn clearing_a_date_patches_null() {
        let mut task = Task::new("Build intake");
        task.start_date = Some(day_start_utc(today()));
        let mut state = TaskDialogState::edit(&task, today());
        state.has_start = false;

        let patch = state.patch();
        assert!(patch.as_object().unwrap()["start_date"].is_null());
    }

    #[test]
    fn create_document_carries_the_milestone_assignment() {
        let mut milestone = Milestone::new("Drive base");
        milestone.id = "m9".into();
        milestone.category = Some("FRC".into());
        let mut state = TaskDialogState::create(Some(&milestone), today());
        state.title = "Mount gearbox".into();

        let doc = state.document();
        assert_eq!(doc["milestone_id"], "m9");
        assert_eq!(doc["category"], "FRC");
        assert_eq!(doc["title"], "Mount gearbox");
        assert_eq!(doc["status"], "Not Started");
    }
}
