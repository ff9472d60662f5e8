use egui::{Color32, RichText, Ui};

use crate::model::{Milestone, Task};
use crate::ui::rows::TimelineRow;
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;

/// Actions the hierarchy panel can request.
pub enum SidebarAction {
    None,
    ToggleCollapse(String),
    OpenTask(Task),
    OpenMilestone(Milestone),
    /// Create a task, optionally pre-assigned to a milestone.
    AddTask(Option<Milestone>),
    AddMilestone,
}

/// Render the left-side hierarchy panel. Rows are the same list the chart
/// draws, so both panels stay aligned vertically.
pub fn show_sidebar(rows: &[TimelineRow], ui: &mut Ui) -> SidebarAction {
    let mut action = SidebarAction::None;

    // Header strip matching the chart header height.
    ui.allocate_ui(egui::vec2(ui.available_width(), theme::HEADER_HEIGHT), |ui| {
        ui.horizontal_centered(|ui| {
            ui.add_space(4.0);
            ui.label(
                RichText::new("Name")
                    .strong()
                    .size(12.0)
                    .color(theme::TEXT_SECONDARY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let add_milestone = ui.add(
                    egui::Button::new(
                        RichText::new(format!("{} Milestone", egui_phosphor::regular::FLAG))
                            .size(11.0)
                            .color(Color32::WHITE),
                    )
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0)),
                );
                if add_milestone.on_hover_text("Add a milestone").clicked() {
                    action = SidebarAction::AddMilestone;
                }
                let add_task = ui.add(
                    egui::Button::new(
                        RichText::new(format!("{} Task", egui_phosphor::regular::PLUS))
                            .size(11.0)
                            .color(Color32::WHITE),
                    )
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0)),
                );
                if add_task.on_hover_text("Add an unassigned task").clicked() {
                    action = SidebarAction::AddTask(None);
                }
            });
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 0.0;
            for row in rows {
                match row {
                    TimelineRow::Group {
                        key,
                        label,
                        milestone,
                        expanded,
                        ..
                    } => group_row(ui, key, label, milestone.as_ref(), *expanded, &mut action),
                    TimelineRow::Task { task, .. } => task_row(ui, task, &mut action),
                    TimelineRow::AddTask { milestone } => add_task_row(ui, milestone, &mut action),
                }
            }
        });

    action
}

fn row_frame(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui)) -> egui::Response {
    let height = ROW_HEIGHT + ROW_PADDING;
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::click(),
    );
    if response.hovered() {
        ui.painter()
            .rect_filled(rect, egui::Rounding::same(3.0), theme::BG_ROW_EVEN);
    }
    let mut content_ui = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(rect.shrink2(egui::vec2(6.0, 0.0)))
            .layout(egui::Layout::left_to_right(egui::Align::Center)),
    );
    add_contents(&mut content_ui);
    response
}

fn group_row(
    ui: &mut Ui,
    key: &str,
    label: &str,
    milestone: Option<&Milestone>,
    expanded: bool,
    action: &mut SidebarAction,
) {
    let collapsible = milestone.is_some();
    let dot_color = milestone
        .and_then(|m| m.color.as_deref())
        .and_then(theme::parse_hex_color)
        .unwrap_or(theme::BAR_MILESTONE);

    let response = row_frame(ui, |ui| {
        if collapsible {
            let caret = if expanded {
                egui_phosphor::regular::CARET_DOWN
            } else {
                egui_phosphor::regular::CARET_RIGHT
            };
            ui.label(RichText::new(caret).size(11.0).color(theme::TEXT_DIM));
        } else {
            ui.add_space(14.0);
        }
        let (dot_rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
        ui.painter()
            .rect_filled(dot_rect, egui::Rounding::same(2.0), dot_color);
        ui.add(
            egui::Label::new(
                RichText::new(label)
                    .size(12.5)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            )
            .truncate()
            .selectable(false),
        );
    });

    let response = if collapsible {
        response.on_hover_text("Click to collapse/expand · double-click to edit")
    } else {
        response
    };
    if response.double_clicked() {
        if let Some(milestone) = milestone {
            *action = SidebarAction::OpenMilestone(milestone.clone());
        }
    } else if response.clicked() && collapsible {
        *action = SidebarAction::ToggleCollapse(key.to_string());
    }
}

fn task_row(ui: &mut Ui, task: &Task, action: &mut SidebarAction) {
    let response = row_frame(ui, |ui| {
        ui.add_space(22.0);
        let (dot_rect, _) = ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
        ui.painter()
            .circle_filled(dot_rect.center(), 2.5, theme::TEXT_DIM);
        ui.add(
            egui::Label::new(
                RichText::new(&task.title)
                    .size(12.0)
                    .color(theme::TEXT_SECONDARY),
            )
            .truncate()
            .selectable(false),
        );
    });

    if response.clicked() {
        *action = SidebarAction::OpenTask(task.clone());
    }
}

fn add_task_row(ui: &mut Ui, milestone: &Milestone, action: &mut SidebarAction) {
    let response = row_frame(ui, |ui| {
        ui.add_space(22.0);
        ui.label(
            RichText::new(format!("{} Add Task", egui_phosphor::regular::PLUS))
                .size(11.5)
                .color(theme::TEXT_DIM),
        );
    });

    if response.clicked() {
        *action = SidebarAction::AddTask(Some(milestone.clone()));
    }
}
