use chrono::NaiveDate;
use egui::{menu, RichText, Ui};

use crate::app::SchedulerApp;
use crate::gantt::layout::BarDescriptor;
use crate::gantt::viewport::ZoomLevel;
use crate::ui::theme;

/// Render the top toolbar: file menu, timeline navigation, zoom and category
/// controls.
pub fn show_toolbar(
    app: &mut SchedulerApp,
    bars: &[BarDescriptor],
    today: NaiveDate,
    ui: &mut Ui,
) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui
                .button(format!("  {} Export Schedule CSV...", egui_phosphor::regular::EXPORT))
                .clicked()
            {
                app.export_schedule_csv(bars);
                ui.close_menu();
            }
            if ui
                .button(format!("  {} Open Data Folder", egui_phosphor::regular::FOLDER_OPEN))
                .clicked()
            {
                app.open_data_folder();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .button(format!(
                    "  {} Refresh Now",
                    egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE
                ))
                .clicked()
            {
                app.request_refresh();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .button(format!("  {} About", egui_phosphor::regular::INFO))
                .clicked()
            {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(format!("{} First Task", egui_phosphor::regular::SKIP_BACK))
            .on_hover_text("Scroll to the earliest bar")
            .clicked()
        {
            app.viewport.request_scroll_to_first(bars);
        }
        if ui
            .button(format!("{} Today", egui_phosphor::regular::CROSSHAIR))
            .on_hover_text("Scroll to today's column")
            .clicked()
        {
            app.viewport.request_scroll_to_date(today);
        }

        ui.separator();

        egui::ComboBox::from_id_salt("zoom_level")
            .selected_text(app.viewport.zoom.label())
            .width(84.0)
            .show_ui(ui, |ui| {
                for level in ZoomLevel::ALL {
                    ui.selectable_value(&mut app.viewport.zoom, level, level.label());
                }
            });

        let categories = app.categories();
        if !categories.is_empty() {
            let selected = app
                .category_filter
                .clone()
                .unwrap_or_else(|| "All categories".to_string());
            egui::ComboBox::from_id_salt("category_filter")
                .selected_text(selected)
                .width(120.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut app.category_filter, None, "All categories");
                    for category in categories {
                        ui.selectable_value(
                            &mut app.category_filter,
                            Some(category.clone()),
                            category,
                        );
                    }
                });
        }

        // Right-aligned gesture hint, like the hosted dashboard's toolbar.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new("Drag bars to reschedule · Drag the fill edge to set progress")
                    .size(11.0)
                    .color(theme::TEXT_DIM),
            );
        });
    });
}
