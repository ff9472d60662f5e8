use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use serde_json::json;

use crate::gantt::layout::{self, BarDescriptor, BarKind, BarSource};
use crate::gantt::{status_for_progress, DragTracker, TimelineViewport};
use crate::model::{
    build_hierarchy, day_start_utc, hierarchy, Milestone, Task,
};
use crate::store::{
    csv_export, spawn_store_worker, Collection, LocalStore, StoreCommand, StoreError, StoreEvent,
    StoreHandle,
};
use crate::ui;
use crate::ui::chart::DragChange;
use crate::ui::detail::{DialogAction, MilestoneDialogState, TaskDialogState};
use crate::ui::rows::build_rows;
use crate::ui::sidebar::SidebarAction;
use crate::ui::theme;

/// Cadence of the background refetch of both collections.
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Main application state.
pub struct SchedulerApp {
    // Collections, eventually consistent with the store.
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    loaded: bool,
    load_error: Option<String>,

    // Store worker.
    store: StoreHandle,
    data_dir: PathBuf,
    last_refresh_sent: Instant,
    last_synced: Option<chrono::DateTime<Local>>,

    // Timeline state.
    pub viewport: TimelineViewport,
    tracker: DragTracker,
    collapsed: HashSet<String>,
    pub category_filter: Option<String>,
    selected_bar: Option<String>,
    range_dirty: bool,
    initial_scroll_done: bool,

    // Dialog state.
    task_dialog: Option<TaskDialogState>,
    milestone_dialog: Option<MilestoneDialogState>,
    pub show_about: bool,

    // Status message.
    status_message: String,
}

impl SchedulerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, StoreError> {
        // Register Phosphor icons as a font fallback so they render inline.
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let store = LocalStore::open_default()?;
        if store.seed_if_empty()? {
            tracing::info!("seeded sample data into empty local store");
        }
        let data_dir = store.data_dir().to_path_buf();
        tracing::info!(dir = %data_dir.display(), "using local document store");

        let handle = spawn_store_worker(Box::new(store));
        handle.send(StoreCommand::Refresh);

        let today = Local::now().date_naive();
        Ok(Self {
            tasks: Vec::new(),
            milestones: Vec::new(),
            loaded: false,
            load_error: None,
            store: handle,
            data_dir,
            last_refresh_sent: Instant::now(),
            last_synced: None,
            viewport: TimelineViewport::new(
                today - chrono::Duration::days(7),
                today + chrono::Duration::days(60),
            ),
            tracker: DragTracker::new(),
            collapsed: HashSet::new(),
            category_filter: None,
            selected_bar: None,
            range_dirty: false,
            initial_scroll_done: false,
            task_dialog: None,
            milestone_dialog: None,
            show_about: false,
            status_message: "Loading...".to_string(),
        })
    }

    // --- Store plumbing ---

    pub fn request_refresh(&mut self) {
        self.store.send(StoreCommand::Refresh);
        self.last_refresh_sent = Instant::now();
    }

    fn drain_store_events(&mut self, now: Instant) {
        for event in self.store.poll() {
            match event {
                StoreEvent::Refreshed { tasks, milestones } => {
                    // Records still inside a drag's suppression window keep
                    // their optimistic local version for this cycle.
                    let local = std::mem::take(&mut self.tasks);
                    self.tasks = self
                        .tracker
                        .merge_refresh(local, tasks, now, |t| layout::task_bar_id(&t.id));
                    let local = std::mem::take(&mut self.milestones);
                    self.milestones = self.tracker.merge_refresh(local, milestones, now, |m| {
                        layout::milestone_bar_id(&m.id)
                    });
                    self.loaded = true;
                    self.load_error = None;
                    self.last_synced = Some(Local::now());
                    self.range_dirty = true;
                }
                StoreEvent::RefreshFailed { error } => {
                    tracing::warn!(%error, "refresh failed");
                    self.load_error = Some(error);
                }
                StoreEvent::WriteFailed {
                    collection,
                    id,
                    error,
                } => {
                    tracing::warn!(collection, id = %id, %error, "write rejected; not retrying");
                    self.status_message = format!("Save failed ({collection}): {error}");
                }
            }
        }
    }

    // --- Toolbar operations ---

    /// Distinct categories across both collections, for the filter combo.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .milestones
            .iter()
            .filter_map(|m| m.category.clone())
            .chain(self.tasks.iter().filter_map(|t| t.category.clone()))
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn export_schedule_csv(&mut self, bars: &[BarDescriptor]) {
        if bars.is_empty() {
            self.status_message = "Nothing to export".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("teamline-schedule.csv")
            .save_file()
        {
            match csv_export::export_schedule(bars, &path) {
                Ok(count) => {
                    self.status_message = format!("Exported {} rows to CSV", count);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "csv export failed");
                    self.status_message = format!("CSV export failed: {}", e);
                }
            }
        }
    }

    pub fn open_data_folder(&mut self) {
        if let Err(e) = open::that(&self.data_dir) {
            tracing::warn!(error = %e, "could not open data folder");
            self.status_message = "Could not open data folder".to_string();
        }
    }

    // --- Drag plumbing ---

    fn record_label(&self, change: &DragChange) -> String {
        match change.kind {
            BarKind::Task => self
                .tasks
                .iter()
                .find(|t| t.id == change.record_id)
                .map(|t| t.title.clone()),
            BarKind::Milestone => self
                .milestones
                .iter()
                .find(|m| m.id == change.record_id)
                .map(|m| m.name.clone()),
        }
        .unwrap_or_else(|| "item".to_string())
    }

    /// Optimistically apply a dragged window to the local collection.
    fn apply_window(&mut self, change: &DragChange) {
        match change.kind {
            BarKind::Task => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == change.record_id) {
                    task.start_date = Some(day_start_utc(change.start));
                    task.due_date = Some(day_start_utc(change.end));
                }
            }
            BarKind::Milestone => {
                if let Some(milestone) = self
                    .milestones
                    .iter_mut()
                    .find(|m| m.id == change.record_id)
                {
                    milestone.start_date = Some(day_start_utc(change.start));
                    milestone.end_date = Some(day_start_utc(change.end));
                }
            }
        }
    }

    /// Fire-and-forget persistence of a committed reschedule. Failures are
    /// logged; the bar reverts on the next unsuppressed refresh.
    fn persist_window(&mut self, change: &DragChange) {
        let start = day_start_utc(change.start).to_rfc3339();
        let end = day_start_utc(change.end).to_rfc3339();
        let (collection, patch) = match change.kind {
            BarKind::Task => (
                Collection::Tasks,
                json!({ "start_date": start, "due_date": end }),
            ),
            BarKind::Milestone => (
                Collection::Milestones,
                json!({ "start_date": start, "end_date": end }),
            ),
        };
        self.store.send(StoreCommand::Update {
            collection,
            id: change.record_id.clone(),
            patch,
        });
        self.status_message = format!(
            "Rescheduled '{}' ({} → {})",
            self.record_label(change),
            change.start.format("%Y-%m-%d"),
            change.end.format("%Y-%m-%d"),
        );
    }

    /// A released progress drag maps the percentage back to a status and
    /// persists that; only tasks take progress edits.
    fn commit_progress(&mut self, bar_id: &str, percent: u8) {
        let Some(record_id) = bar_id.strip_prefix("task-").map(str::to_string) else {
            return;
        };
        let status = status_for_progress(percent);
        let title = if let Some(task) = self.tasks.iter_mut().find(|t| t.id == record_id) {
            task.status = status;
            task.title.clone()
        } else {
            return;
        };
        self.store.send(StoreCommand::Update {
            collection: Collection::Tasks,
            id: record_id,
            patch: json!({ "status": status.label() }),
        });
        self.status_message = format!("'{}' set to {}", title, status.label());
    }

    // --- Dialog operations ---

    fn save_task_dialog(&mut self, dialog: TaskDialogState) {
        if dialog.is_new {
            self.store.send(StoreCommand::Create {
                collection: Collection::Tasks,
                data: dialog.document(),
            });
            self.status_message = "Task added".to_string();
        } else {
            let patch = dialog.patch();
            if patch.as_object().is_some_and(|p| p.is_empty()) {
                return;
            }
            let task = dialog.result();
            if let Some(local) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                *local = task;
            }
            self.store.send(StoreCommand::Update {
                collection: Collection::Tasks,
                id: dialog.original.id.clone(),
                patch,
            });
            self.status_message = "Task updated".to_string();
        }
        self.request_refresh();
    }

    fn delete_task(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
        self.store.send(StoreCommand::Remove {
            collection: Collection::Tasks,
            id: id.to_string(),
        });
        self.status_message = "Task deleted".to_string();
        self.request_refresh();
    }

    fn save_milestone_dialog(&mut self, dialog: MilestoneDialogState) {
        if dialog.is_new {
            self.store.send(StoreCommand::Create {
                collection: Collection::Milestones,
                data: dialog.document(),
            });
            self.status_message = "Milestone added".to_string();
        } else {
            let patch = dialog.patch();
            if patch.as_object().is_some_and(|p| p.is_empty()) {
                return;
            }
            let milestone = dialog.result();
            if let Some(local) = self.milestones.iter_mut().find(|m| m.id == milestone.id) {
                *local = milestone;
            }
            self.store.send(StoreCommand::Update {
                collection: Collection::Milestones,
                id: dialog.original.id.clone(),
                patch,
            });
            self.status_message = "Milestone updated".to_string();
        }
        self.request_refresh();
    }

    /// Deleting a milestone leaves its tasks' references dangling; the
    /// hierarchy builder routes them to Unassigned.
    fn delete_milestone(&mut self, id: &str) {
        self.milestones.retain(|m| m.id != id);
        self.store.send(StoreCommand::Remove {
            collection: Collection::Milestones,
            id: id.to_string(),
        });
        self.status_message = "Milestone deleted".to_string();
        self.request_refresh();
    }
}

impl eframe::App for SchedulerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        theme::apply_theme(ctx);

        let now = Instant::now();
        let today = Local::now().date_naive();

        if now.duration_since(self.last_refresh_sent) >= REFRESH_INTERVAL {
            self.request_refresh();
        }
        self.drain_store_events(now);

        // Derive the frame's view state: filter, group, lay out.
        let filter = self.category_filter.clone();
        let filtered_tasks: Vec<Task> = hierarchy::tasks_in_category(&self.tasks, filter.as_deref())
            .into_iter()
            .cloned()
            .collect();
        let filtered_milestones: Vec<Milestone> =
            hierarchy::milestones_in_category(&self.milestones, filter.as_deref())
                .into_iter()
                .cloned()
                .collect();
        let entries = build_hierarchy(&filtered_tasks, &filtered_milestones);
        let bars = layout::layout_bars(&entries, today);

        if self.range_dirty {
            self.viewport.fit_range(&bars, today);
            self.range_dirty = false;
            if !self.initial_scroll_done && !bars.is_empty() {
                self.viewport.request_scroll_to_first(&bars);
                self.initial_scroll_done = true;
            }
        }

        let rows = build_rows(&entries, &self.collapsed);

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, &bars, today, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(theme::BG_PANEL)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(10.5)
                            .color(theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let sync = match (&self.load_error, self.last_synced) {
                            (Some(_), _) => "Sync failed".to_string(),
                            (None, Some(at)) => format!("Synced {}", at.format("%H:%M:%S")),
                            (None, None) => "Syncing...".to_string(),
                        };
                        ui.label(egui::RichText::new(sync).size(10.5).color(theme::TEXT_DIM));
                        ui.label(egui::RichText::new(" · ").size(10.5).color(theme::TEXT_DIM));
                        ui.label(
                            egui::RichText::new(format!(
                                "Milestones: {} · Tasks: {}",
                                self.milestones.len(),
                                self.tasks.len()
                            ))
                            .size(10.5)
                            .color(theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: hierarchy
        let sidebar_action = egui::SidePanel::left("hierarchy_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .frame(
                egui::Frame::default()
                    .fill(theme::BG_PANEL)
                    .inner_margin(egui::Margin::symmetric(6.0, 0.0))
                    .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| ui::sidebar::show_sidebar(&rows, ui))
            .inner;

        match sidebar_action {
            SidebarAction::None => {}
            SidebarAction::ToggleCollapse(key) => {
                if !self.collapsed.remove(&key) {
                    self.collapsed.insert(key);
                }
            }
            SidebarAction::OpenTask(task) => {
                self.task_dialog = Some(TaskDialogState::edit(&task, today));
            }
            SidebarAction::OpenMilestone(milestone) => {
                self.milestone_dialog = Some(MilestoneDialogState::edit(&milestone, today));
            }
            SidebarAction::AddTask(milestone) => {
                self.task_dialog = Some(TaskDialogState::create(milestone.as_ref(), today));
            }
            SidebarAction::AddMilestone => {
                self.milestone_dialog = Some(MilestoneDialogState::create(today));
            }
        }

        // Central panel: timeline chart
        let bar_index: HashMap<&str, &BarDescriptor> =
            bars.iter().map(|b| (b.id.as_str(), b)).collect();
        let chart_frame = egui::Frame::default()
            .fill(theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let output = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                if rows.is_empty() {
                    let message = if let Some(error) = &self.load_error {
                        format!("Could not load data: {error}")
                    } else if !self.loaded {
                        "Loading...".to_string()
                    } else {
                        "No tasks or milestones to display. Create a milestone and add tasks \
                         with dates."
                            .to_string()
                    };
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(message).color(theme::TEXT_DIM));
                    });
                    ui::chart::ChartOutput::default()
                } else {
                    ui::chart::show_timeline(
                        &rows,
                        &bar_index,
                        &mut self.viewport,
                        &mut self.selected_bar,
                        today,
                        ui,
                    )
                }
            })
            .inner;

        // Route gesture output. Every drag frame re-arms the record's
        // suppression window, so a refresh landing mid-gesture cannot snap
        // the bar back.
        if let Some(change) = output.drag_preview {
            self.tracker.touch(&change.bar_id, now);
            self.apply_window(&change);
        }
        if let Some(change) = output.drag_committed {
            self.tracker.touch(&change.bar_id, now);
            self.apply_window(&change);
            self.persist_window(&change);
        }
        if let Some((bar_id, _)) = output.progress_preview {
            self.tracker.touch(&bar_id, now);
        }
        if let Some((bar_id, percent)) = output.progress_committed {
            self.tracker.touch(&bar_id, now);
            self.commit_progress(&bar_id, percent);
        }
        if let Some(bar_id) = output.clicked {
            // The click right after a drag release is the drag's trailing
            // click; the tracker swallows it.
            if !self.tracker.swallow_click(&bar_id, now) {
                match bar_index.get(bar_id.as_str()).map(|b| &b.source) {
                    Some(BarSource::Task(task)) => {
                        self.task_dialog = Some(TaskDialogState::edit(task, today));
                    }
                    Some(BarSource::Milestone(milestone)) => {
                        self.milestone_dialog =
                            Some(MilestoneDialogState::edit(milestone, today));
                    }
                    None => {}
                }
            }
        }

        // Dialogs
        if let Some(mut dialog) = self.task_dialog.take() {
            match ui::detail::show_task_dialog(&mut dialog, ctx) {
                DialogAction::Keep => self.task_dialog = Some(dialog),
                DialogAction::Cancel => {}
                DialogAction::Save => self.save_task_dialog(dialog),
                DialogAction::Delete => {
                    let id = dialog.original.id.clone();
                    self.delete_task(&id);
                }
            }
        }
        if let Some(mut dialog) = self.milestone_dialog.take() {
            match ui::detail::show_milestone_dialog(&mut dialog, ctx) {
                DialogAction::Keep => self.milestone_dialog = Some(dialog),
                DialogAction::Cancel => {}
                DialogAction::Save => self.save_milestone_dialog(dialog),
                DialogAction::Delete => {
                    let id = dialog.original.id.clone();
                    self.delete_milestone(&id);
                }
            }
        }
        if self.show_about && ui::detail::show_about_dialog(ctx) {
            self.show_about = false;
        }

        // Keep polling the store even when idle.
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
