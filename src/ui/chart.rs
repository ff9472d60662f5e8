use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use egui::{Color32, Id, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::gantt::layout::{BarDescriptor, BarKind, BarSource, VisualClass};
use crate::gantt::viewport::{TimelineViewport, ZoomLevel};
use crate::ui::rows::TimelineRow;
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;

/// Pixel state captured when a drag begins, kept in egui's id map for the
/// duration of the gesture.
#[derive(Debug, Clone)]
struct DragSnapshot {
    start: NaiveDate,
    end: NaiveDate,
    start_pointer_x: f32,
}

/// Snapshot for a progress-edge drag.
#[derive(Debug, Clone)]
struct ProgressSnapshot {
    progress: u8,
    start_pointer_x: f32,
}

/// A window change produced by a drag gesture.
#[derive(Debug, Clone)]
pub struct DragChange {
    pub bar_id: String,
    pub kind: BarKind,
    pub record_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Everything the chart reported this frame. The chart itself never mutates
/// records or talks to the store; the app routes these.
#[derive(Debug, Default)]
pub struct ChartOutput {
    /// A bar was clicked (kind-prefixed id). Whether the click is the
    /// trailing click of a drag release is the drag tracker's call.
    pub clicked: Option<String>,
    /// A date drag is in flight; apply optimistically.
    pub drag_preview: Option<DragChange>,
    /// A date drag released; persist the window.
    pub drag_committed: Option<DragChange>,
    /// A progress drag is in flight (bar id, percent).
    pub progress_preview: Option<(String, u8)>,
    /// A progress drag released (bar id, percent).
    pub progress_committed: Option<(String, u8)>,
}

/// Render the timeline chart (header, grid, today line, bars) and collect
/// gesture output. Rows must match the sidebar's row list one to one.
pub fn show_timeline(
    rows: &[TimelineRow],
    bars: &HashMap<&str, &BarDescriptor>,
    viewport: &mut TimelineViewport,
    selected_bar: &mut Option<String>,
    today: NaiveDate,
    ui: &mut Ui,
) -> ChartOutput {
    let mut output = ChartOutput::default();

    // Re-observe the viewport width every frame; only column width reacts.
    viewport.set_container_width(ui.available_width());

    // Ctrl+scroll steps through the discrete zoom levels.
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            viewport.zoom_in();
        } else if scroll_delta.y < 0.0 {
            viewport.zoom_out();
        }
    }

    let available = ui.available_size();
    let chart_width = viewport.total_width().max(available.x);
    let chart_height =
        (HEADER_HEIGHT + rows.len() as f32 * (ROW_HEIGHT + ROW_PADDING) + 40.0).max(available.y);

    let mut scroll = egui::ScrollArea::horizontal().auto_shrink([false, false]);
    if let Some(offset) = viewport.pending_scroll.take() {
        scroll = scroll.horizontal_scroll_offset(offset);
    }

    scroll.show(ui, |ui| {
        let (response, painter) =
            ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::click());
        let origin = response.rect.min;
        let mut consumed_click = false;

        painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

        draw_timeline_header(&painter, origin, viewport, chart_width, chart_height);

        // Alternating row backgrounds under the bars.
        for (i, _row) in rows.iter().enumerate() {
            let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING);
            if i % 2 == 0 {
                painter.rect_filled(
                    Rect::from_min_size(
                        Pos2::new(origin.x, y),
                        Vec2::new(chart_width, ROW_HEIGHT + ROW_PADDING),
                    ),
                    0.0,
                    theme::BG_PANEL,
                );
            }
            painter.line_segment(
                [
                    Pos2::new(origin.x, y + ROW_HEIGHT + ROW_PADDING),
                    Pos2::new(origin.x + chart_width, y + ROW_HEIGHT + ROW_PADDING),
                ],
                Stroke::new(0.5, theme::BORDER_SUBTLE),
            );
        }

        draw_today_line(&painter, origin, viewport, chart_height, today);

        for (i, row) in rows.iter().enumerate() {
            let Some(bar) = row.bar_id().and_then(|id| bars.get(id).copied()) else {
                continue;
            };
            let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING) + ROW_PADDING;
            bar_row(
                bar,
                viewport,
                origin,
                y,
                selected_bar,
                &mut consumed_click,
                &mut output,
                &painter,
                ui,
            );
        }

        // Clicking empty chart space clears the selection.
        if response.clicked() && !consumed_click {
            *selected_bar = None;
        }
    });

    output
}

fn drag_id(bar_id: &str, mode: &'static str) -> Id {
    Id::new(("timeline-drag", bar_id.to_string(), mode))
}

fn drag_days(delta_x: f32, viewport: &TimelineViewport) -> i64 {
    (delta_x / viewport.pixels_per_day()).round() as i64
}

fn pointer_x(response: &egui::Response) -> f32 {
    response.interact_pointer_pos().map(|p| p.x).unwrap_or(0.0)
}

#[allow(clippy::too_many_arguments)]
fn bar_row(
    bar: &BarDescriptor,
    viewport: &TimelineViewport,
    origin: Pos2,
    y: f32,
    selected_bar: &mut Option<String>,
    consumed_click: &mut bool,
    output: &mut ChartOutput,
    painter: &egui::Painter,
    ui: &mut Ui,
) {
    let is_selected = selected_bar.as_deref() == Some(bar.id.as_str());

    // A live progress drag overrides the status-derived fill for the frame.
    let progress_override = ui
        .ctx()
        .data_mut(|data| data.get_temp::<ProgressSnapshot>(drag_id(&bar.id, "progress-live")))
        .map(|snap| snap.progress);

    let bar_rect = draw_bar(painter, origin, viewport, bar, y, is_selected, progress_override);

    let bar_response = ui.interact(
        bar_rect,
        ui.make_persistent_id(("timeline-bar", &bar.id)),
        Sense::click_and_drag(),
    );
    let left_handle_rect = Rect::from_min_max(
        Pos2::new(bar_rect.left() - HANDLE_WIDTH * 0.5, bar_rect.top()),
        Pos2::new(bar_rect.left() + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
    );
    let right_handle_rect = Rect::from_min_max(
        Pos2::new(bar_rect.right() - HANDLE_WIDTH * 0.5, bar_rect.top()),
        Pos2::new(bar_rect.right() + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
    );
    let left_response = ui.interact(
        left_handle_rect.expand(4.0),
        ui.make_persistent_id(("timeline-resize-left", &bar.id)),
        Sense::drag(),
    );
    let right_response = ui.interact(
        right_handle_rect.expand(4.0),
        ui.make_persistent_id(("timeline-resize-right", &bar.id)),
        Sense::drag(),
    );

    // Tasks get a progress knob at the fill boundary; milestones take no
    // progress edits.
    let progress_response = if bar.kind == BarKind::Task {
        let shown = progress_override.unwrap_or(bar.progress);
        let knob_x = bar_rect.left() + bar_rect.width() * f32::from(shown) / 100.0;
        let knob_rect = Rect::from_center_size(
            Pos2::new(knob_x, bar_rect.bottom() - 3.0),
            Vec2::splat(10.0),
        );
        Some(ui.interact(
            knob_rect,
            ui.make_persistent_id(("timeline-progress", &bar.id)),
            Sense::drag(),
        ))
    } else {
        None
    };

    if bar_response.clicked() {
        *selected_bar = Some(bar.id.clone());
        *consumed_click = true;
        output.clicked = Some(bar.id.clone());
    }

    // ── Date drags ───────────────────────────────────────────────────────

    for (response, mode) in [
        (&bar_response, "move"),
        (&left_response, "left"),
        (&right_response, "right"),
    ] {
        if response.drag_started() {
            let snapshot = DragSnapshot {
                start: bar.start,
                end: bar.end,
                start_pointer_x: pointer_x(response),
            };
            ui.ctx()
                .data_mut(|data| data.insert_temp(drag_id(&bar.id, mode), snapshot));
            *selected_bar = Some(bar.id.clone());
            *consumed_click = true;
        }
    }

    let preview = if left_response.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
        drag_window(ui, bar, "left", pointer_x(&left_response), viewport)
    } else if right_response.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
        drag_window(ui, bar, "right", pointer_x(&right_response), viewport)
    } else if bar_response.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        drag_window(ui, bar, "move", pointer_x(&bar_response), viewport)
    } else {
        None
    };
    if let Some((start, end)) = preview {
        output.drag_preview = Some(change_for(bar, start, end));
    }

    for (response, mode) in [
        (&bar_response, "move"),
        (&left_response, "left"),
        (&right_response, "right"),
    ] {
        if response.drag_stopped() {
            let snapshot = ui.ctx().data_mut(|data| {
                let snapshot = data.get_temp::<DragSnapshot>(drag_id(&bar.id, mode));
                data.remove::<DragSnapshot>(drag_id(&bar.id, mode));
                snapshot
            });
            // The last preview is already applied to the record; commit the
            // window the bar currently shows, unless nothing actually moved.
            if snapshot.is_some_and(|s| (s.start, s.end) != (bar.start, bar.end)) {
                output.drag_committed = Some(change_for(bar, bar.start, bar.end));
            }
        }
    }

    // ── Progress drag ────────────────────────────────────────────────────

    if let Some(progress_response) = &progress_response {
        if progress_response.drag_started() {
            let snapshot = ProgressSnapshot {
                progress: bar.progress,
                start_pointer_x: pointer_x(progress_response),
            };
            ui.ctx().data_mut(|data| {
                data.insert_temp(drag_id(&bar.id, "progress"), snapshot.clone());
                data.insert_temp(drag_id(&bar.id, "progress-live"), snapshot);
            });
            *selected_bar = Some(bar.id.clone());
            *consumed_click = true;
        }

        if progress_response.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
            let snapshot = ui
                .ctx()
                .data_mut(|data| data.get_temp::<ProgressSnapshot>(drag_id(&bar.id, "progress")));
            if let Some(snapshot) = snapshot {
                let delta_x = pointer_x(progress_response) - snapshot.start_pointer_x;
                let delta_pct = (delta_x / bar_rect.width().max(1.0) * 100.0).round() as i32;
                let live = (i32::from(snapshot.progress) + delta_pct).clamp(0, 100) as u8;
                ui.ctx().data_mut(|data| {
                    data.insert_temp(
                        drag_id(&bar.id, "progress-live"),
                        ProgressSnapshot {
                            progress: live,
                            start_pointer_x: snapshot.start_pointer_x,
                        },
                    );
                });
                output.progress_preview = Some((bar.id.clone(), live));
            }
        }

        if progress_response.drag_stopped() {
            let (began, live) = ui.ctx().data_mut(|data| {
                let began = data.get_temp::<ProgressSnapshot>(drag_id(&bar.id, "progress"));
                let live = data.get_temp::<ProgressSnapshot>(drag_id(&bar.id, "progress-live"));
                data.remove::<ProgressSnapshot>(drag_id(&bar.id, "progress"));
                data.remove::<ProgressSnapshot>(drag_id(&bar.id, "progress-live"));
                (began, live)
            });
            if let (Some(began), Some(live)) = (began, live) {
                if live.progress != began.progress {
                    output.progress_committed = Some((bar.id.clone(), live.progress));
                }
            }
        }
    }

    // ── Affordances & tooltip ────────────────────────────────────────────

    let progress_hovered = progress_response.as_ref().is_some_and(|r| r.hovered());
    if is_selected || left_response.hovered() || right_response.hovered() {
        if left_response.hovered() || right_response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
        } else if bar_response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        let handle_h = bar_rect.height() * 0.55;
        let handle_y = bar_rect.center().y - handle_h / 2.0;
        let lh = Rect::from_min_size(
            Pos2::new(bar_rect.left() - 1.5, handle_y),
            Vec2::new(4.0, handle_h),
        );
        let rh = Rect::from_min_size(
            Pos2::new(bar_rect.right() - 2.5, handle_y),
            Vec2::new(4.0, handle_h),
        );
        painter.rect_filled(lh, Rounding::same(2.0), theme::HANDLE_COLOR);
        painter.rect_filled(rh, Rounding::same(2.0), theme::HANDLE_COLOR);
    }

    if bar_response.hovered()
        || left_response.hovered()
        || right_response.hovered()
        || progress_hovered
    {
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            Id::new(("timeline-tip", &bar.id)),
            |ui| {
                ui.strong(&bar.label);
                ui.label(format!(
                    "{} → {}",
                    bar.start.format("%d/%m/%Y"),
                    bar.end.format("%d/%m/%Y"),
                ));
                ui.label(format!(
                    "Progress: {}%",
                    progress_override.unwrap_or(bar.progress)
                ));
                if let BarSource::Task(task) = &bar.source {
                    if let Some(assignee) = &task.assigned_to {
                        ui.label(format!("Assigned: {assignee}"));
                    }
                }
            },
        );
    }
}

fn change_for(bar: &BarDescriptor, start: NaiveDate, end: NaiveDate) -> DragChange {
    DragChange {
        bar_id: bar.id.clone(),
        kind: bar.kind,
        record_id: bar.record_id().to_string(),
        start,
        end,
    }
}

/// Compute the dragged window for the given mode from the gesture snapshot.
fn drag_window(
    ui: &Ui,
    bar: &BarDescriptor,
    mode: &'static str,
    pointer_x: f32,
    viewport: &TimelineViewport,
) -> Option<(NaiveDate, NaiveDate)> {
    let snapshot = ui
        .ctx()
        .data_mut(|data| data.get_temp::<DragSnapshot>(drag_id(&bar.id, mode)))?;
    let day_delta = drag_days(pointer_x - snapshot.start_pointer_x, viewport);
    match mode {
        "left" => {
            let start = (snapshot.start + Duration::days(day_delta)).min(snapshot.end);
            Some((start, snapshot.end))
        }
        "right" => {
            let end = (snapshot.end + Duration::days(day_delta)).max(snapshot.start);
            Some((snapshot.start, end))
        }
        _ => Some((
            snapshot.start + Duration::days(day_delta),
            snapshot.end + Duration::days(day_delta),
        )),
    }
}

fn bar_fill_color(bar: &BarDescriptor) -> Color32 {
    if let BarSource::Milestone(milestone) = &bar.source {
        if let Some(color) = milestone.color.as_deref().and_then(theme::parse_hex_color) {
            return color;
        }
    }
    theme::class_color(bar.class)
}

#[allow(clippy::too_many_arguments)]
fn draw_bar(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    bar: &BarDescriptor,
    y: f32,
    is_selected: bool,
    progress_override: Option<u8>,
) -> Rect {
    let x_start = origin.x + viewport.date_to_x(bar.start);
    // Bars span through the end of their last day.
    let x_end = origin.x + viewport.date_to_x(bar.end + Duration::days(1));
    let bar_width = (x_end - x_start).max(6.0);
    let inset = if bar.kind == BarKind::Milestone {
        theme::BAR_INSET + 2.0
    } else {
        theme::BAR_INSET
    };

    let bar_rect = Rect::from_min_size(
        Pos2::new(x_start, y + inset),
        Vec2::new(bar_width, ROW_HEIGHT - inset * 2.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let fill = bar_fill_color(bar);

    // Soft shadow
    let shadow_rect = bar_rect.translate(Vec2::new(1.0, 2.0));
    painter.rect_filled(shadow_rect, rounding, Color32::from_black_alpha(35));

    painter.rect_filled(bar_rect, rounding, fill);
    // Lighter top highlight
    let highlight_rect = Rect::from_min_size(
        bar_rect.min,
        Vec2::new(bar_width, (bar_rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight_rect,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    // Progress fill (darkened overlay) with a divider tick.
    let progress = progress_override.unwrap_or(bar.progress);
    if progress > 0 {
        let progress_width = bar_width * f32::from(progress) / 100.0;
        let progress_rect =
            Rect::from_min_size(bar_rect.min, Vec2::new(progress_width, bar_rect.height()));
        painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);

        if progress < 98 {
            let tick_x = bar_rect.left() + progress_width;
            painter.line_segment(
                [
                    Pos2::new(tick_x, bar_rect.top() + 2.0),
                    Pos2::new(tick_x, bar_rect.bottom() - 2.0),
                ],
                Stroke::new(1.0, Color32::from_white_alpha(60)),
            );
        }
    }

    // Blocked bars carry a diagonal hatch so the shared 50% fill still reads
    // differently from InProgress.
    if bar.class == VisualClass::Blocked {
        let mut x = bar_rect.left() + 4.0;
        while x < bar_rect.right() {
            painter.line_segment(
                [
                    Pos2::new(x, bar_rect.bottom() - 2.0),
                    Pos2::new((x + bar_rect.height()).min(bar_rect.right()), bar_rect.top() + 2.0),
                ],
                Stroke::new(1.0, theme::BLOCKED_HATCH),
            );
            x += 8.0;
        }
    }

    // Milestones get diamond caps on both ends.
    if bar.kind == BarKind::Milestone {
        for cap_x in [bar_rect.left(), bar_rect.right()] {
            let center = Pos2::new(cap_x, bar_rect.center().y);
            let size = bar_rect.height() / 2.0 + 3.0;
            let points = vec![
                Pos2::new(center.x, center.y - size),
                Pos2::new(center.x + size * 0.7, center.y),
                Pos2::new(center.x, center.y + size),
                Pos2::new(center.x - size * 0.7, center.y),
            ];
            painter.add(egui::Shape::convex_polygon(points, fill, Stroke::NONE));
        }
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Label on the bar, clipped to its bounds.
    if bar_width > 30.0 {
        let galley = painter.layout_no_wrap(bar.label.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}

fn draw_timeline_header(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let grid_line = |x: f32| {
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    };

    let mut date = viewport.start;
    let end = viewport.end;

    match viewport.zoom {
        ZoomLevel::Day => {
            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                if viewport.pixels_per_day() >= 20.0 {
                    let is_weekend = date.weekday().num_days_from_monday() >= 5;
                    let day_color = if is_weekend {
                        theme::TEXT_DIM
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 28.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%d").to_string(),
                        theme::font_sub(),
                        day_color,
                    );
                }

                if date.day() == 1 || date == viewport.start {
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 12.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%b %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }

                date += Duration::days(1);
            }
        }
        ZoomLevel::Week => {
            // Align to the Monday at or before the range start.
            let weekday = date.weekday().num_days_from_monday();
            date -= Duration::days(i64::from(weekday));

            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                painter.text(
                    Pos2::new(x + 3.0, origin.y + 28.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("W%V").to_string(),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );

                if date.day() <= 7 {
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 12.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%b %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }

                date += Duration::days(7);
            }
        }
        ZoomLevel::Month => {
            date = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);

            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                painter.text(
                    Pos2::new(x + 5.0, origin.y + 18.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("%b %Y").to_string(),
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );

                date = next_month(date);
            }
        }
        ZoomLevel::Quarter => {
            let quarter_month = ((date.month0() / 3) * 3) + 1;
            date = NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap_or(date);

            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                let quarter = date.month0() / 3 + 1;
                painter.text(
                    Pos2::new(x + 5.0, origin.y + 18.0),
                    egui::Align2::LEFT_CENTER,
                    format!("Q{} {}", quarter, date.year()),
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );

                date = next_month(next_month(next_month(date)));
            }
        }
    }

}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(date + Duration::days(30))
}

fn draw_today_line(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    height: f32,
    today: NaiveDate,
) {
    let x = origin.x + viewport.date_to_x(today);

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}
