use chrono::{Duration, NaiveDate};

use super::layout::BarDescriptor;

/// Horizontal padding the scroll viewport keeps around the columns.
const VIEWPORT_PADDING: f32 = 20.0;
/// Leading margin when scrolling today's column into view.
const TODAY_SCROLL_MARGIN: f32 = 100.0;
/// Leading margin when scrolling the earliest bar into view.
const FIRST_BAR_SCROLL_MARGIN: f32 = 50.0;

/// Time-axis granularity. Each level targets a fixed number of visible
/// columns and clamps to a per-level minimum so labels stay legible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomLevel {
    Day,
    Week,
    Month,
    Quarter,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 4] = [
        ZoomLevel::Day,
        ZoomLevel::Week,
        ZoomLevel::Month,
        ZoomLevel::Quarter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ZoomLevel::Day => "Day",
            ZoomLevel::Week => "Week",
            ZoomLevel::Month => "Month",
            ZoomLevel::Quarter => "Quarter",
        }
    }

    /// Target number of columns visible in the viewport at once.
    pub fn visible_columns(self) -> u32 {
        match self {
            ZoomLevel::Day => 60,
            ZoomLevel::Week => 12,
            ZoomLevel::Month => 6,
            ZoomLevel::Quarter => 4,
        }
    }

    /// Narrowest a column may get, in pixels.
    pub fn min_column_width(self) -> f32 {
        match self {
            ZoomLevel::Day => 30.0,
            ZoomLevel::Week => 80.0,
            ZoomLevel::Month | ZoomLevel::Quarter => 120.0,
        }
    }

    /// Days spanned by one column. Month and Quarter use a uniform day scale
    /// for bar geometry; the header still labels real calendar boundaries.
    pub fn days_per_column(self) -> i64 {
        match self {
            ZoomLevel::Day => 1,
            ZoomLevel::Week => 7,
            ZoomLevel::Month => 30,
            ZoomLevel::Quarter => 91,
        }
    }
}

/// Tracks the laid-out date range, the active zoom level, and the measured
/// container width, and turns them into pixel geometry. Re-measuring the
/// container only changes the derived column width; it never resets scroll
/// position or zoom.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// Leftmost laid-out date.
    pub start: NaiveDate,
    /// Rightmost laid-out date.
    pub end: NaiveDate,
    pub zoom: ZoomLevel,
    container_width: f32,
    /// One-shot scroll offset the chart applies on its next frame.
    pub pending_scroll: Option<f32>,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: end.max(start),
            zoom: ZoomLevel::Week,
            container_width: 0.0,
            pending_scroll: None,
        }
    }

    /// Record the measured width of the scrollable viewport. Called every
    /// frame; cheap, and a changed width only affects column width.
    pub fn set_container_width(&mut self, width: f32) {
        self.container_width = width;
    }

    /// Column width for the active zoom level: the container divided into the
    /// level's target column count, floored to whole pixels and clamped to
    /// the level's minimum. Before the first measurement the minimum is used.
    pub fn column_width(&self) -> f32 {
        let min = self.zoom.min_column_width();
        if self.container_width <= 0.0 {
            return min;
        }
        let columns = self.zoom.visible_columns() as f32;
        min.max(((self.container_width - VIEWPORT_PADDING) / columns).floor())
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.column_width() / self.zoom.days_per_column() as f32
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        let days = (date - self.start).num_days() as f32;
        days * self.pixels_per_day()
    }

    /// Convert an x-pixel offset back to a date.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        let days = (x / self.pixels_per_day()).round() as i64;
        self.start + Duration::days(days)
    }

    /// Total width in pixels for the laid-out range.
    pub fn total_width(&self) -> f32 {
        self.date_to_x(self.end)
    }

    pub fn zoom_in(&mut self) {
        self.zoom = match self.zoom {
            ZoomLevel::Quarter => ZoomLevel::Month,
            ZoomLevel::Month => ZoomLevel::Week,
            ZoomLevel::Week | ZoomLevel::Day => ZoomLevel::Day,
        };
    }

    pub fn zoom_out(&mut self) {
        self.zoom = match self.zoom {
            ZoomLevel::Day => ZoomLevel::Week,
            ZoomLevel::Week => ZoomLevel::Month,
            ZoomLevel::Month | ZoomLevel::Quarter => ZoomLevel::Quarter,
        };
    }

    /// Refit the laid-out range around the current bars, with lead-in/out
    /// margins, always keeping today inside the range. Called when the data
    /// changes, not per frame, so the x-mapping stays stable while scrolling.
    pub fn fit_range(&mut self, bars: &[BarDescriptor], today: NaiveDate) {
        let min = bars.iter().map(|b| b.start).min().unwrap_or(today);
        let max = bars.iter().map(|b| b.end).max().unwrap_or(today);
        self.start = min.min(today) - Duration::days(7);
        self.end = max.max(today) + Duration::days(30);
    }

    /// Offset that brings `date`'s column into view with a leading margin, or
    /// `None` when the date lies outside the laid-out range.
    pub fn scroll_target_for_date(&self, date: NaiveDate) -> Option<f32> {
        if date < self.start || date > self.end {
            return None;
        }
        Some((self.date_to_x(date) - TODAY_SCROLL_MARGIN).max(0.0))
    }

    /// Offset that brings the earliest-starting bar into view, or `None` for
    /// an empty dataset.
    pub fn scroll_target_for_first(&self, bars: &[BarDescriptor]) -> Option<f32> {
        let first = bars.iter().map(|b| b.start).min()?;
        Some((self.date_to_x(first) - FIRST_BAR_SCROLL_MARGIN).max(0.0))
    }

    /// Queue a "scroll to today" navigation; out-of-range dates are a no-op.
    pub fn request_scroll_to_date(&mut self, date: NaiveDate) {
        if let Some(target) = self.scroll_target_for_date(date) {
            self.pending_scroll = Some(target);
        }
    }

    /// Queue a "scroll to first item" navigation; empty data is a no-op.
    pub fn request_scroll_to_first(&mut self, bars: &[BarDescriptor]) {
        if let Some(target) = self.scroll_target_for_first(bars) {
            self.pending_scroll = Some(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn viewport(width: f32, zoom: ZoomLevel) -> TimelineViewport {
        let mut vp = TimelineViewport::new(day(2024, 1, 1), day(2024, 12, 31));
        vp.zoom = zoom;
        vp.set_container_width(width);
        vp
    }

    #[test]
    fn column_width_divides_container_into_level_columns() {
        // 1220px - 20 padding over 12 week columns = 100px.
        let vp = viewport(1220.0, ZoomLevel::Week);
        assert_eq!(vp.column_width(), 100.0);
    }

    #[test]
    fn column_width_clamps_to_level_minimum() {
        assert_eq!(viewport(200.0, ZoomLevel::Day).column_width(), 30.0);
        assert_eq!(viewport(200.0, ZoomLevel::Week).column_width(), 80.0);
        assert_eq!(viewport(200.0, ZoomLevel::Month).column_width(), 120.0);
        assert_eq!(viewport(200.0, ZoomLevel::Quarter).column_width(), 120.0);
    }

    #[test]
    fn unmeasured_container_uses_level_minimum() {
        let mut vp = TimelineViewport::new(day(2024, 1, 1), day(2024, 2, 1));
        vp.zoom = ZoomLevel::Week;
        assert_eq!(vp.column_width(), 80.0);
    }

    #[test]
    fn date_x_mapping_round_trips() {
        let vp = viewport(1220.0, ZoomLevel::Week);
        let date = day(2024, 6, 15);
        assert_eq!(vp.x_to_date(vp.date_to_x(date)), date);
        assert_eq!(vp.date_to_x(vp.start), 0.0);
    }

    #[test]
    fn zoom_steps_clamp_at_the_ends() {
        let mut vp = viewport(800.0, ZoomLevel::Day);
        vp.zoom_in();
        assert_eq!(vp.zoom, ZoomLevel::Day);
        vp.zoom_out();
        assert_eq!(vp.zoom, ZoomLevel::Week);
        vp.zoom = ZoomLevel::Quarter;
        vp.zoom_out();
        assert_eq!(vp.zoom, ZoomLevel::Quarter);
    }

    #[test]
    fn resize_does_not_touch_zoom_or_pending_scroll() {
        let mut vp = viewport(800.0, ZoomLevel::Month);
        vp.pending_scroll = Some(240.0);
        vp.set_container_width(1400.0);
        assert_eq!(vp.zoom, ZoomLevel::Month);
        assert_eq!(vp.pending_scroll, Some(240.0));
    }

    #[test]
    fn scroll_to_date_outside_range_is_a_noop() {
        let mut vp = viewport(1220.0, ZoomLevel::Week);
        vp.request_scroll_to_date(day(2030, 1, 1));
        assert_eq!(vp.pending_scroll, None);

        vp.request_scroll_to_date(day(2024, 6, 1));
        assert!(vp.pending_scroll.is_some());
    }

    #[test]
    fn scroll_to_first_on_empty_data_is_a_noop() {
        let mut vp = viewport(1220.0, ZoomLevel::Week);
        vp.request_scroll_to_first(&[]);
        assert_eq!(vp.pending_scroll, None);
    }

    #[test]
    fn scroll_targets_clamp_to_origin() {
        let vp = viewport(1220.0, ZoomLevel::Week);
        // Start-of-range dates would scroll negative without the clamp.
        assert_eq!(vp.scroll_target_for_date(vp.start), Some(0.0));
    }

    proptest! {
        /// Wider containers never shrink columns, the minimum always holds,
        /// and above the clamp the width tracks the container proportionally.
        #[test]
        fn column_width_is_monotonic_and_clamped(
            w1 in 0.0f32..4000.0,
            w2 in 0.0f32..4000.0,
            zoom_idx in 0usize..4,
        ) {
            let zoom = ZoomLevel::ALL[zoom_idx];
            let (lo, hi) = if w1 <= w2 { (w1, w2) } else { (w2, w1) };
            let narrow = viewport(lo, zoom);
            let wide = viewport(hi, zoom);

            prop_assert!(narrow.column_width() >= zoom.min_column_width());
            prop_assert!(wide.column_width() >= narrow.column_width());

            let expected = ((hi - 20.0) / zoom.visible_columns() as f32).floor();
            if expected >= zoom.min_column_width() {
                prop_assert_eq!(wide.column_width(), expected);
            }
        }
    }
}
