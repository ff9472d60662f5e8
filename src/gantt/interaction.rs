use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::model::TaskStatus;

/// How long a record stays suppressed after its last drag activity. Chosen to
/// outlast the gesture plumbing's own click handling so the trailing click a
/// release produces is reliably swallowed, and to cover the round trip of the
/// write racing a background refresh.
pub const SUPPRESS_WINDOW: Duration = Duration::from_millis(1000);

/// Interaction state of a single bar, evaluated on read against a supplied
/// `now`. There is no timer; Suppressed simply decays by the passage of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Suppressed { until: Instant },
}

/// Per-record drag suppression. Each bar id carries its own window, so
/// concurrent drags on different bars never cross-suppress: one bar's refresh
/// can apply while another's is still held back.
///
/// Process-local and never persisted. All methods take `now` explicitly so
/// tests control the clock.
#[derive(Debug, Default)]
pub struct DragTracker {
    last_drag: HashMap<String, Instant>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record drag activity on a bar. Called the instant a drag-driven change
    /// begins, on every subsequent drag frame, and on release, so the window
    /// is measured from the last movement rather than the first.
    pub fn touch(&mut self, bar_id: &str, now: Instant) {
        self.last_drag.insert(bar_id.to_string(), now);
        // Opportunistically drop expired entries so the map tracks only
        // recently-dragged bars.
        self.last_drag
            .retain(|_, at| now.saturating_duration_since(*at) < SUPPRESS_WINDOW);
    }

    pub fn state(&self, bar_id: &str, now: Instant) -> GestureState {
        match self.last_drag.get(bar_id) {
            Some(at) if now.saturating_duration_since(*at) < SUPPRESS_WINDOW => {
                GestureState::Suppressed {
                    until: *at + SUPPRESS_WINDOW,
                }
            }
            _ => GestureState::Idle,
        }
    }

    pub fn is_suppressed(&self, bar_id: &str, now: Instant) -> bool {
        matches!(self.state(bar_id, now), GestureState::Suppressed { .. })
    }

    /// Decide whether a click on a bar is the trailing click of a drag
    /// release. A suppressed bar swallows the click and returns to Idle, so a
    /// genuine follow-up click dispatches; an idle bar dispatches directly.
    ///
    /// A real fast second click inside the window is indistinguishable from
    /// the trailing one and is swallowed too — accepted limitation.
    pub fn swallow_click(&mut self, bar_id: &str, now: Instant) -> bool {
        if self.is_suppressed(bar_id, now) {
            self.last_drag.remove(bar_id);
            true
        } else {
            self.last_drag.remove(bar_id);
            false
        }
    }

    /// Apply an incoming refetch to a local collection, keeping the local
    /// (optimistically mutated) version of any record whose bar is still
    /// suppressed. Records present only in the refetch are added; records the
    /// refetch no longer contains are dropped unless suppressed locally.
    ///
    /// Best-effort anti-flicker: if the underlying write failed, the record
    /// reverts on the first refresh after its window expires.
    pub fn merge_refresh<R>(
        &self,
        local: Vec<R>,
        incoming: Vec<R>,
        now: Instant,
        key: impl Fn(&R) -> String,
    ) -> Vec<R> {
        let mut held: HashMap<String, R> = local
            .into_iter()
            .filter(|r| self.is_suppressed(&key(r), now))
            .map(|r| (key(&r), r))
            .collect();

        let mut merged: Vec<R> = incoming
            .into_iter()
            .map(|r| held.remove(&key(&r)).unwrap_or(r))
            .collect();

        // Suppressed records the refetch dropped stay visible for the cycle.
        merged.extend(held.into_values());
        merged
    }
}

/// Map a dragged progress percentage back to a task status. The inverse of
/// the display mapping up to equivalence: Blocked is not recoverable from a
/// percentage alone.
pub fn status_for_progress(progress: u8) -> TaskStatus {
    if progress >= 100 {
        TaskStatus::Completed
    } else if progress > 0 {
        TaskStatus::InProgress
    } else {
        TaskStatus::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gantt::layout::task_progress;

    fn base() -> Instant {
        Instant::now()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn drag_arms_suppression_for_the_full_window() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);

        assert!(tracker.is_suppressed("task-t1", t0));
        assert!(tracker.is_suppressed("task-t1", t0 + ms(999)));
        assert!(!tracker.is_suppressed("task-t1", t0 + ms(1000)));
    }

    #[test]
    fn state_reports_explicit_until() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);

        match tracker.state("task-t1", t0 + ms(10)) {
            GestureState::Suppressed { until } => assert_eq!(until, t0 + SUPPRESS_WINDOW),
            GestureState::Idle => panic!("expected suppression"),
        }
        assert_eq!(tracker.state("task-t1", t0 + ms(1500)), GestureState::Idle);
        assert_eq!(tracker.state("task-other", t0), GestureState::Idle);
    }

    #[test]
    fn trailing_click_is_swallowed_then_next_click_dispatches() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);

        assert!(tracker.swallow_click("task-t1", t0 + ms(50)));
        assert!(!tracker.swallow_click("task-t1", t0 + ms(60)));
    }

    #[test]
    fn click_without_preceding_drag_dispatches() {
        let mut tracker = DragTracker::new();
        assert!(!tracker.swallow_click("task-t1", base()));
    }

    #[test]
    fn click_after_window_expires_dispatches() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);
        assert!(!tracker.swallow_click("task-t1", t0 + ms(1200)));
    }

    #[test]
    fn drags_on_different_bars_do_not_cross_suppress() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);

        assert!(!tracker.is_suppressed("task-t2", t0 + ms(10)));
        assert!(!tracker.is_suppressed("milestone-t1", t0 + ms(10)));
    }

    #[test]
    fn refresh_inside_window_keeps_local_version_of_dragged_record() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);

        // Local reflects the optimistic drag; the refetch is stale.
        let local = vec![("t1", "2024-01-01"), ("t2", "old")];
        let incoming = vec![("t1", "stale"), ("t2", "new")];

        let merged = tracker.merge_refresh(local, incoming, t0 + ms(500), |r| {
            format!("task-{}", r.0)
        });

        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&("t1", "2024-01-01")));
        assert!(merged.contains(&("t2", "new")));
    }

    #[test]
    fn refresh_after_window_applies_everything() {
        let mut tracker = DragTracker::new();
        let t0 = base();
        tracker.touch("task-t1", t0);

        let local = vec![("t1", "optimistic")];
        let incoming = vec![("t1", "server")];
        let merged = tracker.merge_refresh(local, incoming, t0 + ms(1000), |r| {
            format!("task-{}", r.0)
        });
        assert_eq!(merged, vec![("t1", "server")]);
    }

    #[test]
    fn refresh_adds_new_records_and_drops_deleted_ones() {
        let tracker = DragTracker::new();
        let local = vec![("t1", "a")];
        let incoming = vec![("t2", "b")];
        let merged = tracker.merge_refresh(local, incoming, base(), |r| {
            format!("task-{}", r.0)
        });
        assert_eq!(merged, vec![("t2", "b")]);
    }

    #[test]
    fn progress_thresholds_recover_status_equivalence_class() {
        assert_eq!(status_for_progress(100), TaskStatus::Completed);
        assert_eq!(status_for_progress(99), TaskStatus::InProgress);
        assert_eq!(status_for_progress(1), TaskStatus::InProgress);
        assert_eq!(status_for_progress(0), TaskStatus::NotStarted);

        // Round trip status -> percent -> status stays in class; Blocked
        // collapses to InProgress by design.
        for status in TaskStatus::ALL {
            let recovered = status_for_progress(task_progress(status));
            match status {
                TaskStatus::Blocked => assert_eq!(recovered, TaskStatus::InProgress),
                other => assert_eq!(recovered, other),
            }
        }
    }
}
