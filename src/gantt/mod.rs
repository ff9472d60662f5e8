//! The timeline scheduling core: pure layout over the task/milestone
//! hierarchy, the drag/click suppression state machine, and viewport
//! geometry. Rendering lives in `crate::ui::chart` on top of these.

pub mod interaction;
pub mod layout;
pub mod viewport;

pub use interaction::{status_for_progress, DragTracker, GestureState, SUPPRESS_WINDOW};
pub use layout::{
    layout_bars, milestone_bar_id, task_bar_id, BarDescriptor, BarKind, BarSource, VisualClass,
};
pub use viewport::{TimelineViewport, ZoomLevel};
