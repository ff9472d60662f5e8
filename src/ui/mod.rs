pub mod chart;
pub mod detail;
pub mod rows;
pub mod sidebar;
pub mod theme;
pub mod toolbar;
