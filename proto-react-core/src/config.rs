//! Renderer configuration.

use core::time::Duration;

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Yield once the deadline has less than this much time left.
    pub yield_threshold: Duration,
    /// Hard cap on units of work per step, on top of the deadline.
    pub max_units_per_step: Option<usize>,
    /// Release DOM nodes created by a work-in-progress tree that gets
    /// replaced before it commits.
    pub dispose_abandoned_nodes: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_units_per_step: None,
            dispose_abandoned_nodes: true,
        }
    }
}
