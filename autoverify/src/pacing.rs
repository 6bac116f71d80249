use std::time::Duration;

/// Fixed pacing delays applied around interactions.
///
/// These are empirical constants, not condition-based waits: they exist to
/// let the UI's own asynchronous rendering catch up between operations and
/// never fail on their own. The one true bounded wait in the system is
/// [`Locator::wait`](crate::Locator::wait).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Simulated pointer travel before hovering a target. Default 300 ms.
    pub movement: Duration,
    /// Pause between hover and click. Default 150 ms.
    pub pre_click: Duration,
    /// Per-character typing cadence. Default 45 ms.
    pub typing: Duration,
    /// Settle delay after state-changing operations. Default 800 ms.
    pub settle: Duration,
}

impl Pacing {
    /// All delays zeroed; used by tests so runs complete instantly.
    pub fn instant() -> Self {
        Self {
            movement: Duration::ZERO,
            pre_click: Duration::ZERO,
            typing: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            movement: Duration::from_millis(300),
            pre_click: Duration::from_millis(150),
            typing: Duration::from_millis(45),
            settle: Duration::from_millis(800),
        }
    }
}
