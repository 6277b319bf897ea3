use winery_common::{ExitReport, SupervisorError};

/// Capacity of the notification channel; slow subscribers see `Lagged`.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Notifications published to `Supervisor::subscribe` receivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// A ready service that was meant to keep running exited on its own.
    UnexpectedExit {
        error: SupervisorError,
        exit: ExitReport,
    },
}
