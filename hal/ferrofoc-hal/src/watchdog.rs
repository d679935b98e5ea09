//! Independent watchdog abstraction

/// Handle to a running watchdog
///
/// Returned by [`crate::Board::start_watchdog`]. The owner must call
/// [`Watchdog::reset`] more often than the configured timeout, otherwise the
/// MCU is reset. Dropping the handle does not stop the watchdog.
pub trait Watchdog {
    /// Acknowledge the watchdog, restarting its timeout
    fn reset(&mut self);
}
