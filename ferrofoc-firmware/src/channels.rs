//! State shared between execution contexts
//!
//! - [`TELEMETRY`] is written by the dispatcher under the drive lock and read
//!   lock-free from thread mode
//! - [`TASK_REQUEST`] carries task requests from thread mode to the
//!   supervisor

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use ferrofoc_core::math::Scalar;
use ferrofoc_core::Telemetry;

/// Mirror of the active task for diagnostics
pub static TELEMETRY: Telemetry = Telemetry::new();

/// Task the supervisor should start next
///
/// Only the latest request is kept.
pub static TASK_REQUEST: Signal<CriticalSectionRawMutex, TaskRequest> = Signal::new();

#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum TaskRequest {
    /// Audible excitation, see `ferrofoc_tasks::BeepingTask`
    Beep { frequency: Scalar, duration: Scalar },
}
