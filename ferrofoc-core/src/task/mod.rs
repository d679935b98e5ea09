//! Task contract
//!
//! Every control algorithm (current loop, identification, calibration,
//! diagnostics) is a task. The dispatcher drives the active task from two
//! interrupt contexts:
//!
//! - [`Task::on_slow_tick`] from the supervisory interrupt, at a comparatively
//!   low rate. This is where the task decides its lifecycle.
//! - [`Task::on_commutation_step`] from the PWM interrupt, once per PWM period.
//!   This is the hot path.
//!
//! Neither callback may block, allocate or run for an unbounded time.
//!
//! # Lifecycle
//!
//! ```text
//! Constructed ──► Running ──► Finished
//!                    │
//!                    └──────► Failed(code)
//! ```
//!
//! A terminal status is only ever reached through the return value of
//! `on_slow_tick`. From then on the commutation output is idle.

pub mod context;
pub mod result;

pub use context::TaskContext;
pub use result::{ExitCode, TaskResult, TaskStatus};

use ferrofoc_hal::Status;

use crate::math::{Scalar, Vector2, Vector3};

/// Number of scalars exposed by [`Task::debug_variables`]
pub const NUM_DEBUG_VARIABLES: usize = 7;

/// Task-defined diagnostic values
pub type DebugVariables = [Scalar; NUM_DEBUG_VARIABLES];

/// Output of one commutation step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommutationOutput {
    /// Per-phase normalized command
    pub output: Vector3,
    /// Keep the power stage actively driven this cycle
    ///
    /// When false the driver may leave the bridge high impedance.
    pub active: bool,
}

impl CommutationOutput {
    /// Zero output, power stage released
    pub const fn idle() -> Self {
        Self {
            output: [0.0; 3],
            active: false,
        }
    }

    /// Zero output with the power stage kept active
    pub const fn hold() -> Self {
        Self {
            output: [0.0; 3],
            active: true,
        }
    }

    /// Drive the given per-phase command
    pub const fn drive(output: Vector3) -> Self {
        Self {
            output,
            active: true,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.output.iter().all(|&x| x == 0.0)
    }
}

/// Contract implemented by every control task
///
/// The dispatcher serializes the two callbacks: the supervisory tick runs
/// with the commutation interrupt masked, so it must finish well within one
/// PWM period. State shared by both callbacks is then plain task state.
pub trait Task {
    /// Static identity, for diagnostics
    fn name(&self) -> &'static str;

    /// Supervisory tick
    ///
    /// # Arguments
    /// - `period`: seconds since the previous tick, positive
    /// - `hw_status`: power stage snapshot, valid for this call only
    ///
    /// Returns `Failure` as soon as a safety precondition is violated,
    /// `Success` when the goal is reached, `InProgress` otherwise.
    fn on_slow_tick(&mut self, period: Scalar, hw_status: &Status) -> TaskResult;

    /// Commutation step, once per PWM period
    ///
    /// # Arguments
    /// - `phase_currents_ab`: measured currents in the stationary frame (A)
    /// - `inverter_voltage`: DC link voltage (V)
    fn on_commutation_step(&mut self, phase_currents_ab: &Vector2, inverter_voltage: Scalar) -> CommutationOutput;

    /// Current lifecycle status
    fn status(&self) -> TaskStatus;

    /// Task-defined diagnostic values
    fn debug_variables(&self) -> DebugVariables;
}
