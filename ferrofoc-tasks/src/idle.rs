//! Idle task
//!
//! Occupies the dispatcher slot while nothing else runs. The bridge stays
//! released. The task only ends when asked to via [`IdleTask::request_stop`],
//! and then through the regular supervisory tick, so switching away from it
//! follows the same path as any other task.

use ferrofoc_core::math::{Scalar, Vector2};
use ferrofoc_core::task::{CommutationOutput, DebugVariables, Task, TaskContext, TaskResult, TaskStatus};
use ferrofoc_hal::Status;

pub struct IdleTask {
    context: TaskContext,
    uptime: Scalar,
    last_inverter_voltage: Scalar,
    stop_requested: bool,
    status: TaskStatus,
}

impl IdleTask {
    pub fn new(context: TaskContext) -> Self {
        Self {
            context,
            uptime: 0.0,
            last_inverter_voltage: 0.0,
            stop_requested: false,
            status: TaskStatus::Running,
        }
    }

    /// Finish on the next supervisory tick
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Accumulated supervisory time in seconds
    pub fn uptime(&self) -> Scalar {
        self.uptime
    }
}

impl Task for IdleTask {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn on_slow_tick(&mut self, period: Scalar, _hw_status: &Status) -> TaskResult {
        self.uptime += period;

        let result = if self.stop_requested {
            TaskResult::success()
        } else {
            TaskResult::in_progress()
        };
        self.status = self.status.after(result);
        result
    }

    fn on_commutation_step(&mut self, _phase_currents_ab: &Vector2, inverter_voltage: Scalar) -> CommutationOutput {
        self.last_inverter_voltage = inverter_voltage;
        CommutationOutput::idle()
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn debug_variables(&self) -> DebugVariables {
        [
            self.uptime,
            self.last_inverter_voltage,
            self.context.pwm().period,
            0.0,
            0.0,
            0.0,
            0.0,
        ]
    }
}
