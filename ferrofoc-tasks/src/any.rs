//! Closed set of tasks
//!
//! The firmware stores one `AnyTask` in the dispatcher slot; every callback
//! is a `match`, no vtables and no allocation.

use ferrofoc_core::math::{Scalar, Vector2};
use ferrofoc_core::task::{CommutationOutput, DebugVariables, Task, TaskResult, TaskStatus};
use ferrofoc_hal::Status;

use crate::beeping::BeepingTask;
use crate::idle::IdleTask;

pub enum AnyTask {
    Beeping(BeepingTask),
    Idle(IdleTask),
}

impl From<BeepingTask> for AnyTask {
    fn from(task: BeepingTask) -> Self {
        AnyTask::Beeping(task)
    }
}

impl From<IdleTask> for AnyTask {
    fn from(task: IdleTask) -> Self {
        AnyTask::Idle(task)
    }
}

macro_rules! dispatch {
    ($self:expr, $task:ident => $body:expr) => {
        match $self {
            AnyTask::Beeping($task) => $body,
            AnyTask::Idle($task) => $body,
        }
    };
}

impl Task for AnyTask {
    fn name(&self) -> &'static str {
        dispatch!(self, t => t.name())
    }

    fn on_slow_tick(&mut self, period: Scalar, hw_status: &Status) -> TaskResult {
        dispatch!(self, t => t.on_slow_tick(period, hw_status))
    }

    fn on_commutation_step(&mut self, phase_currents_ab: &Vector2, inverter_voltage: Scalar) -> CommutationOutput {
        dispatch!(self, t => t.on_commutation_step(phase_currents_ab, inverter_voltage))
    }

    fn status(&self) -> TaskStatus {
        dispatch!(self, t => t.status())
    }

    fn debug_variables(&self) -> DebugVariables {
        dispatch!(self, t => t.debug_variables())
    }
}
