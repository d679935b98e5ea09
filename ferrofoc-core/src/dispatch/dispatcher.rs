//! Dispatcher owning the active task
//!
//! The board glue calls [`Dispatcher::on_slow_tick`] from the supervisory
//! interrupt and [`Dispatcher::on_commutation_step`] from the PWM interrupt,
//! both under the same critical section. The dispatcher:
//!
//! - records the first terminal result and never ticks the task again
//! - forces idle output once the task is terminal
//! - only allows a task switch after a terminal result *and* an idle
//!   commutation step, so a task is never dropped mid-cycle

use ferrofoc_hal::{HardwareVersion, Status};

use super::telemetry::Telemetry;
use crate::math::{Scalar, Vector2};
use crate::params::{CompleteParameterSet, ParameterError};
use crate::task::{CommutationOutput, Task, TaskContext, TaskResult, TaskStatus, NUM_DEBUG_VARIABLES};

/// Reasons a task switch was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchError {
    /// The current task is still running or still driving the power stage
    Busy,
    /// The parameter set failed validation
    InvalidParameters(ParameterError),
}

pub struct Dispatcher<'t, T> {
    task: Option<T>,
    status: TaskStatus,
    quiesced: bool,
    telemetry: &'t Telemetry,
}

impl<'t, T: Task> Dispatcher<'t, T> {
    /// Create an empty dispatcher publishing into `telemetry`
    pub const fn new(telemetry: &'t Telemetry) -> Self {
        Self {
            task: None,
            status: TaskStatus::Running,
            quiesced: true,
            telemetry,
        }
    }

    /// Check whether the slot may be replaced
    pub fn can_switch(&self) -> bool {
        self.task.is_none() || (self.status.is_terminal() && self.quiesced)
    }

    /// Validate `params` and start a new task built from them
    ///
    /// The previous task, if any, is dropped. Fails with
    /// [`SwitchError::Busy`] unless [`Dispatcher::can_switch`] holds.
    pub fn activate<F>(
        &mut self,
        params: &CompleteParameterSet,
        hardware_version: HardwareVersion,
        build: F,
    ) -> Result<(), SwitchError>
    where
        F: FnOnce(TaskContext) -> T,
    {
        if !self.can_switch() {
            return Err(SwitchError::Busy);
        }
        let valid = params.validate().map_err(SwitchError::InvalidParameters)?;

        let task = build(TaskContext::new(valid, hardware_version));

        #[cfg(feature = "defmt")]
        defmt::info!("Task {=str} activated", task.name());

        self.status = TaskStatus::Running;
        self.quiesced = false;
        self.telemetry.publish(Some(self.status), &task.debug_variables());
        self.telemetry.count_switch();
        self.task = Some(task);
        Ok(())
    }

    /// Remove the terminated task, leaving the slot empty
    pub fn release(&mut self) -> Result<Option<T>, SwitchError> {
        if !self.can_switch() {
            return Err(SwitchError::Busy);
        }
        self.telemetry.publish(None, &[0.0; NUM_DEBUG_VARIABLES]);
        Ok(self.task.take())
    }

    /// Supervisory tick
    ///
    /// Returns the task's result, or `None` if there is no task or it has
    /// already terminated.
    pub fn on_slow_tick(&mut self, period: Scalar, hw_status: &Status) -> Option<TaskResult> {
        self.telemetry.count_slow_tick();

        if self.status.is_terminal() {
            return None;
        }
        let task = self.task.as_mut()?;

        let result = task.on_slow_tick(period, hw_status);
        self.status = self.status.after(result);

        match result {
            TaskResult::Failure(_code) => {
                self.telemetry.count_failure();
                #[cfg(feature = "defmt")]
                defmt::warn!("Task {=str} failed with exit code {}", task.name(), _code);
            }
            TaskResult::Success => {
                #[cfg(feature = "defmt")]
                defmt::info!("Task {=str} finished", task.name());
            }
            TaskResult::InProgress => {}
        }

        self.telemetry.publish(Some(self.status), &task.debug_variables());
        Some(result)
    }

    /// Commutation step
    ///
    /// The task is only called while it is running; otherwise the output is
    /// forced idle.
    pub fn on_commutation_step(&mut self, phase_currents_ab: &Vector2, inverter_voltage: Scalar) -> CommutationOutput {
        self.telemetry.count_commutation_step();

        let out = match self.task.as_mut() {
            Some(task) if !self.status.is_terminal() => {
                task.on_commutation_step(phase_currents_ab, inverter_voltage)
            }
            _ => CommutationOutput::idle(),
        };

        self.quiesced = !out.active;
        out
    }

    /// Status of the active task as seen by the dispatcher
    pub fn status(&self) -> Option<TaskStatus> {
        self.task.as_ref().map(|_| self.status)
    }

    pub fn task_name(&self) -> Option<&'static str> {
        self.task.as_ref().map(|t| t.name())
    }

    pub fn task(&self) -> Option<&T> {
        self.task.as_ref()
    }

    /// Mutable access to the active task, for task-specific requests
    ///
    /// Lifecycle changes still only take effect through the next
    /// supervisory tick.
    pub fn task_mut(&mut self) -> Option<&mut T> {
        self.task.as_mut()
    }

    pub fn telemetry(&self) -> &'t Telemetry {
        self.telemetry
    }
}
