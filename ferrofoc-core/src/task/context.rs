//! Task context
//!
//! Read-only snapshot a task receives at construction and owns for its
//! whole lifetime. It decouples tasks from the configuration subsystem:
//! parameters may be replaced between tasks, never underneath one.

use ferrofoc_hal::{HardwareVersion, PwmParameters};

use crate::params::{CompleteParameterSet, ValidParameters};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskContext {
    params: CompleteParameterSet,
    hardware_version: HardwareVersion,
}

impl TaskContext {
    /// Build a context from validated parameters
    pub fn new(params: ValidParameters, hardware_version: HardwareVersion) -> Self {
        Self {
            params: params.into_inner(),
            hardware_version,
        }
    }

    pub fn params(&self) -> &CompleteParameterSet {
        &self.params
    }

    /// PWM timing of the board
    pub fn pwm(&self) -> &PwmParameters {
        &self.params.pwm
    }

    pub fn hardware_version(&self) -> HardwareVersion {
        self.hardware_version
    }
}
