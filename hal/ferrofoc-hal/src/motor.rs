//! Power stage status and PWM timing
//!
//! Both types are plain values: the status is sampled by the board once per
//! supervisory tick and handed to the active task by reference; the PWM
//! parameters are fixed at bring-up and copied into every task context.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Snapshot of the power stage, sampled once per supervisory tick
///
/// Tasks must not retain it beyond the call it was passed to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Supply voltage is within the operating range and the gate driver is ready
    pub power_ok: bool,
    /// Gate driver reported an overcurrent condition
    pub overload: bool,
    /// Gate driver reported a fault (undervoltage lockout, overtemperature)
    pub fault: bool,
    /// Power stage temperature in Kelvin
    pub inverter_temperature: f32,
    /// DC link voltage in Volts
    pub inverter_voltage: f32,
}

impl Status {
    /// Status of a healthy, powered stage
    pub const fn nominal(inverter_voltage: f32) -> Self {
        Self {
            power_ok: true,
            overload: false,
            fault: false,
            inverter_temperature: 300.0,
            inverter_voltage,
        }
    }

    /// Status of an unpowered stage
    pub const fn unpowered() -> Self {
        Self {
            power_ok: false,
            overload: false,
            fault: false,
            inverter_temperature: 300.0,
            inverter_voltage: 0.0,
        }
    }
}

/// PWM timing, fixed after board bring-up
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PwmParameters {
    /// PWM period in seconds (the commutation step interval)
    pub period: f32,
    /// Gate driver dead time in seconds
    pub dead_time: f32,
    /// Maximum normalized duty cycle the bootstrap circuit tolerates
    pub upper_limit: f32,
}

impl PwmParameters {
    /// PWM frequency in Hertz
    pub fn frequency(&self) -> f32 {
        1.0 / self.period
    }
}

impl Default for PwmParameters {
    fn default() -> Self {
        Self {
            period: 100e-6,
            dead_time: 500e-9,
            upper_limit: 0.95,
        }
    }
}
