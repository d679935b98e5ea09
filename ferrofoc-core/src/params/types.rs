//! Parameter sub-sets
//!
//! Each struct groups the parameters of one concern. Controller and motor
//! parameters carry their own validity predicate; observer parameters are
//! validated by whoever produces them.

use crate::math::{Range, Scalar};
use crate::units::{self, ConversionError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Allowed range for the voltage modulation limit
const MODULATION_LIMIT_RANGE: Range = Range::new(Scalar::MIN_POSITIVE, 1.0);

/// Current and modulation limits of the control loop
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerParameters {
    /// Maximum phase current magnitude (A)
    pub max_current: Scalar,
    /// Minimum phase current magnitude that keeps the observer converged (A)
    pub min_current: Scalar,
    /// Current used while spinning up from standstill (A)
    pub spinup_current: Scalar,
    /// Maximum rate of change of the current setpoint (A/s)
    pub current_ramp: Scalar,
    /// Fraction of the DC link voltage the modulator may use, (0, 1]
    pub voltage_modulation_limit: Scalar,
}

impl Default for ControllerParameters {
    fn default() -> Self {
        Self {
            max_current: 20.0,
            min_current: 0.5,
            spinup_current: 5.0,
            current_ramp: 100.0,
            voltage_modulation_limit: 0.9,
        }
    }
}

impl ControllerParameters {
    pub fn is_valid(&self) -> bool {
        let finite = self.max_current.is_finite()
            && self.min_current.is_finite()
            && self.spinup_current.is_finite()
            && self.current_ramp.is_finite();

        finite
            && self.min_current >= 0.0
            && self.min_current < self.max_current
            && Range::new(self.min_current, self.max_current).contains(self.spinup_current)
            && self.current_ramp > 0.0
            && MODULATION_LIMIT_RANGE.contains(self.voltage_modulation_limit)
    }
}

/// Electrical model of the motor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorParameters {
    /// Number of rotor magnetic poles (even, at least 2)
    pub num_poles: u32,
    /// Phase resistance (Ohm)
    pub phase_resistance: Scalar,
    /// Phase inductance along the d and q axes (H)
    pub phase_inductance_dq: [Scalar; 2],
    /// Rotor field flux linkage (Wb)
    pub field_flux: Scalar,
    /// Maximum continuous phase current (A)
    pub max_current: Scalar,
    /// Minimum phase current for reliable rotation (A)
    pub min_current: Scalar,
    /// Rated phase voltage (V)
    pub rated_voltage: Scalar,
}

impl Default for MotorParameters {
    fn default() -> Self {
        Self {
            num_poles: 14,
            phase_resistance: 0.05,
            phase_inductance_dq: [20e-6, 20e-6],
            field_flux: 1.5e-3,
            max_current: 20.0,
            min_current: 0.5,
            rated_voltage: 24.0,
        }
    }
}

impl MotorParameters {
    pub fn is_valid(&self) -> bool {
        let positive = |x: Scalar| x.is_finite() && x > 0.0;

        self.num_poles >= 2
            && self.num_poles % 2 == 0
            && positive(self.phase_resistance)
            && self.phase_inductance_dq.iter().all(|&l| positive(l))
            && positive(self.field_flux)
            && positive(self.max_current)
            && self.min_current.is_finite()
            && self.min_current >= 0.0
            && self.min_current < self.max_current
            && positive(self.rated_voltage)
    }

    /// Velocity constant derived from the field flux (mechanical RPM/V)
    pub fn kv(&self) -> Result<Scalar, ConversionError> {
        units::flux_linkage_to_kv(self.field_flux, self.num_poles)
    }

    /// Number of pole pairs
    pub fn pole_pairs(&self) -> u32 {
        self.num_poles / 2
    }
}

/// Tuning of the state observer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObserverParameters {
    /// Process noise covariance diagonal (current d, current q, angular velocity)
    pub process_noise: [Scalar; 3],
    /// Measurement noise covariance diagonal (current alpha, current beta)
    pub measurement_noise: [Scalar; 2],
    /// Gain of the d/q cross coupling compensation
    pub cross_coupling_compensation: Scalar,
}

impl Default for ObserverParameters {
    fn default() -> Self {
        Self {
            process_noise: [3000.0, 3000.0, 3e8],
            measurement_noise: [2.0, 2.0],
            cross_coupling_compensation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ControllerParameters::default().is_valid());
        assert!(MotorParameters::default().is_valid());
    }

    #[test]
    fn test_controller_current_order() {
        let mut p = ControllerParameters::default();
        p.min_current = p.max_current;
        assert!(!p.is_valid());

        let mut p = ControllerParameters::default();
        p.spinup_current = p.max_current + 1.0;
        assert!(!p.is_valid());

        let mut p = ControllerParameters::default();
        p.current_ramp = 0.0;
        assert!(!p.is_valid());
    }

    #[test]
    fn test_controller_modulation_limit() {
        let mut p = ControllerParameters::default();
        p.voltage_modulation_limit = 1.0;
        assert!(p.is_valid());
        p.voltage_modulation_limit = 0.0;
        assert!(!p.is_valid());
        p.voltage_modulation_limit = 1.1;
        assert!(!p.is_valid());
    }

    #[test]
    fn test_motor_rejects_odd_poles() {
        let mut p = MotorParameters::default();
        p.num_poles = 13;
        assert!(!p.is_valid());
        p.num_poles = 0;
        assert!(!p.is_valid());
    }

    #[test]
    fn test_motor_rejects_non_physical_values() {
        let mut p = MotorParameters::default();
        p.phase_inductance_dq[1] = 0.0;
        assert!(!p.is_valid());

        let mut p = MotorParameters::default();
        p.field_flux = Scalar::NAN;
        assert!(!p.is_valid());

        let mut p = MotorParameters::default();
        p.phase_resistance = -0.1;
        assert!(!p.is_valid());
    }

    #[test]
    fn test_motor_kv() {
        let p = MotorParameters::default();
        assert_eq!(p.pole_pairs(), 7);
        assert!((p.kv().unwrap() - 525.07).abs() < 0.1);
    }
}
