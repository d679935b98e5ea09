//! Complete parameter set and validation

use ferrofoc_hal::PwmParameters;

use super::types::{ControllerParameters, MotorParameters, ObserverParameters};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound of the postcard-encoded size of a [`CompleteParameterSet`]
pub const MAX_ENCODED_SIZE: usize = 128;

/// Sub-set that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Controller parameters are invalid
    Controller,
    /// Motor parameters are invalid
    Motor,
}

/// Errors from encoding or decoding a stored parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Output buffer too small
    BufferTooSmall,
    /// Stored bytes are truncated or corrupted
    Corrupted,
}

/// Parameters shared by all tasks
///
/// Guaranteed to stay constant while a task is running; it may only be
/// replaced when tasks are switched (e.g. after a configuration update).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompleteParameterSet {
    pub controller: ControllerParameters,
    pub motor: MotorParameters,
    pub observer: ObserverParameters,
    pub pwm: PwmParameters,
}

impl CompleteParameterSet {
    /// Check controller and motor parameters
    ///
    /// Observer and PWM parameters are not checked here.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validate the set, reporting the first failing sub-set
    pub fn validate(&self) -> Result<ValidParameters, ParameterError> {
        if !self.controller.is_valid() {
            return Err(ParameterError::Controller);
        }
        if !self.motor.is_valid() {
            return Err(ParameterError::Motor);
        }
        Ok(ValidParameters(*self))
    }

    /// Encode as postcard into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], PersistError> {
        postcard::to_slice(self, buf).map_err(|_| PersistError::BufferTooSmall)
    }

    /// Decode from postcard bytes
    ///
    /// The result is not validated.
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        postcard::from_bytes(bytes).map_err(|_| PersistError::Corrupted)
    }
}

/// Parameter set that passed [`CompleteParameterSet::validate`]
///
/// Task contexts can only be built from this type, so task constructors
/// never see invalid parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidParameters(CompleteParameterSet);

impl ValidParameters {
    pub fn get(&self) -> &CompleteParameterSet {
        &self.0
    }

    pub fn into_inner(self) -> CompleteParameterSet {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Scalar;

    #[test]
    fn test_default_set_is_valid() {
        let set = CompleteParameterSet::default();
        assert!(set.is_valid());
        assert_eq!(set.validate().unwrap().get(), &set);
    }

    #[test]
    fn test_invalid_controller() {
        let mut set = CompleteParameterSet::default();
        set.controller.current_ramp = -1.0;
        assert!(!set.is_valid());
        assert_eq!(set.validate(), Err(ParameterError::Controller));
    }

    #[test]
    fn test_invalid_motor() {
        let mut set = CompleteParameterSet::default();
        set.motor.num_poles = 3;
        assert!(!set.is_valid());
        assert_eq!(set.validate(), Err(ParameterError::Motor));
    }

    #[test]
    fn test_both_invalid_reports_controller_first() {
        let mut set = CompleteParameterSet::default();
        set.controller.max_current = Scalar::NAN;
        set.motor.field_flux = 0.0;
        assert_eq!(set.validate(), Err(ParameterError::Controller));
    }

    #[test]
    fn test_observer_and_pwm_not_checked() {
        let mut set = CompleteParameterSet::default();
        set.observer.measurement_noise = [-1.0, Scalar::NAN];
        set.pwm.period = 0.0;
        assert!(set.is_valid());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_round_trip() {
        let mut set = CompleteParameterSet::default();
        set.motor.num_poles = 28;
        set.controller.max_current = 35.5;

        let mut buf = [0u8; MAX_ENCODED_SIZE];
        let encoded = set.encode(&mut buf).unwrap();
        assert_eq!(CompleteParameterSet::decode(encoded), Ok(set));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_truncated() {
        let set = CompleteParameterSet::default();
        let mut buf = [0u8; MAX_ENCODED_SIZE];
        let len = set.encode(&mut buf).unwrap().len();

        assert_eq!(
            CompleteParameterSet::decode(&buf[..len / 2]),
            Err(PersistError::Corrupted)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_encode_buffer_too_small() {
        let set = CompleteParameterSet::default();
        let mut buf = [0u8; 8];
        assert_eq!(set.encode(&mut buf), Err(PersistError::BufferTooSmall));
    }
}
