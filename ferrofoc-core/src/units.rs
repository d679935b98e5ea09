//! Physical unit conversions
//!
//! Used to parameterize control laws from datasheet values. Every fallible
//! conversion checks its preconditions and returns
//! [`ConversionError::InvalidArgument`] instead of a meaningless number.

use crate::math::{Scalar, PI, SQRT_3};

/// Errors from unit conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionError {
    /// An argument violates the conversion's precondition
    InvalidArgument,
}

fn check_num_poles(num_poles: u32) -> Result<Scalar, ConversionError> {
    if num_poles >= 2 && num_poles % 2 == 0 {
        Ok(num_poles as Scalar)
    } else {
        Err(ConversionError::InvalidArgument)
    }
}

fn check_positive(x: Scalar) -> Result<Scalar, ConversionError> {
    // NaN fails this comparison as well
    if x > 0.0 {
        Ok(x)
    } else {
        Err(ConversionError::InvalidArgument)
    }
}

/// Convert field flux linkage to the velocity constant
///
/// # Arguments
/// - `flux_linkage`: Weber, positive
/// - `num_poles`: number of rotor magnetic poles, even, at least 2
///
/// # Returns
/// KV in mechanical RPM per Volt.
pub fn flux_linkage_to_kv(flux_linkage: Scalar, num_poles: u32) -> Result<Scalar, ConversionError> {
    let flux_linkage = check_positive(flux_linkage)?;
    let num_poles = check_num_poles(num_poles)?;
    Ok((20.0 * SQRT_3) / (PI * flux_linkage * num_poles))
}

/// Convert the velocity constant to field flux linkage
///
/// # Arguments
/// - `kv`: mechanical RPM per Volt, positive
/// - `num_poles`: number of rotor magnetic poles, even, at least 2
///
/// # Returns
/// Flux linkage in Weber.
pub fn kv_to_flux_linkage(kv: Scalar, num_poles: u32) -> Result<Scalar, ConversionError> {
    let kv = check_positive(kv)?;
    let num_poles = check_num_poles(num_poles)?;
    Ok((20.0 * SQRT_3) / (PI * kv * num_poles))
}

/// Convert angular velocity in rad/s to revolutions per minute
///
/// Equally applicable to electrical and mechanical angular velocity.
pub fn angular_velocity_to_rpm(radian_per_sec: Scalar) -> Scalar {
    (radian_per_sec * 60.0) / (PI * 2.0)
}

/// Scale an electrical rotation rate to the mechanical one
///
/// Works with any rate unit (rad/s, RPM, Hz); the result is in the same unit.
pub fn rotation_rate_electrical_to_mechanical(
    rate: Scalar,
    num_poles: u32,
) -> Result<Scalar, ConversionError> {
    check_num_poles(num_poles)?;
    Ok(rate / (num_poles / 2) as Scalar)
}
