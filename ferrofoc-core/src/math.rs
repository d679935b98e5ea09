//! Scalar and vector primitives

/// Scalar type used by all control code
pub type Scalar = f32;

/// Two-axis quantity (e.g. Clarke-transformed phase currents)
pub type Vector2 = [Scalar; 2];

/// Three-phase quantity (e.g. per-phase duty commands)
pub type Vector3 = [Scalar; 3];

pub const PI: Scalar = core::f32::consts::PI;

pub const SQRT_3: Scalar = 1.732_050_8;

/// Closed interval used to bound physical parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Range {
    pub min: Scalar,
    pub max: Scalar,
}

impl Range {
    pub const fn new(min: Scalar, max: Scalar) -> Self {
        Self { min, max }
    }

    /// Clamp `x` into the range
    ///
    /// NaN is mapped to the lower bound so the result is always in range.
    pub fn constrain(&self, x: Scalar) -> Scalar {
        if x.is_nan() || x < self.min {
            self.min
        } else if x > self.max {
            self.max
        } else {
            x
        }
    }

    pub fn contains(&self, x: Scalar) -> bool {
        x >= self.min && x <= self.max
    }
}

/// Clarke transform of two measured phase currents
///
/// Assumes a balanced three-phase system (`a + b + c = 0`), so the third
/// phase need not be measured.
pub fn clarke(a: Scalar, b: Scalar) -> Vector2 {
    [a, (a + 2.0 * b) / SQRT_3]
}
