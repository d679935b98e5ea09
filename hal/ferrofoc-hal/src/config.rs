//! Configuration storage abstraction
//!
//! The configuration subsystem owns the backing store for the motor
//! parameter set. Only its initialization outcome is visible here; loading
//! and decoding the parameters is up to the implementation.

/// Outcome of configuration initialization
///
/// Non-negative values are implementation-defined success codes (for example
/// the number of entries restored). Negative values are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigStatus(pub i32);

impl ConfigStatus {
    /// Storage initialized, nothing to report
    pub const OK: Self = Self(0);

    /// Check whether initialization failed irrecoverably
    pub fn is_fatal(self) -> bool {
        self.0 < 0
    }

    /// Raw status code
    pub fn code(self) -> i32 {
        self.0
    }
}

/// Configuration backing store
pub trait ConfigStorage {
    /// Initialize the store and restore persisted values
    fn init(&mut self) -> ConfigStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_is_fatal() {
        assert!(ConfigStatus(-5).is_fatal());
        assert!(!ConfigStatus::OK.is_fatal());
        assert!(!ConfigStatus(12).is_fatal());
    }
}
