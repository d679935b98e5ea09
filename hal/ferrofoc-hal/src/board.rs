//! Board abstraction
//!
//! Everything the controller needs from the board that is not the power
//! stage itself: watchdog arming, fault indication, halting, identity.

use crate::memory::{try_read_signature, MemoryRegion, RegionError};
use crate::watchdog::Watchdog;

/// Size of the unique ID returned by [`Board::read_unique_id`]
pub const UNIQUE_ID_SIZE: usize = 16;

/// Number of unique ID bytes the MCU actually provides; the rest are zero
pub const UNIQUE_ID_HW_BYTES: usize = 12;

/// Size of the provisioned device signature
pub const DEVICE_SIGNATURE_SIZE: usize = 128;

/// Hardware-unique identifier, zero padded
pub type UniqueId = [u8; UNIQUE_ID_SIZE];

/// Provisioned device signature
pub type DeviceSignature = [u8; DEVICE_SIGNATURE_SIZE];

/// Board hardware revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardwareVersion {
    pub major: u8,
    pub minor: u8,
}

/// Board services consumed by the controller
pub trait Board {
    /// Watchdog handle type
    type Watchdog: Watchdog;
    /// Region holding the factory-programmed unique ID
    type IdRegion: MemoryRegion;
    /// Region holding the provisioned device signature
    type SignatureRegion: MemoryRegion;

    /// Arm the independent watchdog
    ///
    /// The returned handle must be kept and serviced within `timeout_ms`.
    fn start_watchdog(&mut self, timeout_ms: u32) -> Self::Watchdog;

    /// Check whether the previous reset was caused by watchdog expiry
    fn watchdog_triggered_last_reset(&self) -> bool;

    /// Bring up the status indicator (LED off afterwards)
    fn init_indicator(&mut self);

    /// Drive the RGB status indicator
    fn set_led_rgb(&mut self, red: u8, green: u8, blue: u8);

    /// Halt the system irrecoverably
    ///
    /// Implementations disable the power stage, report `reason` on the
    /// diagnostic channel and stop servicing the watchdog.
    fn die(&mut self, reason: i32) -> !;

    /// Unconditional system reset
    fn restart(&mut self) -> !;

    /// Hardware revision of this board
    fn hardware_version(&self) -> HardwareVersion;

    /// Accessor for the unique ID region
    fn unique_id_region(&mut self) -> &mut Self::IdRegion;

    /// Accessor for the device signature region
    fn signature_region(&mut self) -> &mut Self::SignatureRegion;

    /// Read the hardware-unique identifier
    fn read_unique_id(&mut self) -> Result<UniqueId, RegionError> {
        let mut id = [0u8; UNIQUE_ID_SIZE];
        self.unique_id_region()
            .read(&mut id[..UNIQUE_ID_HW_BYTES])?;
        Ok(id)
    }

    /// Read the provisioned device signature
    ///
    /// Returns `None` if the signature storage is empty (all `0xFF`/`0x00`).
    fn try_read_device_signature(&mut self) -> Result<Option<DeviceSignature>, RegionError> {
        try_read_signature(self.signature_region())
    }
}
