//! Host-side board double for unit tests

use crate::board::{Board, HardwareVersion, DEVICE_SIGNATURE_SIZE, UNIQUE_ID_HW_BYTES};
use crate::memory::{MemoryRegion, RegionError};
use crate::watchdog::Watchdog;

pub struct ArrayRegion<const N: usize> {
    pub bytes: [u8; N],
}

impl<const N: usize> MemoryRegion for ArrayRegion<N> {
    fn size(&self) -> usize {
        N
    }

    fn read(&mut self, out: &mut [u8]) -> Result<(), RegionError> {
        let src = self.bytes.get(..out.len()).ok_or(RegionError::OutOfBounds)?;
        out.copy_from_slice(src);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockWatchdog {
    pub timeout_ms: u32,
    pub resets: u32,
}

impl Watchdog for MockWatchdog {
    fn reset(&mut self) {
        self.resets += 1;
    }
}

pub struct MockBoard {
    pub uid: [u8; UNIQUE_ID_HW_BYTES],
    pub signature: [u8; DEVICE_SIGNATURE_SIZE],
    pub watchdog_reset_flag: bool,
    pub watchdog_started: Option<u32>,
    pub indicator_ready: bool,
    pub led: (u8, u8, u8),
    id_region: ArrayRegion<UNIQUE_ID_HW_BYTES>,
    sig_region: ArrayRegion<DEVICE_SIGNATURE_SIZE>,
}

impl MockBoard {
    pub fn new() -> Self {
        let uid = [0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE, 1, 2, 3, 4];
        Self {
            uid,
            signature: [0xFF; DEVICE_SIGNATURE_SIZE],
            watchdog_reset_flag: false,
            watchdog_started: None,
            indicator_ready: false,
            led: (0, 0, 0),
            id_region: ArrayRegion { bytes: uid },
            sig_region: ArrayRegion {
                bytes: [0xFF; DEVICE_SIGNATURE_SIZE],
            },
        }
    }
}

impl Board for MockBoard {
    type Watchdog = MockWatchdog;
    type IdRegion = ArrayRegion<UNIQUE_ID_HW_BYTES>;
    type SignatureRegion = ArrayRegion<DEVICE_SIGNATURE_SIZE>;

    fn start_watchdog(&mut self, timeout_ms: u32) -> MockWatchdog {
        self.watchdog_started = Some(timeout_ms);
        MockWatchdog {
            timeout_ms,
            resets: 0,
        }
    }

    fn watchdog_triggered_last_reset(&self) -> bool {
        self.watchdog_reset_flag
    }

    fn init_indicator(&mut self) {
        self.indicator_ready = true;
        self.led = (0, 0, 0);
    }

    fn set_led_rgb(&mut self, red: u8, green: u8, blue: u8) {
        self.led = (red, green, blue);
    }

    fn die(&mut self, reason: i32) -> ! {
        panic!("die({})", reason)
    }

    fn restart(&mut self) -> ! {
        panic!("restart")
    }

    fn hardware_version(&self) -> HardwareVersion {
        HardwareVersion { major: 2, minor: 0 }
    }

    fn unique_id_region(&mut self) -> &mut Self::IdRegion {
        self.id_region.bytes = self.uid;
        &mut self.id_region
    }

    fn signature_region(&mut self) -> &mut Self::SignatureRegion {
        self.sig_region.bytes = self.signature;
        &mut self.sig_region
    }
}
