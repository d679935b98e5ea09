//! Parameter storage in internal flash
//!
//! The parameter set lives in flash sector 6, outside the firmware image:
//!
//! ```text
//! offset  size  content
//! 0       4     magic "FFOC" (little endian)
//! 4       2     payload length
//! 6       n     postcard-encoded CompleteParameterSet
//! ```
//!
//! An erased sector means "use defaults". A corrupt or invalid record is
//! reported and replaced by defaults so the controller still comes up.

use core::cell::RefCell;

use defmt::*;
use embassy_stm32::flash::{Blocking, Flash};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use ferrofoc_core::params::{CompleteParameterSet, MAX_ENCODED_SIZE};
use ferrofoc_hal::{ConfigStatus, ConfigStorage};

/// Flash driver shared by the parameter store and the signature region
pub type SharedFlash = Mutex<CriticalSectionRawMutex, RefCell<Flash<'static, Blocking>>>;

/// Offset of the parameter sector from the start of flash
pub const PARAMS_OFFSET: u32 = 0x4_0000;

const PARAMS_MAGIC: u32 = 0x434F_4646; // "FFOC"
const HEADER_SIZE: usize = 6;

/// Flash could not be read at all
pub const STATUS_FLASH_ERROR: ConfigStatus = ConfigStatus(-5);
/// Parameters loaded from flash
pub const STATUS_LOADED: ConfigStatus = ConfigStatus(1);

pub struct FlashConfig {
    flash: &'static SharedFlash,
    params: CompleteParameterSet,
}

impl FlashConfig {
    pub fn new(flash: &'static SharedFlash) -> Self {
        Self {
            flash,
            params: CompleteParameterSet::default(),
        }
    }

    /// Parameter set in effect after [`ConfigStorage::init`]
    pub fn parameters(&self) -> CompleteParameterSet {
        self.params
    }

    fn load(&self) -> Result<Option<CompleteParameterSet>, ConfigStatus> {
        let mut record = [0u8; HEADER_SIZE + MAX_ENCODED_SIZE];
        self.flash
            .lock(|f| f.borrow_mut().blocking_read(PARAMS_OFFSET, &mut record))
            .map_err(|_| STATUS_FLASH_ERROR)?;

        let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if magic != PARAMS_MAGIC {
            return Ok(None);
        }

        let len = u16::from_le_bytes([record[4], record[5]]) as usize;
        if len > MAX_ENCODED_SIZE {
            warn!("Stored parameter record too long ({} bytes)", len);
            return Ok(None);
        }

        match CompleteParameterSet::decode(&record[HEADER_SIZE..HEADER_SIZE + len]) {
            Ok(params) => Ok(Some(params)),
            Err(e) => {
                warn!("Stored parameters unreadable: {}", e);
                Ok(None)
            }
        }
    }
}

impl ConfigStorage for FlashConfig {
    fn init(&mut self) -> ConfigStatus {
        match self.load() {
            Ok(Some(params)) if params.is_valid() => {
                self.params = params;
                STATUS_LOADED
            }
            Ok(Some(_)) => {
                warn!("Stored parameters invalid, using defaults");
                ConfigStatus::OK
            }
            Ok(None) => {
                info!("No stored parameters, using defaults");
                ConfigStatus::OK
            }
            Err(status) => status,
        }
    }
}
