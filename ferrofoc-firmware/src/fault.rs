//! Last-resort fault handling
//!
//! Panics end in `udf` through panic-probe, so every software fault lands
//! in `HardFault`. The handler cannot rely on the drive slot, which may be
//! mid-borrow, and works on registers only.

use cortex_m_rt::{exception, ExceptionFrame};
use defmt::*;

use crate::board;
use crate::power_stage;

#[exception]
unsafe fn HardFault(frame: &ExceptionFrame) -> ! {
    power_stage::force_off();
    board::force_indicator_red();
    error!("HardFault at pc {=u32:#010x}, lr {=u32:#010x}", frame.pc(), frame.lr());
    // Nothing pets the watchdog from here on
    loop {
        cortex_m::asm::nop();
    }
}
