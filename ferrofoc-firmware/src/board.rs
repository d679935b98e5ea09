//! STM32F446 board support
//!
//! Implements the `ferrofoc_hal::Board` collaborators:
//!
//! - Independent watchdog, reset cause from RCC_CSR
//! - 96-bit unique ID from system memory
//! - Device signature in flash sector 7, written at provisioning
//! - RGB indicator on three active-low GPIOs

use defmt::*;
use embassy_stm32::gpio::Output;
use embassy_stm32::pac;
use embassy_stm32::peripherals::IWDG;
use embassy_stm32::rcc::{self, Sysclk};
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::{Config, Peri};

use ferrofoc_hal::board::DEVICE_SIGNATURE_SIZE;
use ferrofoc_hal::bringup::{self, FirmwareInfo};
use ferrofoc_hal::memory::SliceRegion;
use ferrofoc_hal::{Board, HardwareVersion, MemoryRegion, RegionError, Watchdog};

use crate::commutation;
use crate::config::SharedFlash;

pub const FIRMWARE_INFO: FirmwareInfo = FirmwareInfo {
    name: "ferrofoc",
    major: 0,
    minor: 1,
    vcs_commit: 0,
};

const HW_VERSION_MAJOR: u8 = 2;

/// Offset of the signature sector from the start of flash
const SIGNATURE_OFFSET: u32 = 0x6_0000;

/// Halt reason when the watchdog peripheral was already taken
const DIE_WATCHDOG_UNAVAILABLE: i32 = -100;

/// Indicator channels at or above this level are lit
pub const LED_THRESHOLD: u8 = 128;

/// Clock tree: 8 MHz HSE, 180 MHz SYSCLK, 90 MHz APB2 (180 MHz timers)
pub fn clock_config() -> Config {
    let mut config = Config::default();
    config.rcc.hse = Some(rcc::Hse {
        freq: embassy_stm32::time::mhz(8),
        mode: rcc::HseMode::Bypass,
    });
    config.rcc.pll_src = rcc::PllSource::HSE;
    config.rcc.pll = Some(rcc::Pll {
        prediv: rcc::PllPreDiv::DIV4,
        mul: rcc::PllMul::MUL180,
        divp: Some(rcc::PllPDiv::DIV2),
        divq: None,
        divr: None,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = rcc::AHBPrescaler::DIV1;
    config.rcc.apb1_pre = rcc::APBPrescaler::DIV4;
    config.rcc.apb2_pre = rcc::APBPrescaler::DIV2;
    config
}

/// Armed independent watchdog
pub struct Iwdg(IndependentWatchdog<'static, IWDG>);

impl Watchdog for Iwdg {
    fn reset(&mut self) {
        self.0.pet();
    }
}

/// Read-only window onto a flash range
pub struct FlashRegion {
    flash: &'static SharedFlash,
    offset: u32,
    size: usize,
}

impl MemoryRegion for FlashRegion {
    fn size(&self) -> usize {
        self.size
    }

    fn read(&mut self, out: &mut [u8]) -> Result<(), RegionError> {
        if out.len() > self.size {
            return Err(RegionError::OutOfBounds);
        }
        self.flash
            .lock(|f| f.borrow_mut().blocking_read(self.offset, out))
            .map_err(|_| RegionError::Read)
    }
}

/// Indicator pins on GPIOC: red, green, blue
pub const LED_PINS: [usize; 3] = [0, 1, 2];

/// Active-low RGB indicator
///
/// Each channel is either on or off: levels at or above
/// [`LED_THRESHOLD`] light it, anything lower leaves it dark. There is no
/// brightness control.
pub struct RgbLed {
    pub red: Output<'static>,
    pub green: Output<'static>,
    pub blue: Output<'static>,
}

impl RgbLed {
    fn set(&mut self, red: u8, green: u8, blue: u8) {
        for (pin, level) in [
            (&mut self.red, red),
            (&mut self.green, green),
            (&mut self.blue, blue),
        ] {
            if level >= LED_THRESHOLD {
                pin.set_low();
            } else {
                pin.set_high();
            }
        }
    }
}

/// Solid red through the registers, for fault handlers
pub fn force_indicator_red() {
    let [red, green, blue] = LED_PINS;
    pac::GPIOC.bsrr().write(|w| {
        w.set_br(red, true);
        w.set_bs(green, true);
        w.set_bs(blue, true);
    });
}

pub struct Stm32Board {
    iwdg: Option<Peri<'static, IWDG>>,
    led: RgbLed,
    uid: SliceRegion<'static>,
    signature: FlashRegion,
    watchdog_reset: bool,
}

impl Stm32Board {
    pub fn new(iwdg: Peri<'static, IWDG>, led: RgbLed, flash: &'static SharedFlash) -> Self {
        // Latch and clear the reset flags so the next boot sees fresh ones
        let watchdog_reset = pac::RCC.csr().read().iwdgrstf();
        pac::RCC.csr().modify(|w| w.set_rmvf(true));

        Self {
            iwdg: Some(iwdg),
            led,
            uid: SliceRegion::new(embassy_stm32::uid::uid()),
            signature: FlashRegion {
                flash,
                offset: SIGNATURE_OFFSET,
                size: DEVICE_SIGNATURE_SIZE,
            },
            watchdog_reset,
        }
    }
}

impl Board for Stm32Board {
    type Watchdog = Iwdg;
    type IdRegion = SliceRegion<'static>;
    type SignatureRegion = FlashRegion;

    fn start_watchdog(&mut self, timeout_ms: u32) -> Iwdg {
        let Some(iwdg) = self.iwdg.take() else {
            self.die(DIE_WATCHDOG_UNAVAILABLE)
        };
        let mut wdg = IndependentWatchdog::new(iwdg, timeout_ms.saturating_mul(1000));
        wdg.unleash();
        Iwdg(wdg)
    }

    fn watchdog_triggered_last_reset(&self) -> bool {
        self.watchdog_reset
    }

    fn init_indicator(&mut self) {
        self.led.set(0, 0, 0);
    }

    fn set_led_rgb(&mut self, red: u8, green: u8, blue: u8) {
        self.led.set(red, green, blue);
    }

    fn die(&mut self, reason: i32) -> ! {
        commutation::emergency_stop();
        bringup::halt_hook(self);
        error!("Halted, reason {}", reason);
        // Nothing pets the watchdog from here on
        loop {
            cortex_m::asm::nop();
        }
    }

    fn restart(&mut self) -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }

    fn hardware_version(&self) -> HardwareVersion {
        HardwareVersion {
            major: HW_VERSION_MAJOR,
            minor: 0,
        }
    }

    fn unique_id_region(&mut self) -> &mut SliceRegion<'static> {
        &mut self.uid
    }

    fn signature_region(&mut self) -> &mut FlashRegion {
        &mut self.signature
    }
}
