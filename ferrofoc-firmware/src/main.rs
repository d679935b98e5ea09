//! ferrofoc - FOC motor controller firmware
//!
//! Firmware binary for STM32F446-based controllers. Control algorithms run
//! as tasks driven from two interrupt priorities:
//!
//! | Context          | Priority | Work                                 |
//! |------------------|----------|--------------------------------------|
//! | TIM1 update      | P0       | commutation step, once per PWM cycle |
//! | UART4 (executor) | P2       | supervisory tick, task switching     |
//! | thread mode      | -        | watchdog, diagnostics                |

#![no_std]
#![no_main]

mod board;
mod channels;
mod commutation;
mod config;
mod fault;
mod power_stage;
mod tasks;

use core::cell::RefCell;

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::time::hz;
use embassy_stm32::timer::complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin};
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::PwmPin;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ferrofoc_core::Dispatcher;
use ferrofoc_hal::{bringup, Board, Watchdog};

use crate::board::{RgbLed, Stm32Board, FIRMWARE_INFO};
use crate::channels::{TaskRequest, TASK_REQUEST, TELEMETRY};
use crate::commutation::Drive;
use crate::config::{FlashConfig, SharedFlash};
use crate::power_stage::{PowerStage, Sense};

/// Watchdog timeout in milliseconds
const WATCHDOG_TIMEOUT_MS: u32 = 1000;

/// Interval between watchdog resets in milliseconds
const WATCHDOG_PET_INTERVAL_MS: u64 = 100;

/// Startup beep: frequency (Hz) and duration (s)
const STARTUP_BEEP: TaskRequest = TaskRequest::Beep {
    frequency: 2000.0,
    duration: 0.3,
};

static FLASH: StaticCell<SharedFlash> = StaticCell::new();

static SUPERVISOR_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn UART4() {
    SUPERVISOR_EXECUTOR.on_interrupt();
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_stm32::init(board::clock_config());

    let flash: &'static SharedFlash =
        FLASH.init(Mutex::new(RefCell::new(Flash::new_blocking(p.FLASH))));

    // Must match board::LED_PINS
    let led = RgbLed {
        red: Output::new(p.PC0, Level::High, Speed::Low),
        green: Output::new(p.PC1, Level::High, Speed::Low),
        blue: Output::new(p.PC2, Level::High, Speed::Low),
    };
    let mut board = Stm32Board::new(p.IWDG, led, flash);
    let mut config = FlashConfig::new(flash);

    let mut watchdog = bringup::init(&mut board, &mut config, &FIRMWARE_INFO, WATCHDOG_TIMEOUT_MS);

    match board.read_unique_id() {
        Ok(uid) => info!("Unique ID {=[u8]:02x}", uid),
        Err(e) => warn!("Unique ID unreadable: {}", e),
    }
    match board.try_read_device_signature() {
        Ok(Some(_)) => info!("Device signature present"),
        Ok(None) => warn!("Device signature not provisioned"),
        Err(e) => warn!("Device signature unreadable: {}", e),
    }
    let hardware_version = board.hardware_version();
    info!("Hardware {}.{}", hardware_version.major, hardware_version.minor);

    let params = config.parameters();
    let sense = Sense {
        adc: Adc::new(p.ADC1),
        phase_a: p.PA0.degrade_adc(),
        phase_b: p.PA1.degrade_adc(),
        bus_voltage: p.PA4.degrade_adc(),
    };
    let pwm = ComplementaryPwm::new(
        p.TIM1,
        Some(PwmPin::new(p.PA8, OutputType::PushPull)),
        Some(ComplementaryPwmPin::new(p.PB13, OutputType::PushPull)),
        Some(PwmPin::new(p.PA9, OutputType::PushPull)),
        Some(ComplementaryPwmPin::new(p.PB14, OutputType::PushPull)),
        Some(PwmPin::new(p.PA10, OutputType::PushPull)),
        Some(ComplementaryPwmPin::new(p.PB15, OutputType::PushPull)),
        None,
        None,
        hz(params.pwm.frequency() as u32),
        CountingMode::CenterAlignedUpInterrupts,
    );
    let stage = PowerStage::new(
        pwm,
        sense,
        // Must match power_stage::GATE_ENABLE_PIN
        Output::new(p.PB12, Level::Low, Speed::Low),
        Input::new(p.PB10, Pull::Up),
        &params.pwm,
    );

    commutation::install(Drive {
        dispatcher: Dispatcher::new(&TELEMETRY),
        stage,
        params,
        hardware_version,
    });

    interrupt::UART4.set_priority(Priority::P2);
    let supervisor = SUPERVISOR_EXECUTOR.start(interrupt::UART4);
    unwrap!(supervisor.spawn(tasks::supervisor_task()));

    commutation::start();
    info!("Commutation running");

    TASK_REQUEST.signal(STARTUP_BEEP);
    unwrap!(spawner.spawn(tasks::diagnostics_task(&TELEMETRY)));

    loop {
        watchdog.reset();
        Timer::after_millis(WATCHDOG_PET_INTERVAL_MS).await;
    }
}
