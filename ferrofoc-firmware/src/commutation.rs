//! Commutation interrupt and the drive slot
//!
//! The dispatcher and the power stage live together in one
//! `critical_section::Mutex`. The TIM1 update interrupt (highest priority)
//! and the supervisor (lower priority) both borrow it, so a commutation step
//! never observes a half-finished supervisory tick.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};

use ferrofoc_core::params::CompleteParameterSet;
use ferrofoc_core::Dispatcher;
use ferrofoc_hal::HardwareVersion;
use ferrofoc_tasks::AnyTask;

use crate::power_stage::{self, PowerStage};

pub struct Drive {
    pub dispatcher: Dispatcher<'static, AnyTask>,
    pub stage: PowerStage,
    pub params: CompleteParameterSet,
    pub hardware_version: HardwareVersion,
}

static DRIVE: Mutex<RefCell<Option<Drive>>> = Mutex::new(RefCell::new(None));

pub fn install(drive: Drive) {
    critical_section::with(|cs| {
        DRIVE.borrow(cs).replace(Some(drive));
    });
}

/// Run `f` on the drive with both interrupts masked
pub fn with_drive<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Drive) -> R,
{
    critical_section::with(|cs| DRIVE.borrow(cs).borrow_mut().as_mut().map(f))
}

/// Arm the power stage and unmask the commutation interrupt
pub fn start() {
    with_drive(|d| d.stage.arm());

    interrupt::TIM1_UP_TIM10.set_priority(Priority::P0);
    // SAFETY: the handler only touches DRIVE, which is initialized by now
    unsafe { interrupt::TIM1_UP_TIM10.enable() };
}

/// Shut the bridge down and drop the drive
///
/// Both interrupt handlers become no-ops afterwards. The bridge is gated
/// even when the drive is borrowed by the caller.
pub fn emergency_stop() {
    power_stage::force_off();
    critical_section::with(|cs| {
        if let Ok(mut slot) = DRIVE.borrow(cs).try_borrow_mut() {
            if let Some(mut drive) = slot.take() {
                drive.stage.shutdown();
            }
        }
    });
}

#[interrupt]
fn TIM1_UP_TIM10() {
    with_drive(|d| {
        d.stage.acknowledge();
        let (currents, bus_voltage) = d.stage.sample();
        let out = d.dispatcher.on_commutation_step(&currents, bus_voltage);
        d.stage.apply(&out);
    });
}
