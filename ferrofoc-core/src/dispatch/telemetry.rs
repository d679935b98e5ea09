//! Lock-free diagnostic mirror of the active task
//!
//! The dispatcher publishes the task status and debug variables after every
//! supervisory tick. Diagnostic code (console, CAN status messages) reads
//! them from thread mode without ever touching the dispatcher lock, so it
//! cannot delay either interrupt.

use portable_atomic::{AtomicF32, AtomicU16, Ordering};

use crate::counter::EventCounter;
use crate::task::{DebugVariables, TaskStatus, NUM_DEBUG_VARIABLES};

#[derive(Debug)]
pub struct Telemetry {
    status: AtomicU16,
    debug: [AtomicF32; NUM_DEBUG_VARIABLES],
    slow_ticks: EventCounter,
    commutation_steps: EventCounter,
    task_switches: EventCounter,
    failures: EventCounter,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            status: AtomicU16::new(TaskStatus::encode_slot(None)),
            debug: [const { AtomicF32::new(0.0) }; NUM_DEBUG_VARIABLES],
            slow_ticks: EventCounter::new(),
            commutation_steps: EventCounter::new(),
            task_switches: EventCounter::new(),
            failures: EventCounter::new(),
        }
    }

    /// Status of the active task, `None` if the slot is empty
    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::decode_slot(self.status.load(Ordering::Acquire))
    }

    /// Debug variables as of the last supervisory tick
    ///
    /// Individual values are consistent; the array as a whole may mix two
    /// consecutive ticks.
    pub fn debug_variables(&self) -> DebugVariables {
        let mut out = [0.0; NUM_DEBUG_VARIABLES];
        for (dst, src) in out.iter_mut().zip(self.debug.iter()) {
            *dst = src.load(Ordering::Relaxed);
        }
        out
    }

    pub fn slow_ticks(&self) -> u64 {
        self.slow_ticks.get()
    }

    pub fn commutation_steps(&self) -> u64 {
        self.commutation_steps.get()
    }

    pub fn task_switches(&self) -> u64 {
        self.task_switches.get()
    }

    pub fn failures(&self) -> u64 {
        self.failures.get()
    }

    pub(crate) fn publish(&self, status: Option<TaskStatus>, vars: &DebugVariables) {
        for (dst, &src) in self.debug.iter().zip(vars.iter()) {
            dst.store(src, Ordering::Relaxed);
        }
        self.status
            .store(TaskStatus::encode_slot(status), Ordering::Release);
    }

    pub(crate) fn count_slow_tick(&self) {
        self.slow_ticks.increment();
    }

    pub(crate) fn count_commutation_step(&self) {
        self.commutation_steps.increment();
    }

    pub(crate) fn count_switch(&self) {
        self.task_switches.increment();
    }

    pub(crate) fn count_failure(&self) {
        self.failures.increment();
    }
}
