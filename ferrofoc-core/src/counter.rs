//! Event counter

use core::fmt::Write;

use heapless::String;
use portable_atomic::{AtomicU64, Ordering};

/// Maximum decimal length of a `u64`
pub const MAX_COUNTER_DIGITS: usize = 20;

/// Monotonic 64-bit counter with increment-only write access
///
/// Safe to bump from interrupt context and read from anywhere. On targets
/// without native 64-bit atomics the access falls back to a short critical
/// section.
#[derive(Debug, Default)]
pub struct EventCounter {
    count: AtomicU64,
}

impl EventCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Render the count as decimal text
    pub fn to_string(&self) -> String<MAX_COUNTER_DIGITS> {
        let mut s = String::new();
        // 20 digits always fit
        let _ = write!(s, "{}", self.get());
        s
    }
}
