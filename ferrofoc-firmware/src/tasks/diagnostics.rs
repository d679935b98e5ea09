//! Periodic diagnostics report
//!
//! Reads the lock-free telemetry only, so it never delays either interrupt.

use defmt::*;
use embassy_time::{Duration, Ticker};

use ferrofoc_core::Telemetry;

/// Report interval in seconds
pub const REPORT_INTERVAL_S: u64 = 5;

#[embassy_executor::task]
pub async fn diagnostics_task(telemetry: &'static Telemetry) {
    let mut ticker = Ticker::every(Duration::from_secs(REPORT_INTERVAL_S));
    let mut last_steps = telemetry.commutation_steps();

    loop {
        ticker.next().await;

        let steps = telemetry.commutation_steps();
        let rate = (steps - last_steps) / REPORT_INTERVAL_S;
        last_steps = steps;

        info!(
            "task {} | {} steps/s | ticks {} | switches {} | failures {}",
            telemetry.status(),
            rate,
            telemetry.slow_ticks(),
            telemetry.task_switches(),
            telemetry.failures()
        );
        debug!("debug variables {}", telemetry.debug_variables());
    }
}
