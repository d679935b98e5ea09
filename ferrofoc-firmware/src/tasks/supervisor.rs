//! Supervisory tick
//!
//! Runs at a fixed rate on the interrupt executor, below the commutation
//! interrupt. Each tick takes a power stage snapshot, ticks the active task
//! and performs task switches:
//!
//! - a terminated task is replaced by the idle task
//! - a pending request stops the idle task, then replaces it
//!
//! The whole tick runs in one critical section: the power stage snapshot
//! (including a ~21 µs temperature conversion), `on_slow_tick`, and any
//! task switch with its log output. All of it is bounded and well below one
//! PWM period, so at most one commutation step is delayed.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use ferrofoc_core::math::Scalar;
use ferrofoc_tasks::{AnyTask, BeepingTask, IdleTask};

use crate::channels::{TaskRequest, TASK_REQUEST};
use crate::commutation::{with_drive, Drive};

/// Supervisory tick interval in microseconds
pub const TICK_INTERVAL_US: u64 = 1000;

#[embassy_executor::task]
pub async fn supervisor_task() {
    info!("Supervisor started");

    let mut ticker = Ticker::every(Duration::from_micros(TICK_INTERVAL_US));
    let mut last = Instant::now();
    let mut pending: Option<TaskRequest> = None;

    loop {
        ticker.next().await;

        let now = Instant::now();
        let period = (now - last).as_micros() as Scalar * 1e-6;
        last = now;

        if let Some(request) = TASK_REQUEST.try_take() {
            info!("Task requested: {}", request);
            pending = Some(request);
        }

        with_drive(|drive| tick(drive, period, &mut pending));
    }
}

fn tick(drive: &mut Drive, period: Scalar, pending: &mut Option<TaskRequest>) {
    let status = drive.stage.status();
    drive.dispatcher.on_slow_tick(period, &status);

    if pending.is_some() {
        if let Some(AnyTask::Idle(idle)) = drive.dispatcher.task_mut() {
            idle.request_stop();
        }
    }

    // Terminal tasks are released only after an idle commutation step
    if !drive.dispatcher.can_switch() {
        return;
    }

    let Drive {
        dispatcher,
        params,
        hardware_version,
        ..
    } = drive;

    let result = match pending.take() {
        Some(TaskRequest::Beep { frequency, duration }) => {
            dispatcher.activate(params, *hardware_version, |ctx| {
                BeepingTask::new(ctx, frequency, duration).into()
            })
        }
        None => dispatcher.activate(params, *hardware_version, |ctx| IdleTask::new(ctx).into()),
    };

    if let Err(e) = result {
        error!("Task switch refused: {}", e);
    }
}
