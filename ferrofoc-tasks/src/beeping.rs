//! Beeping task
//!
//! Exercises the power stage with a harmless audible pattern: short unit
//! pulses on one phase at a time, rotating through the three phases at the
//! requested frequency. Used to prove out the driver without any motor
//! control involved.

use ferrofoc_core::math::{Range, Scalar, Vector2};
use ferrofoc_core::task::{CommutationOutput, DebugVariables, ExitCode, Task, TaskContext, TaskResult, TaskStatus};
use ferrofoc_hal::Status;

pub const FREQUENCY_LIMITS: Range = Range::new(100.0, 15000.0);
pub const DURATION_LIMITS: Range = Range::new(0.0, 3.0);

/// Power stage reported not OK
pub const EXIT_CODE_BAD_HARDWARE_STATUS: ExitCode = 1;

/// Fraction of a PWM period below which a countdown counts as elapsed
const EDGE_TOLERANCE: Scalar = 1e-2;

/// Relative slack on `duration / period`, a few ULPs of the quotient
const PERIOD_COUNT_SLACK: Scalar = 4.0 * Scalar::EPSILON;

pub struct BeepingTask {
    context: TaskContext,
    frequency: Scalar,
    excitation_period: Scalar,
    remaining_cycles: u32,
    time_to_next_excitation: Scalar,
    next_phase_index: u32,
    status: TaskStatus,
}

impl BeepingTask {
    /// Create a beeping task
    ///
    /// `frequency` (Hz) and `duration` (s) are clamped into
    /// [`FREQUENCY_LIMITS`] and [`DURATION_LIMITS`].
    pub fn new(context: TaskContext, frequency: Scalar, duration: Scalar) -> Self {
        let frequency = FREQUENCY_LIMITS.constrain(frequency);
        let excitation_period = 1.0 / frequency;
        let duration = DURATION_LIMITS.constrain(duration);

        Self {
            remaining_cycles: whole_periods(duration, context.pwm().period),
            context,
            frequency,
            excitation_period,
            time_to_next_excitation: excitation_period,
            next_phase_index: 0,
            status: TaskStatus::Running,
        }
    }

    pub fn frequency(&self) -> Scalar {
        self.frequency
    }

    pub fn excitation_period(&self) -> Scalar {
        self.excitation_period
    }

    /// Remaining beep time in seconds
    pub fn remaining_duration(&self) -> Scalar {
        self.remaining_cycles as Scalar * self.context.pwm().period
    }

    fn is_exhausted(&self) -> bool {
        self.remaining_cycles == 0
    }
}

/// Number of PWM periods needed to cover `duration`, rounded up
///
/// Only the rounding error of the quotient is forgiven, so 1 s at 100 µs is
/// 10000 periods, not 10001, while 2.99998 s at 50 µs still needs 60000.
fn whole_periods(duration: Scalar, period: Scalar) -> u32 {
    let cycles = duration / period;
    let exact = cycles - cycles * PERIOD_COUNT_SLACK;
    if exact.is_nan() || exact <= 0.0 {
        return 0;
    }
    // Saturating cast, truncates toward zero
    let n = exact as u32;
    if (n as Scalar) < exact {
        n.saturating_add(1)
    } else {
        n
    }
}

impl Task for BeepingTask {
    fn name(&self) -> &'static str {
        "beep"
    }

    fn on_slow_tick(&mut self, _period: Scalar, hw_status: &Status) -> TaskResult {
        let result = if !hw_status.power_ok {
            TaskResult::failure(EXIT_CODE_BAD_HARDWARE_STATUS)
        } else {
            match self.status {
                TaskStatus::Failed(code) => TaskResult::failure(code),
                TaskStatus::Finished => TaskResult::success(),
                TaskStatus::Running if self.is_exhausted() => TaskResult::success(),
                TaskStatus::Running => TaskResult::in_progress(),
            }
        };

        self.status = self.status.after(result);
        result
    }

    fn on_commutation_step(&mut self, _phase_currents_ab: &Vector2, _inverter_voltage: Scalar) -> CommutationOutput {
        if self.status.is_terminal() || self.is_exhausted() {
            return CommutationOutput::idle();
        }

        let period = self.context.pwm().period;
        self.remaining_cycles -= 1;
        self.time_to_next_excitation -= period;

        if self.time_to_next_excitation <= period * EDGE_TOLERANCE {
            self.time_to_next_excitation += self.excitation_period;
            let mut output = [0.0; 3];
            output[(self.next_phase_index % 3) as usize] = 1.0;
            self.next_phase_index = self.next_phase_index.wrapping_add(1);
            CommutationOutput::drive(output)
        } else {
            // Keep the bridge driven between pulses
            CommutationOutput::hold()
        }
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn debug_variables(&self) -> DebugVariables {
        [
            self.remaining_duration(),
            self.time_to_next_excitation,
            self.excitation_period,
            self.next_phase_index as Scalar,
            self.frequency,
            self.context.pwm().period,
            0.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrofoc_core::params::CompleteParameterSet;
    use ferrofoc_hal::HardwareVersion;
    use proptest::prelude::*;

    const CURRENTS: Vector2 = [0.0, 0.0];

    fn context(pwm_period: Scalar) -> TaskContext {
        let mut params = CompleteParameterSet::default();
        params.pwm.period = pwm_period;
        let valid = params.validate().unwrap();
        TaskContext::new(valid, HardwareVersion { major: 2, minor: 0 })
    }

    fn ok() -> Status {
        Status::nominal(24.0)
    }

    #[test]
    fn test_five_khz_one_second() {
        let mut task = BeepingTask::new(context(100e-6), 5000.0, 1.0);
        assert!((task.excitation_period() - 0.2e-3).abs() < 1e-9);

        let mut edges = 0u32;
        for cycle in 1..=10_000u32 {
            let out = task.on_commutation_step(&CURRENTS, 24.0);
            assert!(out.active, "cycle {cycle} not driven");

            if cycle % 2 == 0 {
                let mut expected = [0.0; 3];
                expected[(edges % 3) as usize] = 1.0;
                assert_eq!(out.output, expected, "cycle {cycle}");
                edges += 1;
            } else {
                assert!(out.is_zero(), "cycle {cycle}");
            }

            if cycle % 10 == 0 && cycle < 10_000 {
                assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::InProgress);
            }
        }
        assert_eq!(edges, 5000);

        assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::Success);
        assert_eq!(task.status(), TaskStatus::Finished);

        let out = task.on_commutation_step(&CURRENTS, 24.0);
        assert!(out.is_zero());
        assert!(!out.active);
    }

    #[test]
    fn test_phase_rotation() {
        // Excitation period equals the PWM period: an edge every cycle
        let mut task = BeepingTask::new(context(100e-6), 10_000.0, 1.0);
        let phases: [usize; 7] = core::array::from_fn(|_| {
            let out = task.on_commutation_step(&CURRENTS, 24.0);
            out.output.iter().position(|&x| x == 1.0).unwrap()
        });
        assert_eq!(phases, [0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_power_loss_fails() {
        let mut task = BeepingTask::new(context(100e-6), 1000.0, 1.0);
        task.on_commutation_step(&CURRENTS, 24.0);

        let result = task.on_slow_tick(1e-3, &Status::unpowered());
        assert_eq!(result, TaskResult::Failure(EXIT_CODE_BAD_HARDWARE_STATUS));
        assert_eq!(task.status(), TaskStatus::Failed(EXIT_CODE_BAD_HARDWARE_STATUS));

        // Duration left, but a failed task never drives again
        let out = task.on_commutation_step(&CURRENTS, 24.0);
        assert_eq!(out, CommutationOutput::idle());
        assert_eq!(
            task.on_slow_tick(1e-3, &ok()),
            TaskResult::Failure(EXIT_CODE_BAD_HARDWARE_STATUS)
        );
        assert_eq!(task.status(), TaskStatus::Failed(EXIT_CODE_BAD_HARDWARE_STATUS));
    }

    #[test]
    fn test_power_loss_after_finish() {
        let mut task = BeepingTask::new(context(100e-6), 1000.0, 0.0);
        assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::Success);
        assert_eq!(
            task.on_slow_tick(1e-3, &Status::unpowered()),
            TaskResult::Failure(EXIT_CODE_BAD_HARDWARE_STATUS)
        );
        assert_eq!(task.status(), TaskStatus::Finished);
    }

    #[test]
    fn test_finished_never_reverts() {
        let mut task = BeepingTask::new(context(100e-6), 1000.0, 0.0005);
        for _ in 0..5 {
            assert!(task.on_commutation_step(&CURRENTS, 24.0).active);
        }
        assert!(!task.on_commutation_step(&CURRENTS, 24.0).active);

        for _ in 0..3 {
            assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::Success);
            assert_eq!(task.status(), TaskStatus::Finished);
        }
    }

    #[test]
    fn test_zero_duration_is_idle() {
        let mut task = BeepingTask::new(context(100e-6), 1000.0, -1.0);
        assert_eq!(task.remaining_duration(), 0.0);
        assert_eq!(task.on_commutation_step(&CURRENTS, 24.0), CommutationOutput::idle());
    }

    #[test]
    fn test_debug_variables() {
        let task = BeepingTask::new(context(100e-6), 4000.0, 0.5);
        let vars = task.debug_variables();
        assert!((vars[0] - 0.5).abs() < 1e-6);
        assert_eq!(vars[1], task.excitation_period());
        assert_eq!(vars[2], task.excitation_period());
        assert_eq!(vars[3], 0.0);
        assert_eq!(vars[4], 4000.0);
        assert_eq!(vars[5], 100e-6);
        assert_eq!(vars[6], 0.0);
        assert_eq!(task.name(), "beep");
    }

    #[test]
    fn test_whole_periods() {
        assert_eq!(whole_periods(1.0, 100e-6), 10_000);
        assert_eq!(whole_periods(0.00015, 100e-6), 2);
        assert_eq!(whole_periods(0.0, 100e-6), 0);
        assert_eq!(whole_periods(3.0, 50e-6), 60_000);
        assert_eq!(whole_periods(2.99998, 50e-6), 60_000);
        assert_eq!(whole_periods(0.00015001, 50e-6), 4);
    }

    /// Active commutation steps until the bridge is released
    fn run_to_completion(task: &mut BeepingTask) -> u32 {
        let mut steps = 0u32;
        while task.on_commutation_step(&CURRENTS, 24.0).active {
            steps += 1;
            if steps % 20 == 0 && !task.is_exhausted() {
                assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::InProgress);
            }
        }
        steps
    }

    #[test]
    fn test_success_not_before_duration() {
        let period: Scalar = 50e-6;
        let duration: Scalar = 2.99998;
        let mut task = BeepingTask::new(context(period), 1000.0, duration);

        let steps = run_to_completion(&mut task);
        assert_eq!(steps, 60_000);
        let elapsed = steps as f64 * period as f64;
        assert!(elapsed >= duration as f64, "finished after {elapsed} s of {duration} s");
        assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::Success);
    }

    proptest! {
        #[test]
        fn prop_inputs_are_clamped(frequency in proptest::num::f32::ANY, duration in proptest::num::f32::ANY) {
            let task = BeepingTask::new(context(100e-6), frequency, duration);
            prop_assert!(FREQUENCY_LIMITS.contains(task.frequency()));
            prop_assert!(task.remaining_duration() >= 0.0);
            prop_assert!(task.remaining_duration() <= DURATION_LIMITS.max + 100e-6);
        }

        #[test]
        fn prop_in_range_inputs_kept(frequency in 100.0f32..15000.0, duration in 0.0f32..3.0) {
            let task = BeepingTask::new(context(100e-6), frequency, duration);
            prop_assert_eq!(task.frequency(), frequency);
            let covered = task.remaining_duration() as f64;
            let tolerance = duration as f64 * 8.0 * Scalar::EPSILON as f64;
            prop_assert!(covered >= duration as f64 - tolerance, "{} s covers {} s", covered, duration);
        }

        #[test]
        fn prop_active_time_covers_duration(duration in 0.0f32..0.05, period in prop_oneof![Just(50e-6f32), Just(62.5e-6f32), Just(100e-6f32)]) {
            let mut task = BeepingTask::new(context(period), 2000.0, duration);
            let steps = run_to_completion(&mut task);
            let elapsed = steps as f64 * period as f64;
            let tolerance = duration as f64 * 8.0 * Scalar::EPSILON as f64;
            prop_assert!(elapsed >= duration as f64 - tolerance, "{} s of {} s", elapsed, duration);
            prop_assert!(elapsed < duration as f64 + period as f64 + tolerance);
            prop_assert_eq!(task.on_slow_tick(1e-3, &ok()), TaskResult::Success);
        }

        #[test]
        fn prop_edges_are_unit_vectors(frequency in 100.0f32..15000.0, steps in 1usize..2000) {
            let mut task = BeepingTask::new(context(50e-6), frequency, 3.0);
            for _ in 0..steps {
                let out = task.on_commutation_step(&CURRENTS, 24.0);
                prop_assert!(out.active);
                let ones = out.output.iter().filter(|&&x| x == 1.0).count();
                let zeros = out.output.iter().filter(|&&x| x == 0.0).count();
                prop_assert!((ones == 1 && zeros == 2) || zeros == 3);
            }
        }
    }
}
