//! Three-phase bridge on TIM1 with current and bus voltage sensing
//!
//! TIM1 runs center aligned with complementary outputs and hardware dead
//! time. The update interrupt paces the commutation step. Phase currents and
//! bus voltage are sampled with blocking ADC reads from that interrupt.

use defmt::*;
use embassy_stm32::adc::{Adc, AnyAdcChannel, SampleTime, Temperature};
use embassy_stm32::gpio::{Input, Output};
use embassy_stm32::pac;
use embassy_stm32::peripherals::{ADC1, TIM1};
use embassy_stm32::timer::complementary_pwm::ComplementaryPwm;
use embassy_stm32::timer::Channel;

use ferrofoc_core::math::{clarke, Range, Scalar, Vector2};
use ferrofoc_core::task::CommutationOutput;
use ferrofoc_hal::{PwmParameters, Status};

const PHASES: [Channel; 3] = [Channel::Ch1, Channel::Ch2, Channel::Ch3];

/// Gate driver enable on PB12, active high
pub const GATE_ENABLE_PIN: usize = 12;

/// TIM1 kernel clock (APB2 timers)
const TIMER_CLOCK_HZ: Scalar = 180_000_000.0;

/// 12-bit ADC full scale at 3.3 V
const VOLTS_PER_COUNT: Scalar = 3.3 / 4096.0;
/// 1 mΩ shunt, x20 amplifier, biased at mid-rail
const AMPS_PER_COUNT: Scalar = VOLTS_PER_COUNT / 0.02;
const CURRENT_ZERO_COUNT: Scalar = 2048.0;
/// Bus voltage divider ratio
const BUS_DIVIDER: Scalar = 16.0;

/// Bus voltage window in which the bridge may be driven (V)
const BUS_VOLTAGE_LIMITS: Range = Range::new(10.0, 52.0);
/// Phase current window outside of which the stage reports overload (A)
const OVERLOAD_LIMITS: Range = Range::new(-40.0, 40.0);

/// Phase current and bus voltage channels
const FAST_SAMPLE_TIME: SampleTime = SampleTime::CYCLES15;
/// Temperature sensor needs at least 10 µs, 480 cycles is about 21 µs
const TEMPERATURE_SAMPLE_TIME: SampleTime = SampleTime::CYCLES480;

/// Internal temperature sensor: 0.76 V at 25 °C, 2.5 mV/°C
const TEMP_V25: Scalar = 0.76;
const TEMP_SLOPE: Scalar = 0.0025;

/// Analog inputs of the power stage
pub struct Sense {
    pub adc: Adc<'static, ADC1>,
    pub phase_a: AnyAdcChannel<ADC1>,
    pub phase_b: AnyAdcChannel<ADC1>,
    pub bus_voltage: AnyAdcChannel<ADC1>,
}

pub struct PowerStage {
    _pwm: ComplementaryPwm<'static, TIM1>,
    max_compare: u32,
    duty_limits: Range,
    adc: Adc<'static, ADC1>,
    phase_a: AnyAdcChannel<ADC1>,
    phase_b: AnyAdcChannel<ADC1>,
    bus_voltage: AnyAdcChannel<ADC1>,
    temperature: Temperature,
    enable: Output<'static>,
    fault: Input<'static>,
    last_currents: Vector2,
    last_bus_voltage: Scalar,
    driving: bool,
}

impl PowerStage {
    /// Take over a center-aligned TIM1 bridge with outputs still gated
    pub fn new(
        mut pwm: ComplementaryPwm<'static, TIM1>,
        sense: Sense,
        enable: Output<'static>,
        fault: Input<'static>,
        params: &PwmParameters,
    ) -> Self {
        let dead_time_ticks = dead_time_ticks(params.dead_time);
        pwm.set_dead_time(dead_time_ticks);
        for ch in PHASES {
            pwm.set_duty(ch, 0);
            pwm.enable(ch);
        }

        let tim = pac::TIM1;
        // Gate the bridge until the first active step
        tim.bdtr().modify(|w| w.set_moe(false));
        // One update event per PWM period instead of one per counter turn
        tim.rcr().write(|w| w.set_rep(1));

        let max_compare = tim.arr().read().arr() as u32 + 1;
        info!(
            "Power stage: {} Hz, {} counts, dead time {} ticks",
            params.frequency(),
            max_compare,
            dead_time_ticks
        );

        let Sense {
            mut adc,
            phase_a,
            phase_b,
            bus_voltage,
        } = sense;
        adc.set_sample_time(FAST_SAMPLE_TIME);
        let temperature = adc.enable_temperature();

        Self {
            _pwm: pwm,
            max_compare,
            duty_limits: Range::new(0.0, params.upper_limit),
            adc,
            phase_a,
            phase_b,
            bus_voltage,
            temperature,
            enable,
            fault,
            last_currents: [0.0; 2],
            last_bus_voltage: 0.0,
            driving: false,
        }
    }

    /// Enable the gate driver and the update interrupt, bridge released
    pub fn arm(&mut self) {
        self.enable.set_high();
        let tim = pac::TIM1;
        tim.sr().modify(|w| w.set_uif(false));
        tim.dier().modify(|w| w.set_uie(true));
    }

    /// Acknowledge the update interrupt
    pub fn acknowledge(&mut self) -> bool {
        let tim = pac::TIM1;
        let pending = tim.sr().read().uif();
        tim.sr().modify(|w| w.set_uif(false));
        pending
    }

    /// Sample phase currents (stationary frame, A) and bus voltage (V)
    pub fn sample(&mut self) -> (Vector2, Scalar) {
        let a = self.read_current(PhaseInput::A);
        let b = self.read_current(PhaseInput::B);
        let raw_bus = self.adc.blocking_read(&mut self.bus_voltage);

        self.last_currents = clarke(a, b);
        self.last_bus_voltage = raw_bus as Scalar * VOLTS_PER_COUNT * BUS_DIVIDER;
        (self.last_currents, self.last_bus_voltage)
    }

    /// Apply one commutation output
    pub fn apply(&mut self, out: &CommutationOutput) {
        if !out.active {
            self.release();
            return;
        }

        let tim = pac::TIM1;
        for (n, &command) in out.output.iter().enumerate() {
            let duty = self.duty_limits.constrain(command);
            let compare = (duty * self.max_compare as Scalar) as u16;
            tim.ccr(n).write(|w| w.set_ccr(compare));
        }
        if !self.driving {
            tim.bdtr().modify(|w| w.set_moe(true));
            self.driving = true;
        }
    }

    /// Put the bridge in high impedance
    pub fn release(&mut self) {
        if self.driving {
            let tim = pac::TIM1;
            for n in 0..PHASES.len() {
                tim.ccr(n).write(|w| w.set_ccr(0));
            }
            tim.bdtr().modify(|w| w.set_moe(false));
            self.driving = false;
        }
    }

    /// Release the bridge and cut the gate driver supply
    pub fn shutdown(&mut self) {
        self.release();
        pac::TIM1.dier().modify(|w| w.set_uie(false));
        self.enable.set_low();
    }

    /// Snapshot for the supervisory tick
    ///
    /// Blocks for one slow temperature conversion.
    pub fn status(&mut self) -> Status {
        // Gate driver nFAULT is active low
        let fault = self.fault.is_low();
        let overload = self
            .last_currents
            .iter()
            .any(|&i| !OVERLOAD_LIMITS.contains(i));

        self.adc.set_sample_time(TEMPERATURE_SAMPLE_TIME);
        let raw_temp = self.adc.blocking_read(&mut self.temperature);
        self.adc.set_sample_time(FAST_SAMPLE_TIME);
        let temp_volts = raw_temp as Scalar * VOLTS_PER_COUNT;
        let inverter_temperature = (temp_volts - TEMP_V25) / TEMP_SLOPE + 25.0;

        Status {
            power_ok: !fault && !overload && BUS_VOLTAGE_LIMITS.contains(self.last_bus_voltage),
            overload,
            fault,
            inverter_temperature,
            inverter_voltage: self.last_bus_voltage,
        }
    }

    fn read_current(&mut self, input: PhaseInput) -> Scalar {
        let channel = match input {
            PhaseInput::A => &mut self.phase_a,
            PhaseInput::B => &mut self.phase_b,
        };
        let raw = self.adc.blocking_read(channel);
        (raw as Scalar - CURRENT_ZERO_COUNT) * AMPS_PER_COUNT
    }
}

/// Gate the bridge and cut the gate driver supply through the registers
///
/// Usable from fault handlers: it touches no driver state and takes no lock.
pub fn force_off() {
    let tim = pac::TIM1;
    tim.bdtr().modify(|w| w.set_moe(false));
    for n in 0..PHASES.len() {
        tim.ccr(n).write(|w| w.set_ccr(0));
    }
    tim.dier().modify(|w| w.set_uie(false));
    pac::GPIOB.bsrr().write(|w| w.set_br(GATE_ENABLE_PIN, true));
}

#[derive(Clone, Copy)]
enum PhaseInput {
    A,
    B,
}

/// Dead time in timer ticks, saturating at the longest encodable value
fn dead_time_ticks(dead_time: Scalar) -> u16 {
    Range::new(0.0, 1008.0).constrain(dead_time * TIMER_CLOCK_HZ) as u16
}
