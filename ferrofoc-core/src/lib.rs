//! Board-agnostic core of the motor controller firmware
//!
//! This crate contains everything between the board and a control law:
//!
//! - Math primitives and unit conversions
//! - Motor, controller and observer parameter model with validation
//! - The task contract driven from the two interrupt contexts
//! - Task results, lifecycle status and lock-free telemetry
//! - The dispatcher that owns the active task and enforces safe switching

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod counter;
pub mod dispatch;
pub mod math;
pub mod params;
pub mod task;
pub mod units;

pub use counter::EventCounter;
pub use dispatch::{Dispatcher, SwitchError, Telemetry};
pub use params::{CompleteParameterSet, ParameterError, ValidParameters};
pub use task::{CommutationOutput, Task, TaskContext, TaskResult, TaskStatus};
