//! Task implementations
//!
//! Concrete tasks driven by the `ferrofoc-core` dispatcher:
//!
//! - Beeping: audible excitation used to exercise the power stage
//! - Idle: holds the power stage released
//!
//! [`AnyTask`] closes the set so the dispatcher can be monomorphized without
//! trait objects.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod any;
pub mod beeping;
pub mod idle;

pub use any::AnyTask;
pub use beeping::BeepingTask;
pub use idle::IdleTask;
