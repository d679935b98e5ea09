//! ferrofoc Hardware Abstraction Layer
//!
//! This crate defines the narrow interfaces through which the motor control
//! core talks to the board. Chip-specific firmware implements them; the core
//! and its tests only ever see the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ferrofoc-firmware (STM32F446)          │
//! └─────────────────────────────────────────┘
//!          │ implements            │ drives
//!          ▼                       ▼
//! ┌──────────────────┐    ┌──────────────────┐
//! │ ferrofoc-hal     │◄───│ ferrofoc-core    │
//! │ (this crate)     │    │ ferrofoc-tasks   │
//! └──────────────────┘    └──────────────────┘
//! ```
//!
//! # Interfaces
//!
//! - [`board::Board`] - bring-up, halt, restart, identity, indicator
//! - [`watchdog::Watchdog`] - independent watchdog handle
//! - [`config::ConfigStorage`] - configuration backing store
//! - [`memory::MemoryRegion`] - fixed-size hardware memory regions
//! - [`motor::Status`], [`motor::PwmParameters`] - power stage snapshot and timing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod board;
pub mod bringup;
pub mod config;
pub mod memory;
pub mod motor;
pub mod watchdog;

#[cfg(test)]
mod mock;

// Re-export key traits at crate root for convenience
pub use board::{Board, DeviceSignature, HardwareVersion, UniqueId};
pub use config::{ConfigStatus, ConfigStorage};
pub use memory::{MemoryRegion, RegionError};
pub use motor::{PwmParameters, Status};
pub use watchdog::Watchdog;
