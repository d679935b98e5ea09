//! Motor control parameter model
//!
//! Parameters are produced by the configuration subsystem, validated once,
//! and then handed to tasks as an immutable snapshot.

pub mod set;
pub mod types;

pub use set::{CompleteParameterSet, ParameterError, PersistError, ValidParameters, MAX_ENCODED_SIZE};
pub use types::{ControllerParameters, MotorParameters, ObserverParameters};
