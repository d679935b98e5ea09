//! Task dispatch and diagnostic telemetry

mod dispatcher;
mod telemetry;

pub use dispatcher::{Dispatcher, SwitchError};
pub use telemetry::Telemetry;
