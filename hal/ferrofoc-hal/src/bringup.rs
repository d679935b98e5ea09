//! Board bring-up sequence and halt hook
//!
//! Clock and peripheral setup is chip specific and happens before
//! [`init`] is called. What remains is board agnostic and ordered so that
//! a hang anywhere after this point is caught by the watchdog:
//!
//! 1. Arm the watchdog
//! 2. Bring up the status indicator
//! 3. Initialize configuration storage (fatal on failure)
//! 4. Print the banner

use crate::board::Board;
use crate::config::ConfigStorage;

/// Identity of the running firmware, printed in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// Product name
    pub name: &'static str,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Short VCS commit hash
    pub vcs_commit: u32,
}

/// Indicator color shown while halted
pub const HALT_COLOR: (u8, u8, u8) = (255, 0, 0);

/// Run the board-agnostic part of bring-up
///
/// Returns the armed watchdog; the caller must keep it and reset it
/// periodically. A fatal configuration status halts via [`Board::die`] with
/// the status code as the reason.
pub fn init<B, C>(board: &mut B, config: &mut C, info: &FirmwareInfo, watchdog_timeout_ms: u32) -> B::Watchdog
where
    B: Board,
    C: ConfigStorage,
{
    let watchdog = board.start_watchdog(watchdog_timeout_ms);

    board.init_indicator();

    let config_status = config.init();
    if config_status.is_fatal() {
        board.die(config_status.code());
    }

    let reset_cause = if board.watchdog_triggered_last_reset() {
        "WDTRESET"
    } else {
        "OK"
    };

    #[cfg(feature = "defmt")]
    defmt::info!(
        "{=str} {}.{}.{=u32:x} / {} {=str}",
        info.name,
        info.major,
        info.minor,
        info.vcs_commit,
        config_status.code(),
        reset_cause
    );
    #[cfg(not(feature = "defmt"))]
    let _ = (info, reset_cause);

    watchdog
}

/// Hook invoked on the way into a system halt
///
/// Sets the indicator solid red.
pub fn halt_hook<B: Board>(board: &mut B) {
    let (r, g, b) = HALT_COLOR;
    board.set_led_rgb(r, g, b);
}
