use crate::hardware::Peripheral;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fault raised by a hardware collaborator (bus transport, driver, GPIO).
///
/// These originate below the board layer and are deliberately coarse: the
/// flight software needs to know *that* a transaction failed and on which
/// kind of resource, not the register-level detail. `Copy + Eq` so tests can
/// assert on exact fault propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HalError {
    #[error("I2C transaction failed")]
    I2c,
    #[error("SPI transaction failed")]
    Spi,
    #[error("device did not acknowledge")]
    Nack,
    #[error("device returned malformed data")]
    BadResponse,
    #[error("PWM output could not be allocated")]
    PwmUnavailable,
    #[error("GPIO drive fault")]
    Gpio,
    #[error("peripheral initialization failed")]
    InitFailed,
}

/// Error surface of every gated board operation.
///
/// Maps the board's fault taxonomy: a peripheral that never came up reads as
/// `Unavailable`, a live peripheral that faulted mid-call reads as
/// `Transient` (and stays marked present for retry), and bad caller
/// parameters are rejected as validation variants before any hardware is
/// touched. The fourth class of the taxonomy, invariant violations such as
/// armed+burned, has no variant here: the arm/disarm/fire operations write
/// both flags as a pair, so the state is unreachable rather than detected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoardError {
    /// The peripheral failed bring-up (capability entry is false).
    #[error("{0} is not initialized")]
    Unavailable(Peripheral),

    /// A call against present hardware failed; the capability entry is left
    /// untouched so the next call can retry.
    #[error("{device} fault: {source}")]
    Transient {
        device: &'static str,
        #[source]
        source: HalError,
    },

    /// Burn circuit id is not wired on this board revision.
    #[error("unsupported burn channel {0}")]
    UnsupportedBurnChannel(u8),

    /// Burn duty percentage outside the 0..=100 contract.
    #[error("duty percent {0} outside 0..=100")]
    DutyOutOfRange(f32),

    /// Only the recovery set (PWR, FLD) supports re-initialization.
    #[error("{0} cannot be reinitialized")]
    UnsupportedReinit(Peripheral),
}

impl BoardError {
    /// True when the failure is worth an immediate retry (`Transient`);
    /// `Unavailable` needs a `reinitialize` first and validation errors need
    /// a corrected caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, BoardError::Transient { .. })
    }
}

/// Contract violation detected while attaching the persistent register file.
///
/// Not a runtime hardware fault: a board implementation handing over a store
/// shorter than the frozen register map is a programming error, and the only
/// condition under which `Satellite::initialize` refuses to return a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("non-volatile store is {len} bytes, register map needs {need}")]
    NvmTooSmall { len: usize, need: usize },
}
