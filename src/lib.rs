//! # EPS Flight Board
//!
//! Hardware abstraction and state layer for a CubeSat electrical power
//! system board: staged peripheral bring-up with per-device fault
//! isolation, persistent counters and flags, solar face switching,
//! burn-wire and heater actuation, and averaged state-of-health
//! telemetry.
//!
//! ## Features
//!
//! - **Degraded-mode bring-up**: a failed peripheral is logged and marked
//!   unavailable; the rest of the board keeps initializing
//! - **Capability gating**: every operation checks its peripheral before
//!   touching the bus
//! - **Persistent state**: boot counters and deployment flags survive
//!   power cycles in a small byte-addressed store
//! - **Guarded actuation**: burn-wire and heater sequences share one
//!   relay; a burn pulse never exits with it energized, and the heater
//!   latches through a persistent brownout flag
//! - **Bounded memory**: fixed-capacity collections for reports, fault
//!   history, and scan results
//!
//! ## Quick Start
//!
//! ```rust
//! use epsboard::hal::mock::MockBoard;
//! use epsboard::Satellite;
//!
//! // Bring the board up against the mock hardware.
//! let (board, _probe) = MockBoard::new();
//! let mut satellite = Satellite::initialize(Box::new(board)).unwrap();
//!
//! // Capability report survives partial bring-up.
//! let report = satellite.hardware_report();
//! println!("{}/{} peripherals up", report.available, report.total);
//!
//! // State-of-health frame; absent sensors read as None.
//! let frame = satellite.telemetry_snapshot();
//! println!("battery: {:?} V", frame.battery_voltage);
//! ```
//!
//! ## Architecture
//!
//! - [`satellite`] - Bring-up orchestration, capability table, faces
//! - [`hal`] - Board and peripheral traits plus the mock board
//! - [`nvm`] - Persistent counters and flags
//! - [`actuation`] - Burn-wire firing and heater control
//! - [`telemetry`] - State-of-health sampling
//! - [`fault`] - Bounded fault history
//! - [`hardware`] - Peripheral and face identities, capability reports

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod actuation;
pub mod error;
pub mod fault;
pub mod hal;
pub mod hardware;
pub mod nvm;
pub mod satellite;
pub mod telemetry;

// Re-export main public types for convenience
pub use error::{BoardError, HalError, InitError};
pub use hal::Board;
pub use satellite::{PowerMode, Satellite};
