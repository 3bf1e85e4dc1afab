//! Persistent counter and flag registers.
//!
//! The board carries a small byte-addressable non-volatile region that
//! survives resets and deep sleep. Ground diagnostic tooling reads this
//! region byte-for-byte, so the register layout below is frozen:
//!
//! | register | field                        |
//! |----------|------------------------------|
//! | 0        | boot_count                   |
//! | 6        | vbus_reset_count             |
//! | 7        | state_error_count            |
//! | 9        | timeout_count                |
//! | 11       | charge_current_fault_count   |
//! | 13       | distance_count               |
//! | 16       | flag byte (8 boolean flags)  |
//!
//! All counters are 8-bit fields starting at bit 0 of their register. Writes
//! are masked to the field width (`value mod 2^width`) and persist to the
//! backing store immediately, so a power loss mid-operation costs at most the
//! in-flight write. Reads never fail.

use crate::error::InitError;
use crate::hal::NonVolatileStore;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

/// Location of one multi-bit field inside the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub register: usize,
    pub lowest_bit: u8,
    pub width: u8,
}

pub const BOOT_COUNT: Field = Field { register: 0, lowest_bit: 0, width: 8 };
pub const VBUS_RESET_COUNT: Field = Field { register: 6, lowest_bit: 0, width: 8 };
pub const STATE_ERROR_COUNT: Field = Field { register: 7, lowest_bit: 0, width: 8 };
pub const TIMEOUT_COUNT: Field = Field { register: 9, lowest_bit: 0, width: 8 };
pub const CHARGE_FAULT_COUNT: Field = Field { register: 11, lowest_bit: 0, width: 8 };
pub const DISTANCE_COUNT: Field = Field { register: 13, lowest_bit: 0, width: 8 };

/// Register holding the eight boolean flags.
pub const FLAG_REGISTER: usize = 16;

/// Bytes of non-volatile storage the register map occupies.
pub const NVM_LEN: usize = 17;

/// Boot counter values above this are reset to 0 during boot correction.
/// The threshold is 200 on flight hardware even though the field holds 255;
/// it is preserved literally for compatibility.
pub const BOOT_COUNT_RESET_THRESHOLD: u8 = 200;

// The register map is a ground-tooling compatibility surface; moving any of
// these offsets is a breaking change.
const_assert!(BOOT_COUNT.register == 0);
const_assert!(VBUS_RESET_COUNT.register == 6);
const_assert!(STATE_ERROR_COUNT.register == 7);
const_assert!(TIMEOUT_COUNT.register == 9);
const_assert!(CHARGE_FAULT_COUNT.register == 11);
const_assert!(DISTANCE_COUNT.register == 13);
const_assert!(FLAG_REGISTER == 16);
const_assert!(FLAG_REGISTER < NVM_LEN);

/// Boolean flags packed into the flag byte, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    /// Previous boot was a soft/watchdog reset. Cleared once per cold boot.
    SoftBoot = 0,
    /// Board is configured for solar charging.
    UsesSolar = 1,
    /// Deployment burn wire is armed.
    BurnArmed = 2,
    /// Brownout guard; doubles as the heater re-entrancy latch.
    BrownoutActive = 3,
    /// A burn has been attempted since the flags were last reset.
    TriedBurn = 4,
    /// Flight software requested shutdown.
    ShutdownRequested = 5,
    /// Deployment burn completed (or the mechanism was disarmed).
    Burned = 6,
    /// Radio is configured for FSK rather than LoRa.
    FskMode = 7,
}

impl Flag {
    fn bit(self) -> u8 {
        self as u8
    }
}

/// What the one-shot boot correction pass found and fixed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BootCorrections {
    /// boot_count exceeded the reset threshold and was zeroed.
    pub boot_count_cleared: bool,
    /// soft_boot was set (previous boot was soft) and has been cleared.
    pub soft_boot_observed: bool,
}

/// Full decoded view of the register file plus the raw bytes, for ground
/// diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvmSnapshot {
    pub boot_count: u8,
    pub vbus_reset_count: u8,
    pub state_error_count: u8,
    pub timeout_count: u8,
    pub charge_current_fault_count: u8,
    pub distance_count: u8,
    pub soft_boot: bool,
    pub uses_solar: bool,
    pub burn_armed: bool,
    pub brownout_active: bool,
    pub tried_burn: bool,
    pub shutdown_requested: bool,
    pub burned: bool,
    pub fsk_mode: bool,
    #[serde(with = "serde_bytes")]
    pub raw: Vec<u8>,
}

/// Typed accessors over the persistent register file.
///
/// Owns the backing store for the life of the process; all mutation of the
/// region goes through these methods.
pub struct Counters {
    store: Box<dyn NonVolatileStore>,
}

impl Counters {
    /// Attach to a backing store.
    ///
    /// Fails only if the store cannot hold the frozen register map, which is
    /// a board-implementation contract violation rather than a runtime fault.
    pub fn attach(store: Box<dyn NonVolatileStore>) -> Result<Self, InitError> {
        let len = store.len();
        if len < NVM_LEN {
            return Err(InitError::NvmTooSmall { len, need: NVM_LEN });
        }
        Ok(Self { store })
    }

    /// Read `width` bits of `register` starting at `lowest_bit`.
    ///
    /// Fields never span registers: `lowest_bit + width` must stay within the
    /// byte.
    pub fn get_bits(&self, register: usize, lowest_bit: u8, width: u8) -> u8 {
        debug_assert!(lowest_bit + width <= 8, "field must fit one register");
        let byte = self.store.read_byte(register);
        (byte >> lowest_bit) & mask(width)
    }

    /// Write `value` into the field, masking it to the field width.
    ///
    /// Masking (`value mod 2^width`) is the single truncation policy; no
    /// error is reported for over-wide values, matching the hardware
    /// behavior ground tooling already assumes. Persists immediately.
    pub fn set_bits(&mut self, register: usize, lowest_bit: u8, width: u8, value: u8) {
        debug_assert!(lowest_bit + width <= 8, "field must fit one register");
        let field_mask = mask(width) << lowest_bit;
        let byte = self.store.read_byte(register);
        let merged = (byte & !field_mask) | ((value << lowest_bit) & field_mask);
        self.store.write_byte(register, merged);
    }

    pub fn read_field(&self, field: Field) -> u8 {
        self.get_bits(field.register, field.lowest_bit, field.width)
    }

    pub fn write_field(&mut self, field: Field, value: u8) {
        self.set_bits(field.register, field.lowest_bit, field.width, value);
    }

    pub fn get_flag(&self, flag: Flag) -> bool {
        self.get_bits(FLAG_REGISTER, flag.bit(), 1) != 0
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.set_bits(FLAG_REGISTER, flag.bit(), 1, value as u8);
    }

    /// One-shot corrective pass, run exactly once per cold boot before any
    /// peripheral is touched: clamp a runaway boot counter back to zero and
    /// consume the soft-boot indicator left by the previous boot.
    pub fn apply_boot_corrections(&mut self) -> BootCorrections {
        let mut corrections = BootCorrections::default();

        if self.read_field(BOOT_COUNT) > BOOT_COUNT_RESET_THRESHOLD {
            self.write_field(BOOT_COUNT, 0);
            corrections.boot_count_cleared = true;
        }

        if self.get_flag(Flag::SoftBoot) {
            self.set_flag(Flag::SoftBoot, false);
            corrections.soft_boot_observed = true;
        }

        corrections
    }

    pub fn boot_count(&self) -> u8 {
        self.read_field(BOOT_COUNT)
    }

    pub fn set_boot_count(&mut self, value: u8) {
        self.write_field(BOOT_COUNT, value);
    }

    pub fn vbus_reset_count(&self) -> u8 {
        self.read_field(VBUS_RESET_COUNT)
    }

    pub fn set_vbus_reset_count(&mut self, value: u8) {
        self.write_field(VBUS_RESET_COUNT, value);
    }

    pub fn state_error_count(&self) -> u8 {
        self.read_field(STATE_ERROR_COUNT)
    }

    pub fn set_state_error_count(&mut self, value: u8) {
        self.write_field(STATE_ERROR_COUNT, value);
    }

    pub fn timeout_count(&self) -> u8 {
        self.read_field(TIMEOUT_COUNT)
    }

    pub fn set_timeout_count(&mut self, value: u8) {
        self.write_field(TIMEOUT_COUNT, value);
    }

    pub fn charge_current_fault_count(&self) -> u8 {
        self.read_field(CHARGE_FAULT_COUNT)
    }

    pub fn set_charge_current_fault_count(&mut self, value: u8) {
        self.write_field(CHARGE_FAULT_COUNT, value);
    }

    pub fn distance_count(&self) -> u8 {
        self.read_field(DISTANCE_COUNT)
    }

    pub fn set_distance_count(&mut self, value: u8) {
        self.write_field(DISTANCE_COUNT, value);
    }

    pub fn snapshot(&self) -> NvmSnapshot {
        let raw = (0..NVM_LEN).map(|i| self.store.read_byte(i)).collect();
        NvmSnapshot {
            boot_count: self.boot_count(),
            vbus_reset_count: self.vbus_reset_count(),
            state_error_count: self.state_error_count(),
            timeout_count: self.timeout_count(),
            charge_current_fault_count: self.charge_current_fault_count(),
            distance_count: self.distance_count(),
            soft_boot: self.get_flag(Flag::SoftBoot),
            uses_solar: self.get_flag(Flag::UsesSolar),
            burn_armed: self.get_flag(Flag::BurnArmed),
            brownout_active: self.get_flag(Flag::BrownoutActive),
            tried_burn: self.get_flag(Flag::TriedBurn),
            shutdown_requested: self.get_flag(Flag::ShutdownRequested),
            burned: self.get_flag(Flag::Burned),
            fsk_mode: self.get_flag(Flag::FskMode),
            raw,
        }
    }
}

impl core::fmt::Debug for Counters {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Counters")
            .field("boot_count", &self.boot_count())
            .field("distance_count", &self.distance_count())
            .field("flags", &self.get_bits(FLAG_REGISTER, 0, 8))
            .finish()
    }
}

fn mask(width: u8) -> u8 {
    if width >= 8 {
        0xFF
    } else {
        (1u8 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::RamNvm;

    fn fresh() -> Counters {
        Counters::attach(Box::new(RamNvm::new())).unwrap()
    }

    #[test]
    fn test_store_too_small_is_rejected() {
        let result = Counters::attach(Box::new(RamNvm::with_len(4)));
        assert_eq!(
            result.err(),
            Some(InitError::NvmTooSmall { len: 4, need: NVM_LEN })
        );
    }

    #[test]
    fn test_set_bits_masks_to_field_width() {
        let mut counters = fresh();

        // 3-bit field at bit 2 of register 1: 0b1111 masks to 0b111
        counters.set_bits(1, 2, 3, 0b1111);
        assert_eq!(counters.get_bits(1, 2, 3), 0b111);

        // Neighboring bits are untouched
        assert_eq!(counters.get_bits(1, 0, 2), 0);
        assert_eq!(counters.get_bits(1, 5, 3), 0);
    }

    #[test]
    fn test_counter_round_trip_is_mod_field_width() {
        let mut counters = fresh();
        for value in [0u8, 1, 127, 200, 255] {
            counters.set_boot_count(value);
            assert_eq!(counters.boot_count(), value);
        }
    }

    #[test]
    fn test_flags_are_independent_bits() {
        let mut counters = fresh();
        counters.set_flag(Flag::BurnArmed, true);
        counters.set_flag(Flag::FskMode, true);

        assert!(counters.get_flag(Flag::BurnArmed));
        assert!(counters.get_flag(Flag::FskMode));
        assert!(!counters.get_flag(Flag::SoftBoot));
        assert!(!counters.get_flag(Flag::Burned));

        counters.set_flag(Flag::BurnArmed, false);
        assert!(!counters.get_flag(Flag::BurnArmed));
        assert!(counters.get_flag(Flag::FskMode));
    }

    #[test]
    fn test_boot_correction_clamps_runaway_boot_count() {
        let mut counters = fresh();
        counters.set_boot_count(250);

        let corrections = counters.apply_boot_corrections();
        assert!(corrections.boot_count_cleared);
        assert_eq!(counters.boot_count(), 0);
    }

    #[test]
    fn test_boot_correction_leaves_count_at_threshold() {
        let mut counters = fresh();
        counters.set_boot_count(BOOT_COUNT_RESET_THRESHOLD);

        let corrections = counters.apply_boot_corrections();
        assert!(!corrections.boot_count_cleared);
        assert_eq!(counters.boot_count(), BOOT_COUNT_RESET_THRESHOLD);
    }

    #[test]
    fn test_soft_boot_cleared_exactly_once() {
        let mut counters = fresh();
        counters.set_flag(Flag::SoftBoot, true);

        let first = counters.apply_boot_corrections();
        assert!(first.soft_boot_observed);
        assert!(!counters.get_flag(Flag::SoftBoot));

        let second = counters.apply_boot_corrections();
        assert!(!second.soft_boot_observed);
    }

    #[test]
    fn test_writes_persist_to_backing_store() {
        let nvm = RamNvm::new();
        let cells = nvm.cells();
        let mut counters = Counters::attach(Box::new(nvm)).unwrap();

        counters.set_distance_count(42);
        counters.set_flag(Flag::Burned, true);

        assert_eq!(cells.borrow()[DISTANCE_COUNT.register], 42);
        assert_eq!(cells.borrow()[FLAG_REGISTER], 1 << Flag::Burned as u8);
    }

    #[test]
    fn test_snapshot_reflects_registers() {
        let mut counters = fresh();
        counters.set_boot_count(7);
        counters.set_flag(Flag::UsesSolar, true);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.boot_count, 7);
        assert!(snapshot.uses_solar);
        assert!(!snapshot.burn_armed);
        assert_eq!(snapshot.raw.len(), NVM_LEN);
        assert_eq!(snapshot.raw[0], 7);
    }
}
