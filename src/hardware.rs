//! Peripheral identity and the hardware capability table.

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Maximum entries a hardware report can carry. Sized to the fixed
/// peripheral set with headroom for one board revision.
const MAX_REPORT_ENTRIES: usize = 16;

/// Every peripheral the board knows about. The set is fixed at compile
/// time; a board revision that adds hardware extends this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Peripheral {
    /// External watchdog timer.
    Wdt,
    /// RGB status indicator.
    Neo,
    /// I2C multiplexer in front of the face sensors.
    Tca,
    /// Solar charge power monitor.
    Solar,
    /// Battery bus power monitor.
    Pwr,
    /// LED driver feeding the face panels and the heater FET.
    Fld,
    /// Board temperature sensor ADC channel.
    Temp,
    /// Battery thermocouple ADC channel.
    Couple,
    /// CAN transceiver.
    Can,
    Face0,
    Face1,
    Face2,
    Face3,
    Face4,
}

impl Peripheral {
    pub const ALL: [Peripheral; 14] = [
        Peripheral::Wdt,
        Peripheral::Neo,
        Peripheral::Tca,
        Peripheral::Solar,
        Peripheral::Pwr,
        Peripheral::Fld,
        Peripheral::Temp,
        Peripheral::Couple,
        Peripheral::Can,
        Peripheral::Face0,
        Peripheral::Face1,
        Peripheral::Face2,
        Peripheral::Face3,
        Peripheral::Face4,
    ];

    /// Short uppercase label, matching the names ground operators know
    /// from the legacy capability dump.
    pub fn label(&self) -> &'static str {
        match self {
            Peripheral::Wdt => "WDT",
            Peripheral::Neo => "NEO",
            Peripheral::Tca => "TCA",
            Peripheral::Solar => "SOLAR",
            Peripheral::Pwr => "PWR",
            Peripheral::Fld => "FLD",
            Peripheral::Temp => "TEMP",
            Peripheral::Couple => "COUPLE",
            Peripheral::Can => "CAN",
            Peripheral::Face0 => "Face0",
            Peripheral::Face1 => "Face1",
            Peripheral::Face2 => "Face2",
            Peripheral::Face3 => "Face3",
            Peripheral::Face4 => "Face4",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl core::fmt::Display for Peripheral {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the five deployable face panels, keyed by the LED-driver
/// channel that powers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    ZPlus,
    ZMinus,
    YPlus,
    XMinus,
    XPlus,
}

pub const FACE_COUNT: usize = 5;

/// LED-driver channel wired to the battery heater FET. Channels 5..15 are
/// unpopulated on this board revision.
pub const HEATER_CHANNEL: u8 = 15;

impl Face {
    pub const ALL: [Face; FACE_COUNT] = [
        Face::ZPlus,
        Face::ZMinus,
        Face::YPlus,
        Face::XMinus,
        Face::XPlus,
    ];

    /// LED-driver channel the face is wired to.
    pub fn channel(&self) -> u8 {
        *self as u8
    }

    pub fn axis(&self) -> &'static str {
        match self {
            Face::ZPlus => "z+",
            Face::ZMinus => "z-",
            Face::YPlus => "y+",
            Face::XMinus => "x-",
            Face::XPlus => "x+",
        }
    }

    pub fn peripheral(&self) -> Peripheral {
        match self {
            Face::ZPlus => Peripheral::Face0,
            Face::ZMinus => Peripheral::Face1,
            Face::YPlus => Peripheral::Face2,
            Face::XMinus => Peripheral::Face3,
            Face::XPlus => Peripheral::Face4,
        }
    }
}

/// Status of a single peripheral in a hardware report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralStatus {
    pub peripheral: Peripheral,
    pub available: bool,
}

/// Serializable view of the capability table for logs and ground dumps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareReport {
    pub entries: Vec<PeripheralStatus, MAX_REPORT_ENTRIES>,
    pub available: u8,
    pub total: u8,
}

/// Tracks which peripherals survived bring-up.
///
/// Entries start `false` and flip to `true` only when the corresponding
/// driver constructor succeeds. Every hardware-touching operation checks
/// its entry before reaching for the bus, so a dead sensor degrades one
/// capability instead of wedging the board.
#[derive(Debug, Clone)]
pub struct HardwareTable {
    entries: [bool; Peripheral::ALL.len()],
}

impl HardwareTable {
    pub fn new() -> Self {
        Self {
            entries: [false; Peripheral::ALL.len()],
        }
    }

    pub fn is_available(&self, peripheral: Peripheral) -> bool {
        self.entries[peripheral.index()]
    }

    pub fn mark_available(&mut self, peripheral: Peripheral) {
        self.entries[peripheral.index()] = true;
    }

    pub fn mark_unavailable(&mut self, peripheral: Peripheral) {
        self.entries[peripheral.index()] = false;
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|up| **up).count()
    }

    pub fn report(&self) -> HardwareReport {
        let mut entries = Vec::new();
        for peripheral in Peripheral::ALL {
            // Capacity is sized to the fixed peripheral set; push cannot fail.
            let _ = entries.push(PeripheralStatus {
                peripheral,
                available: self.is_available(peripheral),
            });
        }
        HardwareReport {
            entries,
            available: self.available_count() as u8,
            total: Peripheral::ALL.len() as u8,
        }
    }
}

impl Default for HardwareTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_starts_empty() {
        let table = HardwareTable::new();
        for peripheral in Peripheral::ALL {
            assert!(!table.is_available(peripheral));
        }
        assert_eq!(table.available_count(), 0);
    }

    #[test]
    fn test_mark_available_is_per_peripheral() {
        let mut table = HardwareTable::new();
        table.mark_available(Peripheral::Pwr);
        table.mark_available(Peripheral::Face2);

        assert!(table.is_available(Peripheral::Pwr));
        assert!(table.is_available(Peripheral::Face2));
        assert!(!table.is_available(Peripheral::Solar));
        assert_eq!(table.available_count(), 2);
    }

    #[test]
    fn test_report_covers_every_peripheral() {
        let mut table = HardwareTable::new();
        table.mark_available(Peripheral::Fld);

        let report = table.report();
        assert_eq!(report.entries.len(), Peripheral::ALL.len());
        assert_eq!(report.available, 1);
        assert_eq!(report.total, Peripheral::ALL.len() as u8);

        let fld = report
            .entries
            .iter()
            .find(|entry| entry.peripheral == Peripheral::Fld)
            .unwrap();
        assert!(fld.available);
    }

    #[test]
    fn test_face_channels_match_wiring() {
        assert_eq!(Face::ZPlus.channel(), 0);
        assert_eq!(Face::XPlus.channel(), 4);
        assert_eq!(Face::YPlus.peripheral(), Peripheral::Face2);
        assert_eq!(Face::ZMinus.axis(), "z-");
    }

    #[test]
    fn test_labels_match_legacy_dump_names() {
        assert_eq!(Peripheral::Wdt.label(), "WDT");
        assert_eq!(Peripheral::Couple.label(), "COUPLE");
        assert_eq!(Peripheral::Face0.label(), "Face0");
        assert_eq!(format!("{}", Peripheral::Tca), "TCA");
    }
}
