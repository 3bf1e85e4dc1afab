//! Board aggregate and peripheral bring-up.
//!
//! [`Satellite::initialize`] consumes a [`Board`], attaches the persistent
//! registers, applies boot corrections, then walks the bring-up sequence.
//! Every step runs through one wrapper: a failed step logs a warning,
//! records a fault, leaves the capability entry false and moves on. A board
//! with a dead sensor still boots; callers find out through the capability
//! table and per-call errors.

use crate::error::{BoardError, HalError, InitError};
use crate::fault::{FaultKind, FaultLog, FaultRecord};
use crate::hal::{
    Board, BusMux, CanTransceiver, DigitalIo, DriveMode, LedDriver, PowerMonitor, RgbIndicator,
    ScanAddresses, TemperatureSensor, ThermocoupleAdc, MUX_CHANNELS, MUX_OWN_ADDRESS,
};
use crate::hardware::{
    Face, HardwareReport, HardwareTable, Peripheral, FACE_COUNT, HEATER_CHANNEL,
};
use crate::nvm::{Counters, NvmSnapshot, BOOT_COUNT_RESET_THRESHOLD};
use arrayvec::ArrayString;
use heapless::Vec;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Power monitors need this long on the bus before first contact.
const MONITOR_SETTLE: Duration = Duration::from_secs(1);
/// Pause between face channels while de-powering.
const FACE_OFF_SETTLE: Duration = Duration::from_millis(100);
/// Full-on duty for a face panel.
const FACE_ON_DUTY: u16 = 0xFFFF;
/// Indicator color after a clean boot.
const BOOT_COLOR: (u8, u8, u8) = (0, 0, 255);

// Flight operating thresholds. Values are the flight-tuned originals;
// NORMAL_BATTERY_TEMP_C is the on-orbit setting, not the bench one.
pub const NORMAL_TEMP_C: f32 = 20.0;
pub const NORMAL_BATTERY_TEMP_C: f32 = 1.0;
pub const NORMAL_MICRO_TEMP_C: f32 = 20.0;
pub const NORMAL_CHARGE_CURRENT_A: f32 = 0.5;
pub const NORMAL_BATTERY_VOLTAGE_V: f32 = 6.9;
pub const CRITICAL_BATTERY_VOLTAGE_V: f32 = 6.6;

/// Operating envelope the flight loop selects from battery state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerMode {
    Critical,
    Minimum,
    Normal,
    Maximum,
}

/// Result of probing one mux channel during bring-up. The mux's own bus
/// address is already filtered out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelScan {
    pub channel: u8,
    pub addresses: ScanAddresses,
}

/// Per-channel device census taken while the mux initialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MuxScanReport {
    pub channels: Vec<ChannelScan, MUX_CHANNELS>,
}

impl MuxScanReport {
    /// One-line census summary, bounded so it can ride a log or downlink
    /// frame without allocating.
    pub fn describe(&self) -> ArrayString<256> {
        let mut out = ArrayString::new();
        for scan in &self.channels {
            if !out.is_empty() {
                let _ = out.try_push_str("; ");
            }
            let _ = write!(out, "ch{}:", scan.channel);
            if scan.addresses.is_empty() {
                let _ = out.try_push_str(" -");
            } else {
                for address in &scan.addresses {
                    let _ = write!(out, " {:#04x}", address);
                }
            }
        }
        out
    }
}

/// State of one face panel output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceStatus {
    pub face: Face,
    pub channel: u8,
    pub duty: u16,
    pub powered: bool,
}

/// Owns the LED driver handle plus the commanded duty per face. The heater
/// FET rides the same driver on its reserved channel.
pub(crate) struct FaceBank {
    driver: Box<dyn LedDriver>,
    duties: [u16; FACE_COUNT],
}

impl FaceBank {
    fn new(driver: Box<dyn LedDriver>) -> Self {
        Self {
            driver,
            duties: [0; FACE_COUNT],
        }
    }

    fn set_face_duty(&mut self, face: Face, duty: u16) -> Result<(), HalError> {
        self.driver.set_channel_duty(face.channel(), duty)?;
        self.duties[face.channel() as usize] = duty;
        Ok(())
    }

    fn face_duty(&self, face: Face) -> u16 {
        self.duties[face.channel() as usize]
    }

    pub(crate) fn set_heater_duty(&mut self, duty: u16) -> Result<(), HalError> {
        self.driver.set_channel_duty(HEATER_CHANNEL, duty)
    }
}

/// The flight board. One instance per process, exclusive owner of the burn
/// relay, the face driver and the persistent registers.
pub struct Satellite {
    pub(crate) board: Box<dyn Board>,
    pub(crate) counters: Counters,
    pub(crate) table: HardwareTable,
    pub(crate) faults: FaultLog,
    pub(crate) start_time: Instant,

    // Control lines, claimed unconditionally.
    pub(crate) relay: Box<dyn DigitalIo>,
    vbus_reset: Box<dyn DigitalIo>,
    i2c_reset: Box<dyn DigitalIo>,
    radio_enable: Box<dyn DigitalIo>,
    charge_indicator: Box<dyn DigitalIo>,

    // Bus-backed handles, present exactly when the capability entry is true.
    pub(crate) faces: Option<FaceBank>,
    rgb: Option<Box<dyn RgbIndicator>>,
    pub(crate) power: Option<Box<dyn PowerMonitor>>,
    pub(crate) solar: Option<Box<dyn PowerMonitor>>,
    pub(crate) thermometer: Option<Box<dyn TemperatureSensor>>,
    pub(crate) thermocouple: Option<Box<dyn ThermocoupleAdc>>,
    can: Option<Box<dyn CanTransceiver>>,

    rgb_color: (u8, u8, u8),
    radio_on: bool,
    power_mode: PowerMode,
    pub(crate) heating: bool,
    scan_report: MuxScanReport,
}

impl Satellite {
    /// Bring up the whole board.
    ///
    /// Fails only when the non-volatile store cannot hold the register map.
    /// Peripheral failures never propagate out of here; they degrade the
    /// capability table and land in the fault log.
    pub fn initialize(mut board: Box<dyn Board>) -> Result<Satellite, InitError> {
        let start_time = Instant::now();

        let mut counters = Counters::attach(board.nonvolatile_store())?;
        let corrections = counters.apply_boot_corrections();
        if corrections.boot_count_cleared {
            info!(
                "boot counter exceeded {}, reset to 0",
                BOOT_COUNT_RESET_THRESHOLD
            );
        }
        if corrections.soft_boot_observed {
            info!("previous boot was soft");
        }
        info!("boot count: {}", counters.boot_count());

        let relay = board.burn_relay();
        let vbus_reset = board.vbus_reset_line();
        let i2c_reset = board.i2c_reset_line();
        let radio_enable = board.radio_enable_line();
        let charge_indicator = board.charge_indicator();

        let mut satellite = Satellite {
            board,
            counters,
            table: HardwareTable::new(),
            faults: FaultLog::new(),
            start_time,
            relay,
            vbus_reset,
            i2c_reset,
            radio_enable,
            charge_indicator,
            faces: None,
            rgb: None,
            power: None,
            solar: None,
            thermometer: None,
            thermocouple: None,
            can: None,
            rgb_color: (0, 0, 0),
            radio_on: false,
            power_mode: PowerMode::Minimum,
            heating: false,
            scan_report: MuxScanReport::default(),
        };
        satellite.run_bring_up();
        Ok(satellite)
    }

    fn run_bring_up(&mut self) {
        // Burn relay and regulator reset idle open-drain low.
        if let Err(e) = drive_line(self.relay.as_mut(), DriveMode::OpenDrain, false) {
            self.note_fault(FaultKind::Control, "burn relay", e);
        }
        if let Err(e) = drive_line(self.vbus_reset.as_mut(), DriveMode::OpenDrain, false) {
            self.note_fault(FaultKind::Control, "vbus reset", e);
        }

        // Face LED driver, then the faces it feeds.
        self.faces = bring_up(
            Peripheral::Fld,
            "led driver",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.led_driver(),
        )
        .map(FaceBank::new);
        self.all_faces_on();

        // Sensor bus reset line is held high; pulling it low resets the bus.
        if let Err(e) = drive_line(self.i2c_reset.as_mut(), DriveMode::PushPull, true) {
            self.note_fault(FaultKind::Control, "i2c reset", e);
        }

        // Radio regulator enabled at boot (U7 fit).
        match drive_line(self.radio_enable.as_mut(), DriveMode::PushPull, true) {
            Ok(()) => self.radio_on = true,
            Err(e) => self.note_fault(FaultKind::Control, "radio enable", e),
        }

        if self.table.is_available(Peripheral::Fld) {
            debug!("battery heater on led channel {}", HEATER_CHANNEL);
        }

        // Status indicator, blue once alive.
        self.rgb = bring_up(
            Peripheral::Neo,
            "rgb indicator",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.rgb_indicator(),
        );
        if self.rgb.is_some() {
            self.indicate(BOOT_COLOR);
        }

        // Power monitors need a settle delay before first bus contact.
        self.board.sleep(MONITOR_SETTLE);
        self.power = bring_up(
            Peripheral::Pwr,
            "power monitor",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.power_monitor(),
        );
        self.board.sleep(MONITOR_SETTLE);
        self.solar = bring_up(
            Peripheral::Solar,
            "solar monitor",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.solar_monitor(),
        );

        self.thermometer = bring_up(
            Peripheral::Temp,
            "temperature sensor",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.temperature_sensor(),
        );
        self.thermocouple = bring_up(
            Peripheral::Couple,
            "thermocouple adc",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.thermocouple_adc(),
        );

        // Face-sensor mux, with a channel census for the deployment report.
        let mux = bring_up(
            Peripheral::Tca,
            "bus mux",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.bus_mux(),
        );
        if let Some(mut mux) = mux {
            match scan_mux(mux.as_mut()) {
                Ok(report) => {
                    debug!("mux census: {}", report.describe());
                    self.scan_report = report;
                }
                Err(e) => {
                    warn!("mux channel scan failed: {}", e);
                    self.table.mark_unavailable(Peripheral::Tca);
                    self.note_fault(FaultKind::BringUp, "bus mux", e);
                }
            }
        }

        // Transceiver comes up in loopback for self-test.
        self.can = bring_up(
            Peripheral::Can,
            "can transceiver",
            &mut self.table,
            &mut self.faults,
            self.start_time,
            || self.board.can_transceiver(),
        );

        let report = self.table.report();
        info!(
            "bring-up complete: {}/{} peripherals available",
            report.available, report.total
        );
        self.power_mode = PowerMode::Normal;
    }

    /// Re-run one peripheral's factory after a runtime failure.
    ///
    /// Only the recovery set the flight software actually services is
    /// supported: the battery power monitor and the face LED driver.
    pub fn reinitialize(&mut self, peripheral: Peripheral) -> Result<(), BoardError> {
        match peripheral {
            Peripheral::Pwr => {
                self.power = bring_up(
                    Peripheral::Pwr,
                    "power monitor",
                    &mut self.table,
                    &mut self.faults,
                    self.start_time,
                    || self.board.power_monitor(),
                );
                if self.power.is_some() {
                    Ok(())
                } else {
                    Err(BoardError::Unavailable(Peripheral::Pwr))
                }
            }
            Peripheral::Fld => {
                self.faces = bring_up(
                    Peripheral::Fld,
                    "led driver",
                    &mut self.table,
                    &mut self.faults,
                    self.start_time,
                    || self.board.led_driver(),
                )
                .map(FaceBank::new);
                if self.faces.is_some() {
                    Ok(())
                } else {
                    Err(BoardError::Unavailable(Peripheral::Fld))
                }
            }
            other => {
                warn!("reinit not supported for {}", other);
                Err(BoardError::UnsupportedReinit(other))
            }
        }
    }

    /// Power every face panel at full duty.
    ///
    /// Channels come up in ascending order; simultaneous inrush from
    /// several panels has browned out the controller before. A face that
    /// faults is marked unavailable and the sweep continues.
    pub fn all_faces_on(&mut self) {
        let Some(bank) = self.faces.as_mut() else {
            warn!("led driver not initialized");
            return;
        };
        for face in Face::ALL {
            match bank.set_face_duty(face, FACE_ON_DUTY) {
                Ok(()) => {
                    self.table.mark_available(face.peripheral());
                    debug!("{} face powered", face.axis());
                }
                Err(e) => {
                    warn!("{} face power-on failed: {}", face.axis(), e);
                    self.table.mark_unavailable(face.peripheral());
                    self.faults.record(
                        FaultKind::Actuation,
                        "face driver",
                        e,
                        elapsed_ms(self.start_time),
                    );
                }
            }
        }
    }

    /// De-power every face panel, ascending, with a settle pause between
    /// channels. A faulted face keeps its previous table entry; the sweep
    /// still visits the remaining faces.
    pub fn all_faces_off(&mut self) {
        let Some(bank) = self.faces.as_mut() else {
            warn!("led driver not initialized");
            return;
        };
        for face in Face::ALL {
            match bank.set_face_duty(face, 0x0000) {
                Ok(()) => {
                    self.board.sleep(FACE_OFF_SETTLE);
                    self.table.mark_unavailable(face.peripheral());
                    debug!("{} face unpowered", face.axis());
                }
                Err(e) => {
                    warn!("{} face power-off failed: {}", face.axis(), e);
                    self.faults.record(
                        FaultKind::Actuation,
                        "face driver",
                        e,
                        elapsed_ms(self.start_time),
                    );
                }
            }
        }
    }

    /// Power or de-power a single face panel.
    pub fn set_face(&mut self, face: Face, powered: bool) -> Result<(), BoardError> {
        let Some(bank) = self.faces.as_mut() else {
            warn!("led driver not initialized");
            return Err(BoardError::Unavailable(Peripheral::Fld));
        };
        let duty = if powered { FACE_ON_DUTY } else { 0x0000 };
        match bank.set_face_duty(face, duty) {
            Ok(()) => {
                if powered {
                    self.table.mark_available(face.peripheral());
                    debug!("{} face powered", face.axis());
                } else {
                    self.table.mark_unavailable(face.peripheral());
                    debug!("{} face unpowered", face.axis());
                }
                Ok(())
            }
            Err(e) => {
                warn!("{} face switch failed: {}", face.axis(), e);
                if powered {
                    self.table.mark_unavailable(face.peripheral());
                }
                self.faults.record(
                    FaultKind::Actuation,
                    "face driver",
                    e,
                    elapsed_ms(self.start_time),
                );
                Err(BoardError::Transient {
                    device: "face driver",
                    source: e,
                })
            }
        }
    }

    pub fn face_powered(&self, face: Face) -> bool {
        self.table.is_available(face.peripheral())
    }

    pub fn face_statuses(&self) -> Vec<FaceStatus, FACE_COUNT> {
        let mut out = Vec::new();
        if let Some(bank) = self.faces.as_ref() {
            for face in Face::ALL {
                let _ = out.push(FaceStatus {
                    face,
                    channel: face.channel(),
                    duty: bank.face_duty(face),
                    powered: self.table.is_available(face.peripheral()),
                });
            }
        }
        out
    }

    /// Pulse the VBUS regulator reset line high.
    pub fn reset_vbus(&mut self) -> Result<(), BoardError> {
        match drive_line(self.vbus_reset.as_mut(), DriveMode::PushPull, true) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("vbus reset fault: {}", e);
                self.note_fault(FaultKind::Control, "vbus reset", e);
                Err(BoardError::Transient {
                    device: "vbus reset",
                    source: e,
                })
            }
        }
    }

    /// Charger activity, read straight off the indicator line (active low).
    pub fn is_charging(&self) -> bool {
        !self.charge_indicator.read()
    }

    pub fn set_radio_enabled(&mut self, enabled: bool) -> Result<(), BoardError> {
        match self.radio_enable.write(enabled) {
            Ok(()) => {
                self.radio_on = enabled;
                debug!("radio regulator {}", if enabled { "enabled" } else { "disabled" });
                Ok(())
            }
            Err(e) => {
                warn!("radio enable fault: {}", e);
                self.note_fault(FaultKind::Control, "radio enable", e);
                Err(BoardError::Transient {
                    device: "radio enable",
                    source: e,
                })
            }
        }
    }

    pub fn radio_enabled(&self) -> bool {
        self.radio_on
    }

    /// Command the status indicator.
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), BoardError> {
        let Some(rgb) = self.rgb.as_mut() else {
            warn!("rgb indicator not initialized");
            return Err(BoardError::Unavailable(Peripheral::Neo));
        };
        match rgb.set_color(r, g, b) {
            Ok(()) => {
                self.rgb_color = (r, g, b);
                Ok(())
            }
            Err(e) => {
                warn!("rgb indicator fault: {}", e);
                self.faults.record(
                    FaultKind::Control,
                    "rgb indicator",
                    e,
                    elapsed_ms(self.start_time),
                );
                Err(BoardError::Transient {
                    device: "rgb indicator",
                    source: e,
                })
            }
        }
    }

    /// Last color the indicator was commanded to.
    pub fn rgb(&self) -> (u8, u8, u8) {
        self.rgb_color
    }

    /// Best-effort indicator write for actuation sequences. A missing or
    /// faulted indicator must never abort a burn, so failures only land in
    /// the fault log.
    pub(crate) fn indicate(&mut self, color: (u8, u8, u8)) {
        let Some(rgb) = self.rgb.as_mut() else {
            return;
        };
        match rgb.set_color(color.0, color.1, color.2) {
            Ok(()) => self.rgb_color = color,
            Err(e) => {
                warn!("rgb indicator fault: {}", e);
                self.faults.record(
                    FaultKind::Control,
                    "rgb indicator",
                    e,
                    elapsed_ms(self.start_time),
                );
            }
        }
    }

    pub fn power_mode(&self) -> PowerMode {
        self.power_mode
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) {
        debug!("power mode: {:?}", mode);
        self.power_mode = mode;
    }

    pub fn can_loopback(&self) -> Option<bool> {
        self.can.as_ref().map(|can| can.in_loopback())
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub(crate) fn uptime_millis(&self) -> u64 {
        elapsed_ms(self.start_time)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    pub fn hardware(&self) -> &HardwareTable {
        &self.table
    }

    pub fn hardware_report(&self) -> HardwareReport {
        self.table.report()
    }

    pub fn nvm_snapshot(&self) -> NvmSnapshot {
        self.counters.snapshot()
    }

    pub fn mux_scan(&self) -> &MuxScanReport {
        &self.scan_report
    }

    pub fn faults(&self) -> &[FaultRecord] {
        self.faults.history()
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    pub fn is_heating(&self) -> bool {
        self.heating
    }

    pub(crate) fn note_fault(&mut self, kind: FaultKind, device: &'static str, error: HalError) {
        let uptime = elapsed_ms(self.start_time);
        self.faults.record(kind, device, error, uptime);
    }
}

/// Uniform bring-up step: run the factory, record the outcome, never
/// propagate.
fn bring_up<T>(
    peripheral: Peripheral,
    device: &'static str,
    table: &mut HardwareTable,
    faults: &mut FaultLog,
    start_time: Instant,
    factory: impl FnOnce() -> Result<T, HalError>,
) -> Option<T> {
    match factory() {
        Ok(handle) => {
            table.mark_available(peripheral);
            debug!("{} initialized", device);
            Some(handle)
        }
        Err(e) => {
            warn!("{} unavailable: {}", device, e);
            table.mark_unavailable(peripheral);
            faults.record(FaultKind::BringUp, device, e, elapsed_ms(start_time));
            None
        }
    }
}

fn scan_mux(mux: &mut dyn BusMux) -> Result<MuxScanReport, HalError> {
    let mut report = MuxScanReport::default();
    for channel in 0..MUX_CHANNELS as u8 {
        let found = mux.scan(channel)?;
        let mut addresses = ScanAddresses::new();
        for address in found {
            if address != MUX_OWN_ADDRESS {
                let _ = addresses.push(address);
            }
        }
        let _ = report.channels.push(ChannelScan { channel, addresses });
    }
    Ok(report)
}

fn drive_line(line: &mut dyn DigitalIo, mode: DriveMode, high: bool) -> Result<(), HalError> {
    line.set_drive_mode(mode)?;
    line.write(high)
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{FailPoint, MockBoard};

    fn boot() -> (Satellite, crate::hal::mock::BoardProbe) {
        let (board, probe) = MockBoard::new();
        let satellite = Satellite::initialize(Box::new(board)).unwrap();
        (satellite, probe)
    }

    #[test]
    fn test_clean_boot_marks_expected_capabilities() {
        let (satellite, _probe) = boot();
        let table = satellite.hardware();

        for peripheral in [
            Peripheral::Fld,
            Peripheral::Neo,
            Peripheral::Pwr,
            Peripheral::Solar,
            Peripheral::Temp,
            Peripheral::Couple,
            Peripheral::Tca,
            Peripheral::Can,
        ] {
            assert!(table.is_available(peripheral), "{} missing", peripheral);
        }
        for face in Face::ALL {
            assert!(table.is_available(face.peripheral()));
        }
        // No watchdog on this revision.
        assert!(!table.is_available(Peripheral::Wdt));
        assert_eq!(satellite.power_mode(), PowerMode::Normal);
    }

    #[test]
    fn test_failed_step_degrades_and_boot_continues() {
        let (board, probe) = MockBoard::new();
        probe.fail(FailPoint::PowerMonitorInit);

        let satellite = Satellite::initialize(Box::new(board)).unwrap();
        assert!(!satellite.hardware().is_available(Peripheral::Pwr));
        // Later steps still came up.
        assert!(satellite.hardware().is_available(Peripheral::Solar));
        assert!(satellite.hardware().is_available(Peripheral::Can));
        assert_eq!(satellite.faults().len(), 1);
        assert_eq!(satellite.faults()[0].device, "power monitor");
    }

    #[test]
    fn test_face_bank_tracks_commanded_duty() {
        let (mut satellite, probe) = boot();

        satellite.set_face(Face::YPlus, false).unwrap();
        let statuses = satellite.face_statuses();
        assert_eq!(statuses[Face::YPlus.channel() as usize].duty, 0);
        assert!(!statuses[Face::YPlus.channel() as usize].powered);
        assert_eq!(probe.led_duty(Face::YPlus.channel()), 0);

        satellite.set_face(Face::YPlus, true).unwrap();
        assert_eq!(probe.led_duty(Face::YPlus.channel()), FACE_ON_DUTY);
    }

    #[test]
    fn test_mux_scan_filters_own_address() {
        let (board, probe) = MockBoard::new();
        probe.set_mux_channel(2, &[MUX_OWN_ADDRESS, 0x48, 0x69]);

        let satellite = Satellite::initialize(Box::new(board)).unwrap();
        let report = satellite.mux_scan();
        assert_eq!(report.channels.len(), MUX_CHANNELS);
        let channel = &report.channels[2];
        assert_eq!(channel.addresses.as_slice(), &[0x48, 0x69]);
        assert!(report.describe().contains("ch2: 0x48 0x69"));
    }

    #[test]
    fn test_reinitialize_rejects_unsupported_peripheral() {
        let (mut satellite, _probe) = boot();
        assert_eq!(
            satellite.reinitialize(Peripheral::Can),
            Err(BoardError::UnsupportedReinit(Peripheral::Can))
        );
    }
}
