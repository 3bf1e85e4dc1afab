use epsboard::hal::mock::{BoardProbe, FailPoint, MockBoard};
use epsboard::hal::{DriveMode, MUX_CHANNELS};
use epsboard::hardware::{Face, Peripheral};
use epsboard::satellite::PowerMode;
use epsboard::{BoardError, Satellite};
use std::time::Duration;

fn boot() -> (Satellite, BoardProbe) {
    let (board, probe) = MockBoard::new();
    let satellite = Satellite::initialize(Box::new(board)).unwrap();
    (satellite, probe)
}

#[test]
fn test_clean_boot_line_states() {
    let (_satellite, probe) = boot();

    // Burn relay and regulator reset idle open-drain low.
    assert_eq!(probe.relay().mode, DriveMode::OpenDrain);
    assert!(!probe.relay().high);
    assert_eq!(probe.vbus_reset().mode, DriveMode::OpenDrain);
    assert!(!probe.vbus_reset().high);

    // Sensor bus reset is held high, radio regulator enabled.
    assert_eq!(probe.i2c_reset().mode, DriveMode::PushPull);
    assert!(probe.i2c_reset().high);
    assert_eq!(probe.radio_enable().mode, DriveMode::PushPull);
    assert!(probe.radio_enable().high);
}

#[test]
fn test_clean_boot_powers_faces_and_indicator() {
    let (satellite, probe) = boot();

    for face in Face::ALL {
        assert!(satellite.face_powered(face));
        assert_eq!(probe.led_duty(face.channel()), 0xFFFF);
    }
    // First indicator write is the boot color.
    assert_eq!(probe.rgb_history().first(), Some(&(0, 0, 255)));
    assert_eq!(satellite.rgb(), (0, 0, 255));
}

#[test]
fn test_clean_boot_settles_before_each_monitor() {
    let (_satellite, probe) = boot();
    let sleeps = probe.sleeps();
    assert_eq!(sleeps, vec![Duration::from_secs(1), Duration::from_secs(1)]);
}

#[test]
fn test_clean_boot_scans_every_mux_channel_in_order() {
    let (satellite, probe) = boot();

    let scanned: Vec<u8> = (0..MUX_CHANNELS as u8).collect();
    assert_eq!(probe.mux_scans(), scanned);
    assert_eq!(satellite.mux_scan().channels.len(), MUX_CHANNELS);
}

#[test]
fn test_clean_boot_ends_in_normal_power_mode() {
    let (satellite, _probe) = boot();
    assert_eq!(satellite.power_mode(), PowerMode::Normal);
    assert_eq!(satellite.can_loopback(), Some(true));
    assert!(satellite.radio_enabled());
    assert!(satellite.faults().is_empty());
}

#[test]
fn test_led_driver_failure_takes_faces_and_heater_down() {
    let (board, probe) = MockBoard::new();
    probe.fail(FailPoint::LedDriverInit);
    let mut satellite = Satellite::initialize(Box::new(board)).unwrap();

    assert!(!satellite.hardware().is_available(Peripheral::Fld));
    for face in Face::ALL {
        assert!(!satellite.face_powered(face));
    }
    assert_eq!(
        satellite.set_face(Face::ZPlus, true),
        Err(BoardError::Unavailable(Peripheral::Fld))
    );
    assert_eq!(
        satellite.heater_on(),
        Err(BoardError::Unavailable(Peripheral::Fld))
    );

    // The rest of the board still came up.
    assert!(satellite.hardware().is_available(Peripheral::Pwr));
    assert!(satellite.battery_voltage().is_ok());
}

#[test]
fn test_mux_scan_fault_discards_census_and_degrades_tca() {
    let (board, probe) = MockBoard::new();
    probe.fail(FailPoint::MuxScan);
    let satellite = Satellite::initialize(Box::new(board)).unwrap();

    assert!(!satellite.hardware().is_available(Peripheral::Tca));
    assert!(satellite.mux_scan().channels.is_empty());
    assert_eq!(satellite.faults().last().unwrap().device, "bus mux");

    // Later bring-up steps were unaffected.
    assert!(satellite.hardware().is_available(Peripheral::Can));
}

#[test]
fn test_multiple_failures_each_land_in_fault_log() {
    let (board, probe) = MockBoard::new();
    probe.fail(FailPoint::PowerMonitorInit);
    probe.fail(FailPoint::ThermocoupleInit);
    let satellite = Satellite::initialize(Box::new(board)).unwrap();

    let report = satellite.hardware_report();
    assert_eq!(report.total - report.available, 3); // Wdt + Pwr + Couple

    let devices: Vec<&str> = satellite.faults().iter().map(|f| f.device).collect();
    assert_eq!(devices, vec!["power monitor", "thermocouple adc"]);
}

#[test]
fn test_reinitialize_power_monitor_after_fault_clears() {
    let (board, probe) = MockBoard::new();
    probe.fail(FailPoint::PowerMonitorInit);
    let mut satellite = Satellite::initialize(Box::new(board)).unwrap();
    assert!(!satellite.hardware().is_available(Peripheral::Pwr));

    // Still failing: reinit reports the peripheral as unavailable.
    assert_eq!(
        satellite.reinitialize(Peripheral::Pwr),
        Err(BoardError::Unavailable(Peripheral::Pwr))
    );

    probe.clear(FailPoint::PowerMonitorInit);
    satellite.reinitialize(Peripheral::Pwr).unwrap();
    assert!(satellite.hardware().is_available(Peripheral::Pwr));
    assert!(satellite.battery_voltage().is_ok());
}

#[test]
fn test_face_sweep_isolates_single_bad_channel() {
    let (mut satellite, probe) = boot();
    probe.fail(FailPoint::LedChannel(Face::XMinus.channel()));

    satellite.all_faces_off();

    // Every healthy face was still visited and de-powered.
    for face in [Face::ZPlus, Face::ZMinus, Face::YPlus, Face::XPlus] {
        assert!(!satellite.face_powered(face));
        assert_eq!(probe.led_duty(face.channel()), 0);
    }
    // The faulted face keeps its previous table entry and recorded a fault.
    assert!(satellite.face_powered(Face::XMinus));
    assert_eq!(probe.led_duty(Face::XMinus.channel()), 0xFFFF);
    assert_eq!(satellite.faults().last().unwrap().device, "face driver");
}

#[test]
fn test_face_off_settles_between_channels() {
    let (mut satellite, probe) = boot();
    let before = probe.sleeps().len();

    satellite.all_faces_off();

    let sleeps = probe.sleeps();
    assert_eq!(sleeps.len() - before, Face::ALL.len());
    assert!(sleeps[before..]
        .iter()
        .all(|pause| *pause == Duration::from_millis(100)));
}

#[test]
fn test_vbus_reset_drives_line_high_push_pull() {
    let (mut satellite, probe) = boot();

    satellite.reset_vbus().unwrap();

    assert_eq!(probe.vbus_reset().mode, DriveMode::PushPull);
    assert!(probe.vbus_reset().high);
}

#[test]
fn test_is_charging_follows_indicator_line() {
    let (satellite, probe) = boot();

    // Indicator idles high: not charging.
    assert!(!satellite.is_charging());

    probe.set_charge_line(false);
    assert!(satellite.is_charging());
}

#[test]
fn test_radio_regulator_toggle() {
    let (mut satellite, probe) = boot();
    assert!(probe.radio_enable().high);

    satellite.set_radio_enabled(false).unwrap();
    assert!(!probe.radio_enable().high);
    assert!(!satellite.radio_enabled());

    satellite.set_radio_enabled(true).unwrap();
    assert!(satellite.radio_enabled());
}

#[test]
fn test_rgb_failure_at_boot_leaves_indicator_unavailable() {
    let (board, probe) = MockBoard::new();
    probe.fail(FailPoint::RgbInit);
    let mut satellite = Satellite::initialize(Box::new(board)).unwrap();

    assert!(!satellite.hardware().is_available(Peripheral::Neo));
    assert!(probe.rgb_history().is_empty());
    assert_eq!(
        satellite.set_rgb(10, 20, 30),
        Err(BoardError::Unavailable(Peripheral::Neo))
    );
}
