use epsboard::error::HalError;
use epsboard::fault::FaultKind;
use epsboard::hal::mock::{BoardProbe, FailPoint, MockBoard};
use epsboard::hardware::Peripheral;
use epsboard::{BoardError, Satellite};

const SAMPLES: u32 = 50;

fn boot() -> (Satellite, BoardProbe) {
    let (board, probe) = MockBoard::new();
    let satellite = Satellite::initialize(Box::new(board)).unwrap();
    (satellite, probe)
}

#[test]
fn test_battery_voltage_averages_fifty_samples_with_offset() {
    let (mut satellite, probe) = boot();
    probe.set_battery_readings(5.0, 0.2, 0.1);

    let volts = satellite.battery_voltage().unwrap();

    assert!((volts - 5.2).abs() < 1e-5);
    assert_eq!(probe.battery_reads().bus_voltage, SAMPLES);
    assert_eq!(probe.battery_reads().shunt_voltage, 0);
}

#[test]
fn test_system_voltage_sums_bus_and_shunt_without_offset() {
    let (mut satellite, probe) = boot();
    probe.set_battery_readings(7.0, 0.15, 0.1);

    let volts = satellite.system_voltage().unwrap();

    assert!((volts - 7.15).abs() < 1e-4);
    assert_eq!(probe.battery_reads().bus_voltage, SAMPLES);
    assert_eq!(probe.battery_reads().shunt_voltage, SAMPLES);
}

#[test]
fn test_current_draw_averages_battery_monitor() {
    let (mut satellite, probe) = boot();
    probe.set_battery_readings(7.4, 0.1, 0.42);

    let amps = satellite.current_draw().unwrap();

    assert!((amps - 0.42).abs() < 1e-5);
    assert_eq!(probe.battery_reads().current, SAMPLES);
}

#[test]
fn test_charge_readings_come_from_solar_monitor() {
    let (mut satellite, probe) = boot();
    probe.set_solar_readings(4.8, 0.0, 0.31);

    let volts = satellite.charge_voltage().unwrap();
    let amps = satellite.charge_current().unwrap();

    assert!((volts - 5.0).abs() < 1e-5);
    assert!((amps - 0.31).abs() < 1e-5);
    assert_eq!(probe.solar_reads().bus_voltage, SAMPLES);
    assert_eq!(probe.solar_reads().current, SAMPLES);
    // The battery monitor was never involved.
    assert_eq!(probe.battery_reads().total(), 0);
}

#[test]
fn test_absent_monitor_reports_unavailable_with_zero_bus_traffic() {
    let (board, probe) = MockBoard::new();
    probe.fail(FailPoint::PowerMonitorInit);
    let mut satellite = Satellite::initialize(Box::new(board)).unwrap();

    assert_eq!(
        satellite.battery_voltage(),
        Err(BoardError::Unavailable(Peripheral::Pwr))
    );
    assert_eq!(
        satellite.system_voltage(),
        Err(BoardError::Unavailable(Peripheral::Pwr))
    );
    assert_eq!(
        satellite.current_draw(),
        Err(BoardError::Unavailable(Peripheral::Pwr))
    );
    assert_eq!(probe.battery_reads().total(), 0);
}

#[test]
fn test_read_fault_is_transient_and_keeps_peripheral_present() {
    let (mut satellite, probe) = boot();
    probe.fail(FailPoint::PowerRead);

    let result = satellite.battery_voltage();
    assert_eq!(
        result,
        Err(BoardError::Transient {
            device: "power monitor",
            source: HalError::I2c,
        })
    );

    // Still marked present so the next call can retry.
    assert!(satellite.hardware().is_available(Peripheral::Pwr));
    let fault = satellite.faults().last().unwrap();
    assert_eq!(fault.kind, FaultKind::Telemetry);
    assert_eq!(fault.device, "power monitor");

    // And the retry succeeds once the fault clears.
    probe.clear(FailPoint::PowerRead);
    assert!(satellite.battery_voltage().is_ok());
}

#[test]
fn test_internal_temperature_is_a_single_read() {
    let (mut satellite, probe) = boot();
    probe.set_temperature(30.5);

    let celsius = satellite.internal_temperature().unwrap();

    assert!((celsius - 30.5).abs() < 1e-5);
    assert_eq!(probe.temperature_reads(), 1);
}

#[test]
fn test_battery_temperature_converts_thermocouple_voltage() {
    let (mut satellite, probe) = boot();
    // 1.25 V is the zero point; 5 mV per degree.
    probe.set_thermocouple_voltage(1.25);
    assert!(satellite.battery_temperature().unwrap().abs() < 1e-3);

    probe.set_thermocouple_voltage(1.4);
    let celsius = satellite.battery_temperature().unwrap();
    assert!((celsius - 30.0).abs() < 1e-2);
    assert_eq!(probe.thermocouple_last_channel(), Some(1));
}

#[test]
fn test_snapshot_degrades_per_reading() {
    let (mut satellite, probe) = boot();
    probe.fail(FailPoint::SolarRead);
    probe.set_charge_line(false);

    let frame = satellite.telemetry_snapshot();

    assert!(frame.charge_voltage.is_none());
    assert!(frame.charge_current.is_none());
    // Battery side unaffected by the solar fault.
    assert!(frame.battery_voltage.is_some());
    assert!(frame.internal_temperature.is_some());
    assert!(frame.is_charging);
    assert_eq!(frame.boot_count, 0);
}

#[test]
fn test_snapshot_serializes_for_downlink() {
    let (mut satellite, _probe) = boot();
    let frame = satellite.telemetry_snapshot();

    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("\"battery_voltage\":"));
    assert!(json.contains("\"power_mode\":\"Normal\""));
    assert!(json.contains("\"arm_state\":\"Disarmed\""));
}
