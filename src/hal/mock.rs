//! Scripted in-memory board for tests and the demo binary.
//!
//! [`MockBoard::new`] returns the board plus a [`BoardProbe`] sharing the
//! same state. Tests hand the board to the satellite, script readings and
//! failures through the probe, and assert on what the hardware saw. A
//! [`FailPoint`] stays armed until cleared, so a scripted fault hits every
//! touch of that point.

use crate::error::HalError;
use crate::hal::{
    Board, BusMux, CanTransceiver, DigitalIo, DriveMode, LedDriver, NonVolatileStore,
    PowerMonitor, PwmOut, RgbIndicator, ScanAddresses, TemperatureSensor, ThermocoupleAdc,
    LED_CHANNEL_COUNT, MUX_CHANNELS, MUX_OWN_ADDRESS,
};
use crate::nvm::NVM_LEN;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Every place the mock can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    LedDriverInit,
    RgbInit,
    PowerMonitorInit,
    SolarMonitorInit,
    TemperatureInit,
    ThermocoupleInit,
    MuxInit,
    CanInit,
    BurnPwmClaim,
    BurnPwmDuty,
    RelayWrite,
    VbusResetWrite,
    RgbWrite,
    LedChannel(u8),
    PowerRead,
    SolarRead,
    TemperatureRead,
    ThermocoupleRead,
    MuxScan,
}

/// Snapshot of one digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState {
    pub mode: DriveMode,
    pub high: bool,
    pub writes: u32,
}

impl Default for LineState {
    fn default() -> Self {
        Self {
            mode: DriveMode::OpenDrain,
            high: false,
            writes: 0,
        }
    }
}

/// Per-method read counts for one power monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReads {
    pub bus_voltage: u32,
    pub shunt_voltage: u32,
    pub current: u32,
}

impl MonitorReads {
    pub fn total(&self) -> u32 {
        self.bus_voltage + self.shunt_voltage + self.current
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LineId {
    Relay = 0,
    VbusReset = 1,
    I2cReset = 2,
    RadioEnable = 3,
    ChargeIndicator = 4,
}

#[derive(Clone, Copy)]
enum MonitorId {
    Battery,
    Solar,
}

#[derive(Clone, Copy)]
struct MonitorScript {
    bus_voltage: f32,
    shunt_voltage: f32,
    current: f32,
    reads: MonitorReads,
}

struct Shared {
    failures: Vec<FailPoint>,
    lines: [LineState; 5],
    led_duty: [u16; LED_CHANNEL_COUNT as usize],
    led_writes: Vec<(u8, u16)>,
    pwm_frequency_hz: u32,
    pwm_duty: u16,
    pwm_claims: u32,
    pwm_outstanding: bool,
    rgb: (u8, u8, u8),
    rgb_history: Vec<(u8, u8, u8)>,
    battery: MonitorScript,
    solar: MonitorScript,
    temperature_c: f32,
    temperature_reads: u32,
    thermocouple_voltage: f32,
    thermocouple_reads: u32,
    thermocouple_last_channel: Option<u8>,
    mux_map: [Vec<u8>; MUX_CHANNELS],
    mux_scans: Vec<u8>,
    can_loopback: bool,
    sleeps: Vec<Duration>,
}

impl Default for Shared {
    fn default() -> Self {
        let mut lines = [LineState::default(); 5];
        // Charger idle: indicator line sits high, is_charging reads false.
        lines[LineId::ChargeIndicator as usize].high = true;
        Self {
            failures: Vec::new(),
            lines,
            led_duty: [0; LED_CHANNEL_COUNT as usize],
            led_writes: Vec::new(),
            pwm_frequency_hz: 0,
            pwm_duty: 0,
            pwm_claims: 0,
            pwm_outstanding: false,
            rgb: (0, 0, 0),
            rgb_history: Vec::new(),
            battery: MonitorScript {
                bus_voltage: 7.4,
                shunt_voltage: 0.1,
                current: 0.25,
                reads: MonitorReads::default(),
            },
            solar: MonitorScript {
                bus_voltage: 5.0,
                shunt_voltage: 0.0,
                current: 0.3,
                reads: MonitorReads::default(),
            },
            temperature_c: 22.5,
            temperature_reads: 0,
            thermocouple_voltage: 1.35,
            thermocouple_reads: 0,
            thermocouple_last_channel: None,
            mux_map: std::array::from_fn(|_| vec![MUX_OWN_ADDRESS]),
            mux_scans: Vec::new(),
            // Flight configuration brings the transceiver up in loopback.
            can_loopback: true,
            sleeps: Vec::new(),
        }
    }
}

impl Shared {
    fn armed(&self, point: FailPoint) -> bool {
        self.failures.contains(&point)
    }
}

/// Standalone RAM-backed register file. Clones share the same cells, so a
/// test can keep one handle for assertions while the board owns another.
#[derive(Debug, Clone)]
pub struct RamNvm {
    cells: Rc<RefCell<Vec<u8>>>,
}

impl RamNvm {
    pub fn new() -> Self {
        Self::with_len(NVM_LEN)
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            cells: Rc::new(RefCell::new(vec![0; len])),
        }
    }

    pub fn cells(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.cells)
    }
}

impl Default for RamNvm {
    fn default() -> Self {
        Self::new()
    }
}

impl NonVolatileStore for RamNvm {
    fn read_byte(&self, index: usize) -> u8 {
        self.cells.borrow()[index]
    }

    fn write_byte(&mut self, index: usize, value: u8) {
        self.cells.borrow_mut()[index] = value;
    }

    fn len(&self) -> usize {
        self.cells.borrow().len()
    }
}

struct MockLine {
    shared: Rc<RefCell<Shared>>,
    id: LineId,
}

impl DigitalIo for MockLine {
    fn set_drive_mode(&mut self, mode: DriveMode) -> Result<(), HalError> {
        self.shared.borrow_mut().lines[self.id as usize].mode = mode;
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), HalError> {
        let mut shared = self.shared.borrow_mut();
        let point = match self.id {
            LineId::Relay => Some(FailPoint::RelayWrite),
            LineId::VbusReset => Some(FailPoint::VbusResetWrite),
            _ => None,
        };
        if let Some(point) = point {
            if shared.armed(point) {
                return Err(HalError::Gpio);
            }
        }
        let line = &mut shared.lines[self.id as usize];
        line.high = high;
        line.writes += 1;
        Ok(())
    }

    fn read(&self) -> bool {
        self.shared.borrow().lines[self.id as usize].high
    }
}

struct MockLedDriver {
    shared: Rc<RefCell<Shared>>,
}

impl LedDriver for MockLedDriver {
    fn set_channel_duty(&mut self, channel: u8, duty: u16) -> Result<(), HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::LedChannel(channel)) {
            return Err(HalError::I2c);
        }
        shared.led_duty[channel as usize] = duty;
        shared.led_writes.push((channel, duty));
        Ok(())
    }
}

struct MockPwm {
    shared: Rc<RefCell<Shared>>,
}

impl PwmOut for MockPwm {
    fn set_duty(&mut self, duty: u16) -> Result<(), HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::BurnPwmDuty) {
            return Err(HalError::Gpio);
        }
        shared.pwm_duty = duty;
        Ok(())
    }
}

impl Drop for MockPwm {
    fn drop(&mut self) {
        self.shared.borrow_mut().pwm_outstanding = false;
    }
}

struct MockMonitor {
    shared: Rc<RefCell<Shared>>,
    id: MonitorId,
}

impl MockMonitor {
    fn fail_point(&self) -> FailPoint {
        match self.id {
            MonitorId::Battery => FailPoint::PowerRead,
            MonitorId::Solar => FailPoint::SolarRead,
        }
    }
}

impl PowerMonitor for MockMonitor {
    fn bus_voltage(&mut self) -> Result<f32, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(self.fail_point()) {
            return Err(HalError::I2c);
        }
        let script = match self.id {
            MonitorId::Battery => &mut shared.battery,
            MonitorId::Solar => &mut shared.solar,
        };
        script.reads.bus_voltage += 1;
        Ok(script.bus_voltage)
    }

    fn shunt_voltage(&mut self) -> Result<f32, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(self.fail_point()) {
            return Err(HalError::I2c);
        }
        let script = match self.id {
            MonitorId::Battery => &mut shared.battery,
            MonitorId::Solar => &mut shared.solar,
        };
        script.reads.shunt_voltage += 1;
        Ok(script.shunt_voltage)
    }

    fn current(&mut self) -> Result<f32, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(self.fail_point()) {
            return Err(HalError::I2c);
        }
        let script = match self.id {
            MonitorId::Battery => &mut shared.battery,
            MonitorId::Solar => &mut shared.solar,
        };
        script.reads.current += 1;
        Ok(script.current)
    }
}

struct MockThermometer {
    shared: Rc<RefCell<Shared>>,
}

impl TemperatureSensor for MockThermometer {
    fn temperature_c(&mut self) -> Result<f32, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::TemperatureRead) {
            return Err(HalError::I2c);
        }
        shared.temperature_reads += 1;
        Ok(shared.temperature_c)
    }
}

struct MockThermocouple {
    shared: Rc<RefCell<Shared>>,
}

impl ThermocoupleAdc for MockThermocouple {
    fn channel_voltage(&mut self, channel: u8) -> Result<f32, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::ThermocoupleRead) {
            return Err(HalError::I2c);
        }
        shared.thermocouple_reads += 1;
        shared.thermocouple_last_channel = Some(channel);
        Ok(shared.thermocouple_voltage)
    }
}

struct MockMux {
    shared: Rc<RefCell<Shared>>,
}

impl BusMux for MockMux {
    fn scan(&mut self, channel: u8) -> Result<ScanAddresses, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::MuxScan) {
            return Err(HalError::Nack);
        }
        shared.mux_scans.push(channel);
        let mut found = ScanAddresses::new();
        for address in &shared.mux_map[channel as usize] {
            let _ = found.push(*address);
        }
        Ok(found)
    }
}

struct MockCan {
    shared: Rc<RefCell<Shared>>,
}

impl CanTransceiver for MockCan {
    fn in_loopback(&self) -> bool {
        self.shared.borrow().can_loopback
    }
}

struct MockRgb {
    shared: Rc<RefCell<Shared>>,
}

impl RgbIndicator for MockRgb {
    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::RgbWrite) {
            return Err(HalError::Gpio);
        }
        shared.rgb = (r, g, b);
        shared.rgb_history.push((r, g, b));
        Ok(())
    }
}

/// Simulated flight board.
pub struct MockBoard {
    shared: Rc<RefCell<Shared>>,
    nvm: RamNvm,
}

impl MockBoard {
    pub fn new() -> (MockBoard, BoardProbe) {
        let shared = Rc::new(RefCell::new(Shared::default()));
        let nvm = RamNvm::new();
        let probe = BoardProbe {
            shared: Rc::clone(&shared),
            nvm: nvm.clone(),
        };
        (MockBoard { shared, nvm }, probe)
    }

    fn line(&self, id: LineId) -> Box<dyn DigitalIo> {
        Box::new(MockLine {
            shared: Rc::clone(&self.shared),
            id,
        })
    }
}

impl Board for MockBoard {
    fn nonvolatile_store(&mut self) -> Box<dyn NonVolatileStore> {
        Box::new(self.nvm.clone())
    }

    fn burn_relay(&mut self) -> Box<dyn DigitalIo> {
        self.line(LineId::Relay)
    }

    fn vbus_reset_line(&mut self) -> Box<dyn DigitalIo> {
        self.line(LineId::VbusReset)
    }

    fn i2c_reset_line(&mut self) -> Box<dyn DigitalIo> {
        self.line(LineId::I2cReset)
    }

    fn radio_enable_line(&mut self) -> Box<dyn DigitalIo> {
        self.line(LineId::RadioEnable)
    }

    fn charge_indicator(&mut self) -> Box<dyn DigitalIo> {
        self.line(LineId::ChargeIndicator)
    }

    fn led_driver(&mut self) -> Result<Box<dyn LedDriver>, HalError> {
        if self.shared.borrow().armed(FailPoint::LedDriverInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockLedDriver {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn rgb_indicator(&mut self) -> Result<Box<dyn RgbIndicator>, HalError> {
        if self.shared.borrow().armed(FailPoint::RgbInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockRgb {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn power_monitor(&mut self) -> Result<Box<dyn PowerMonitor>, HalError> {
        if self.shared.borrow().armed(FailPoint::PowerMonitorInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockMonitor {
            shared: Rc::clone(&self.shared),
            id: MonitorId::Battery,
        }))
    }

    fn solar_monitor(&mut self) -> Result<Box<dyn PowerMonitor>, HalError> {
        if self.shared.borrow().armed(FailPoint::SolarMonitorInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockMonitor {
            shared: Rc::clone(&self.shared),
            id: MonitorId::Solar,
        }))
    }

    fn temperature_sensor(&mut self) -> Result<Box<dyn TemperatureSensor>, HalError> {
        if self.shared.borrow().armed(FailPoint::TemperatureInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockThermometer {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn thermocouple_adc(&mut self) -> Result<Box<dyn ThermocoupleAdc>, HalError> {
        if self.shared.borrow().armed(FailPoint::ThermocoupleInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockThermocouple {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn bus_mux(&mut self) -> Result<Box<dyn BusMux>, HalError> {
        if self.shared.borrow().armed(FailPoint::MuxInit) {
            return Err(HalError::InitFailed);
        }
        Ok(Box::new(MockMux {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn can_transceiver(&mut self) -> Result<Box<dyn CanTransceiver>, HalError> {
        if self.shared.borrow().armed(FailPoint::CanInit) {
            return Err(HalError::Spi);
        }
        Ok(Box::new(MockCan {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn claim_burn_pwm(&mut self, frequency_hz: u32) -> Result<Box<dyn PwmOut>, HalError> {
        let mut shared = self.shared.borrow_mut();
        if shared.armed(FailPoint::BurnPwmClaim) {
            return Err(HalError::PwmUnavailable);
        }
        shared.pwm_claims += 1;
        shared.pwm_outstanding = true;
        shared.pwm_duty = 0;
        shared.pwm_frequency_hz = frequency_hz;
        Ok(Box::new(MockPwm {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn sleep(&self, duration: Duration) {
        self.shared.borrow_mut().sleeps.push(duration);
    }
}

/// Test-side view of a [`MockBoard`]. All methods take `&self`; the probe
/// stays usable after the board moves into the satellite.
pub struct BoardProbe {
    shared: Rc<RefCell<Shared>>,
    nvm: RamNvm,
}

impl BoardProbe {
    pub fn fail(&self, point: FailPoint) {
        self.shared.borrow_mut().failures.push(point);
    }

    pub fn clear(&self, point: FailPoint) {
        self.shared.borrow_mut().failures.retain(|armed| *armed != point);
    }

    pub fn clear_failures(&self) {
        self.shared.borrow_mut().failures.clear();
    }

    pub fn relay(&self) -> LineState {
        self.shared.borrow().lines[LineId::Relay as usize]
    }

    pub fn vbus_reset(&self) -> LineState {
        self.shared.borrow().lines[LineId::VbusReset as usize]
    }

    pub fn i2c_reset(&self) -> LineState {
        self.shared.borrow().lines[LineId::I2cReset as usize]
    }

    pub fn radio_enable(&self) -> LineState {
        self.shared.borrow().lines[LineId::RadioEnable as usize]
    }

    /// Drive the charge-indicator input. Low means the charger is active.
    pub fn set_charge_line(&self, high: bool) {
        self.shared.borrow_mut().lines[LineId::ChargeIndicator as usize].high = high;
    }

    pub fn led_duty(&self, channel: u8) -> u16 {
        self.shared.borrow().led_duty[channel as usize]
    }

    /// Every `(channel, duty)` write the LED driver accepted, in order.
    pub fn led_writes(&self) -> Vec<(u8, u16)> {
        self.shared.borrow().led_writes.clone()
    }

    pub fn burn_pwm_claims(&self) -> u32 {
        self.shared.borrow().pwm_claims
    }

    /// True while a burn PWM handle is alive (claimed and not yet dropped).
    pub fn burn_pwm_outstanding(&self) -> bool {
        self.shared.borrow().pwm_outstanding
    }

    pub fn burn_pwm_duty(&self) -> u16 {
        self.shared.borrow().pwm_duty
    }

    pub fn burn_pwm_frequency(&self) -> u32 {
        self.shared.borrow().pwm_frequency_hz
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        self.shared.borrow().rgb
    }

    pub fn rgb_history(&self) -> Vec<(u8, u8, u8)> {
        self.shared.borrow().rgb_history.clone()
    }

    pub fn set_battery_readings(&self, bus_voltage: f32, shunt_voltage: f32, current: f32) {
        let mut shared = self.shared.borrow_mut();
        shared.battery.bus_voltage = bus_voltage;
        shared.battery.shunt_voltage = shunt_voltage;
        shared.battery.current = current;
    }

    pub fn set_solar_readings(&self, bus_voltage: f32, shunt_voltage: f32, current: f32) {
        let mut shared = self.shared.borrow_mut();
        shared.solar.bus_voltage = bus_voltage;
        shared.solar.shunt_voltage = shunt_voltage;
        shared.solar.current = current;
    }

    pub fn battery_reads(&self) -> MonitorReads {
        self.shared.borrow().battery.reads
    }

    pub fn solar_reads(&self) -> MonitorReads {
        self.shared.borrow().solar.reads
    }

    pub fn set_temperature(&self, celsius: f32) {
        self.shared.borrow_mut().temperature_c = celsius;
    }

    pub fn temperature_reads(&self) -> u32 {
        self.shared.borrow().temperature_reads
    }

    pub fn set_thermocouple_voltage(&self, volts: f32) {
        self.shared.borrow_mut().thermocouple_voltage = volts;
    }

    pub fn thermocouple_reads(&self) -> u32 {
        self.shared.borrow().thermocouple_reads
    }

    pub fn thermocouple_last_channel(&self) -> Option<u8> {
        self.shared.borrow().thermocouple_last_channel
    }

    pub fn set_mux_channel(&self, channel: u8, addresses: &[u8]) {
        self.shared.borrow_mut().mux_map[channel as usize] = addresses.to_vec();
    }

    /// Channels scanned, in order.
    pub fn mux_scans(&self) -> Vec<u8> {
        self.shared.borrow().mux_scans.clone()
    }

    pub fn set_can_loopback(&self, enabled: bool) {
        self.shared.borrow_mut().can_loopback = enabled;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.shared.borrow().sleeps.clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.shared.borrow().sleeps.iter().sum()
    }

    pub fn nvm_bytes(&self) -> Vec<u8> {
        self.nvm.cells().borrow().clone()
    }

    /// Preload one register before the satellite attaches, for simulating
    /// state left by a previous boot.
    pub fn seed_nvm(&self, index: usize, value: u8) {
        self.nvm.cells().borrow_mut()[index] = value;
    }
}
