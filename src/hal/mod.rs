//! Hardware interfaces the flight code drives.
//!
//! Each trait covers exactly the surface the board logic needs from one
//! device class; wire protocols and register maps live behind the
//! implementations. Line claims on a [`Board`] are infallible (the pins
//! exist by construction), bus-backed drivers return `Result` because the
//! device may be absent or unresponsive.

use crate::error::HalError;
use std::time::Duration;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Channels behind the face-sensor I2C multiplexer.
pub const MUX_CHANNELS: usize = 8;

/// The multiplexer answers on its own address during a channel scan and must
/// be filtered out of the results.
pub const MUX_OWN_ADDRESS: u8 = 0x70;

/// Outputs on the face LED driver.
pub const LED_CHANNEL_COUNT: u8 = 16;

/// Addresses one channel scan can report.
pub const MAX_SCAN_ADDRESSES: usize = 16;

pub type ScanAddresses = heapless::Vec<u8, MAX_SCAN_ADDRESSES>;

/// Persistent byte-addressable register file. Reads and writes cannot fail;
/// a store that loses power mid-write may drop that write only.
pub trait NonVolatileStore {
    fn read_byte(&self, index: usize) -> u8;
    fn write_byte(&mut self, index: usize, value: u8);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output stage configuration for a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    PushPull,
    OpenDrain,
}

/// One digital line. Drive faults are possible on write (shorted load,
/// expander hiccup); reads reflect the last latched level and cannot fail.
pub trait DigitalIo {
    fn set_drive_mode(&mut self, mode: DriveMode) -> Result<(), HalError>;
    fn write(&mut self, high: bool) -> Result<(), HalError>;
    fn read(&self) -> bool;
}

/// A claimed PWM output. Dropping the handle releases the underlying slice
/// so the channel can be re-claimed later.
pub trait PwmOut {
    fn set_duty(&mut self, duty: u16) -> Result<(), HalError>;
}

/// 16-channel constant-current LED driver feeding the face panels and the
/// battery heater FET.
pub trait LedDriver {
    fn set_channel_duty(&mut self, channel: u8, duty: u16) -> Result<(), HalError>;
}

/// Bus power monitor (INA219 class).
pub trait PowerMonitor {
    fn bus_voltage(&mut self) -> Result<f32, HalError>;
    fn shunt_voltage(&mut self) -> Result<f32, HalError>;
    fn current(&mut self) -> Result<f32, HalError>;
}

/// Board temperature sensor.
pub trait TemperatureSensor {
    fn temperature_c(&mut self) -> Result<f32, HalError>;
}

/// ADC carrying the battery thermocouple.
pub trait ThermocoupleAdc {
    /// Raw channel voltage in volts.
    fn channel_voltage(&mut self, channel: u8) -> Result<f32, HalError>;
}

/// I2C multiplexer in front of the face sensors (TCA9548A class).
pub trait BusMux {
    /// Select `channel` and probe it, returning every address that answered.
    fn scan(&mut self, channel: u8) -> Result<ScanAddresses, HalError>;
}

/// CAN transceiver handle. The transport itself is flight software's
/// business; the board only needs the self-test configuration.
pub trait CanTransceiver {
    fn in_loopback(&self) -> bool;
}

/// RGB status indicator (NeoPixel class).
pub trait RgbIndicator {
    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), HalError>;
}

/// Factory for every peripheral on one physical board.
///
/// `Satellite::initialize` consumes one of these and claims each device in
/// bring-up order. Implementations hand out each handle at most once; the
/// burn PWM is the exception and is claimed per firing.
pub trait Board {
    fn nonvolatile_store(&mut self) -> Box<dyn NonVolatileStore>;

    fn burn_relay(&mut self) -> Box<dyn DigitalIo>;
    fn vbus_reset_line(&mut self) -> Box<dyn DigitalIo>;
    fn i2c_reset_line(&mut self) -> Box<dyn DigitalIo>;
    fn radio_enable_line(&mut self) -> Box<dyn DigitalIo>;
    /// Charge-indicator input, pulled down; reads low while the charger is
    /// active.
    fn charge_indicator(&mut self) -> Box<dyn DigitalIo>;

    fn led_driver(&mut self) -> Result<Box<dyn LedDriver>, HalError>;
    fn rgb_indicator(&mut self) -> Result<Box<dyn RgbIndicator>, HalError>;
    fn power_monitor(&mut self) -> Result<Box<dyn PowerMonitor>, HalError>;
    fn solar_monitor(&mut self) -> Result<Box<dyn PowerMonitor>, HalError>;
    fn temperature_sensor(&mut self) -> Result<Box<dyn TemperatureSensor>, HalError>;
    fn thermocouple_adc(&mut self) -> Result<Box<dyn ThermocoupleAdc>, HalError>;
    fn bus_mux(&mut self) -> Result<Box<dyn BusMux>, HalError>;
    fn can_transceiver(&mut self) -> Result<Box<dyn CanTransceiver>, HalError>;

    /// Claim the burn-wire PWM slice at `frequency_hz`. Fails if the slice
    /// is already held or the frequency cannot be produced.
    fn claim_burn_pwm(&mut self, frequency_hz: u32) -> Result<Box<dyn PwmOut>, HalError>;

    /// Blocking settle delay on the board's monotonic clock.
    fn sleep(&self, duration: Duration);
}
