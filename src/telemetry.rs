//! State-of-health readings.
//!
//! Every accessor checks its capability entry before touching the bus: an
//! absent peripheral costs zero bus transactions and returns
//! `Unavailable`. Voltage and current readings average a fixed number of
//! samples; the sample count and the calibration offsets are flight-tuned
//! values and part of the interface contract.

use crate::actuation::ArmState;
use crate::error::{BoardError, HalError};
use crate::fault::FaultKind;
use crate::hal::PowerMonitor;
use crate::hardware::Peripheral;
use crate::satellite::{PowerMode, Satellite};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Samples averaged per voltage/current reading.
const SAMPLE_COUNT: u32 = 50;
/// Correction added to bus-voltage-derived readings.
const BUS_VOLTAGE_OFFSET_V: f32 = 0.2;
/// ADC channel the battery thermocouple is wired to.
const THERMOCOUPLE_CHANNEL: u8 = 1;
/// Thermocouple transfer: temperature = (v - offset) / slope.
const THERMOCOUPLE_OFFSET_V: f32 = 1.25;
const THERMOCOUPLE_SLOPE_V_PER_C: f32 = 0.005;

/// One state-of-health frame. Readings degrade independently: a sensor
/// that is absent or faulting contributes `None` without disturbing its
/// neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub uptime_ms: u64,
    pub battery_voltage: Option<f32>,
    pub system_voltage: Option<f32>,
    pub current_draw: Option<f32>,
    pub charge_voltage: Option<f32>,
    pub charge_current: Option<f32>,
    pub internal_temperature: Option<f32>,
    pub battery_temperature: Option<f32>,
    pub is_charging: bool,
    pub heating: bool,
    pub power_mode: PowerMode,
    pub arm_state: ArmState,
    pub boot_count: u8,
}

impl Satellite {
    /// Battery bus voltage in volts, averaged and offset-corrected.
    pub fn battery_voltage(&mut self) -> Result<f32, BoardError> {
        let Some(monitor) = self.power.as_mut() else {
            warn!("power monitor not initialized");
            return Err(BoardError::Unavailable(Peripheral::Pwr));
        };
        match averaged(monitor.as_mut(), |m| m.bus_voltage()) {
            Ok(mean) => Ok(mean + BUS_VOLTAGE_OFFSET_V),
            Err(e) => Err(self.telemetry_fault("power monitor", e)),
        }
    }

    /// Bus plus shunt voltage in volts, averaged. No correction factor:
    /// the shunt term already accounts for the sense drop.
    pub fn system_voltage(&mut self) -> Result<f32, BoardError> {
        let Some(monitor) = self.power.as_mut() else {
            warn!("power monitor not initialized");
            return Err(BoardError::Unavailable(Peripheral::Pwr));
        };
        match averaged(monitor.as_mut(), |m| {
            Ok(m.bus_voltage()? + m.shunt_voltage()?)
        }) {
            Ok(mean) => Ok(mean),
            Err(e) => Err(self.telemetry_fault("power monitor", e)),
        }
    }

    /// Battery bus current draw in amps, averaged.
    pub fn current_draw(&mut self) -> Result<f32, BoardError> {
        let Some(monitor) = self.power.as_mut() else {
            warn!("power monitor not initialized");
            return Err(BoardError::Unavailable(Peripheral::Pwr));
        };
        match averaged(monitor.as_mut(), |m| m.current()) {
            Ok(mean) => Ok(mean),
            Err(e) => Err(self.telemetry_fault("power monitor", e)),
        }
    }

    /// Solar charge voltage in volts, averaged and offset-corrected.
    pub fn charge_voltage(&mut self) -> Result<f32, BoardError> {
        let Some(monitor) = self.solar.as_mut() else {
            warn!("solar monitor not initialized");
            return Err(BoardError::Unavailable(Peripheral::Solar));
        };
        match averaged(monitor.as_mut(), |m| m.bus_voltage()) {
            Ok(mean) => Ok(mean + BUS_VOLTAGE_OFFSET_V),
            Err(e) => Err(self.telemetry_fault("solar monitor", e)),
        }
    }

    /// Solar charge current in amps, averaged.
    pub fn charge_current(&mut self) -> Result<f32, BoardError> {
        let Some(monitor) = self.solar.as_mut() else {
            warn!("solar monitor not initialized");
            return Err(BoardError::Unavailable(Peripheral::Solar));
        };
        match averaged(monitor.as_mut(), |m| m.current()) {
            Ok(mean) => Ok(mean),
            Err(e) => Err(self.telemetry_fault("solar monitor", e)),
        }
    }

    /// Board temperature in Celsius, single reading.
    pub fn internal_temperature(&mut self) -> Result<f32, BoardError> {
        let Some(sensor) = self.thermometer.as_mut() else {
            warn!("temperature sensor not initialized");
            return Err(BoardError::Unavailable(Peripheral::Temp));
        };
        match sensor.temperature_c() {
            Ok(celsius) => Ok(celsius),
            Err(e) => Err(self.telemetry_fault("temperature sensor", e)),
        }
    }

    /// Battery pack temperature in Celsius from the thermocouple channel.
    pub fn battery_temperature(&mut self) -> Result<f32, BoardError> {
        let Some(adc) = self.thermocouple.as_mut() else {
            warn!("thermocouple not initialized");
            return Err(BoardError::Unavailable(Peripheral::Couple));
        };
        match adc.channel_voltage(THERMOCOUPLE_CHANNEL) {
            Ok(volts) => Ok((volts - THERMOCOUPLE_OFFSET_V) / THERMOCOUPLE_SLOPE_V_PER_C),
            Err(e) => Err(self.telemetry_fault("thermocouple adc", e)),
        }
    }

    /// Collect the full state-of-health frame, degrading per reading.
    pub fn telemetry_snapshot(&mut self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            uptime_ms: self.uptime_millis(),
            battery_voltage: self.battery_voltage().ok(),
            system_voltage: self.system_voltage().ok(),
            current_draw: self.current_draw().ok(),
            charge_voltage: self.charge_voltage().ok(),
            charge_current: self.charge_current().ok(),
            internal_temperature: self.internal_temperature().ok(),
            battery_temperature: self.battery_temperature().ok(),
            is_charging: self.is_charging(),
            heating: self.is_heating(),
            power_mode: self.power_mode(),
            arm_state: self.arm_state(),
            boot_count: self.counters.boot_count(),
        }
    }

    fn telemetry_fault(&mut self, device: &'static str, error: HalError) -> BoardError {
        warn!("{} fault: {}", device, error);
        self.note_fault(FaultKind::Telemetry, device, error);
        BoardError::Transient {
            device,
            source: error,
        }
    }
}

fn averaged(
    monitor: &mut dyn PowerMonitor,
    mut read: impl FnMut(&mut dyn PowerMonitor) -> Result<f32, HalError>,
) -> Result<f32, HalError> {
    let mut total = 0.0;
    for _ in 0..SAMPLE_COUNT {
        total += read(monitor)?;
    }
    Ok(total / SAMPLE_COUNT as f32)
}
