//! Burn-wire and heater actuation.
//!
//! Both actuators share one mechanical relay. The burn path is
//! pulse-triggered: claim the PWM slice inert, engage the relay, pulse,
//! then de-energize no matter what happened in between. The heater is
//! level-triggered on the LED driver's reserved channel and latches
//! through a persistent flag so a brownout mid-heat is visible after
//! reboot. A burn never returns with the relay energized; a heater fault
//! forces the FET off but holds relay and latch until `heater_off`
//! recovers them.

use crate::error::{BoardError, HalError};
use crate::fault::FaultKind;
use crate::hal::{DriveMode, PwmOut};
use crate::hardware::Peripheral;
use crate::nvm::Flag;
use crate::satellite::Satellite;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Only burn circuit 1 is wired on this board revision.
pub const SUPPORTED_BURN_CHANNEL: u8 = 1;
/// Relay settle before the burn pulse starts.
const BURN_RELAY_SETTLE: Duration = Duration::from_millis(500);
/// Relay settle before the heater FET is driven.
const HEATER_SETTLE: Duration = Duration::from_millis(250);
/// Half-scale heater drive.
const HEATER_DUTY: u16 = 0x7FFF;
/// Indicator color while the relay is energized.
const RELAY_ACTIVE_COLOR: (u8, u8, u8) = (255, 165, 0);
const INDICATOR_OFF: (u8, u8, u8) = (0, 0, 0);

/// Deployment mechanism state, derived from the persistent flag pair.
/// `arm` and `disarm` write both flags together, so armed-and-burned
/// cannot be produced by this state machine; if ground tooling ever
/// plants both bits by hand, `Burned` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmState {
    Disarmed,
    Armed,
    Burned,
}

/// Steps of one firing sequence. The sequence is straight-line and
/// blocking, so the phase is an execution marker for the log rather than
/// resting state; between calls the machine is always back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurnPhase {
    Idle,
    RelayEngaged,
    Pulsing,
    Cleanup,
}

type StepFault = (&'static str, HalError);

impl Satellite {
    /// Arm the deployment mechanism: armed set, burned cleared, distance
    /// zeroed. Pure register writes; cannot fail.
    pub fn arm(&mut self) {
        self.counters.set_flag(Flag::BurnArmed, true);
        self.counters.set_flag(Flag::Burned, false);
        self.counters.set_distance_count(0);
        info!("satellite armed");
    }

    /// Stand the mechanism down: armed cleared, burned set, distance
    /// zeroed.
    pub fn disarm(&mut self) {
        self.counters.set_flag(Flag::BurnArmed, false);
        self.counters.set_flag(Flag::Burned, true);
        self.counters.set_distance_count(0);
        info!("satellite disarmed");
    }

    pub fn arm_state(&self) -> ArmState {
        if self.counters.get_flag(Flag::Burned) {
            ArmState::Burned
        } else if self.counters.get_flag(Flag::BurnArmed) {
            ArmState::Armed
        } else {
            ArmState::Disarmed
        }
    }

    /// Fire a burn wire.
    ///
    /// Validation failures reject before any hardware is touched. Past
    /// validation, the de-energize path runs exactly once on every exit,
    /// including a failed PWM claim; a mid-sequence fault is surfaced only
    /// after cleanup has run.
    pub fn fire(
        &mut self,
        channel: u8,
        duty_percent: f32,
        frequency_hz: u32,
        duration: Duration,
    ) -> Result<(), BoardError> {
        if channel != SUPPORTED_BURN_CHANNEL {
            warn!("burn channel {} not wired", channel);
            return Err(BoardError::UnsupportedBurnChannel(channel));
        }
        if !(0.0..=100.0).contains(&duty_percent) {
            warn!("burn duty {}% out of range", duty_percent);
            return Err(BoardError::DutyOutOfRange(duty_percent));
        }

        let duty = duty_from_percent(duty_percent);
        info!(
            "burn wire {}: {} Hz, {:.1}% duty (raw {}), {} ms pulse",
            channel,
            frequency_hz,
            duty_percent,
            duty,
            duration.as_millis()
        );

        let mut fault: Option<StepFault> = None;

        // Claimed inert; nothing burns until the duty goes nonzero.
        match self.board.claim_burn_pwm(frequency_hz) {
            Ok(mut pwm) => {
                if let Err(step) = self.burn_pulse(pwm.as_mut(), duty, duration) {
                    fault = Some(step);
                }
                if let Err(step) = self.burn_cleanup(Some(pwm)) {
                    fault = fault.or(Some(step));
                }
            }
            Err(e) => {
                error!("burn pwm claim failed: {}", e);
                fault = Some(("burn pwm", e));
                if let Err(step) = self.burn_cleanup(None) {
                    fault = fault.or(Some(step));
                }
            }
        }

        match fault {
            None => {
                info!("burn complete");
                Ok(())
            }
            Some((device, source)) => {
                self.note_fault(FaultKind::Actuation, device, source);
                Err(BoardError::Transient { device, source })
            }
        }
    }

    fn burn_pulse(
        &mut self,
        pwm: &mut dyn PwmOut,
        duty: u16,
        duration: Duration,
    ) -> Result<(), StepFault> {
        self.relay
            .set_drive_mode(DriveMode::PushPull)
            .map_err(|e| ("burn relay", e))?;
        self.relay.write(true).map_err(|e| ("burn relay", e))?;
        self.indicate(RELAY_ACTIVE_COLOR);
        self.board.sleep(BURN_RELAY_SETTLE);
        debug!("burn phase: {:?}", BurnPhase::RelayEngaged);

        pwm.set_duty(duty).map_err(|e| ("burn pwm", e))?;
        debug!("burn phase: {:?}", BurnPhase::Pulsing);
        self.board.sleep(duration);
        Ok(())
    }

    /// De-energize in flight order: relay low, duty zeroed, indicator
    /// dark, slice released, relay back to open-drain. Every step runs
    /// even when an earlier one faults; the first fault is reported.
    fn burn_cleanup(&mut self, mut pwm: Option<Box<dyn PwmOut>>) -> Result<(), StepFault> {
        debug!("burn phase: {:?}", BurnPhase::Cleanup);
        let mut fault: Option<StepFault> = None;

        if let Err(e) = self.relay.write(false) {
            error!("burn relay release failed: {}", e);
            fault = Some(("burn relay", e));
        }
        if let Some(pwm) = pwm.as_deref_mut() {
            if let Err(e) = pwm.set_duty(0) {
                error!("burn pwm zero failed: {}", e);
                fault = fault.or(Some(("burn pwm", e)));
            }
        }
        self.indicate(INDICATOR_OFF);
        drop(pwm);
        if let Err(e) = self.relay.set_drive_mode(DriveMode::OpenDrain) {
            error!("burn relay mode restore failed: {}", e);
            fault = fault.or(Some(("burn relay", e)));
        }

        debug!("burn phase: {:?}", BurnPhase::Idle);
        match fault {
            None => Ok(()),
            Some(step) => Err(step),
        }
    }

    /// Switch the battery heater on.
    ///
    /// The persistent brownout flag is the re-entrancy latch: if it is
    /// already set the call returns `Ok` without touching hardware. On a
    /// mid-sequence fault the FET is forced off, the latch stays set, and
    /// the fault is surfaced; `heater_off` clears the latch.
    pub fn heater_on(&mut self) -> Result<(), BoardError> {
        if self.faces.is_none() {
            warn!("led driver not initialized");
            return Err(BoardError::Unavailable(Peripheral::Fld));
        }
        if self.counters.get_flag(Flag::BrownoutActive) {
            debug!("heater already latched on");
            return Ok(());
        }

        self.counters.set_flag(Flag::BrownoutActive, true);
        self.heating = true;

        match self.heater_engage_sequence() {
            Ok(()) => {
                info!("battery heater on");
                Ok(())
            }
            Err((device, source)) => {
                error!("heater on failed: {}", source);
                let _ = self.set_heater_duty(0);
                self.note_fault(FaultKind::Actuation, device, source);
                Err(BoardError::Transient { device, source })
            }
        }
    }

    /// Switch the battery heater off. The hardware path runs
    /// unconditionally, so a stuck latch can always be recovered; the
    /// latch, heating state and indicator are only cleared once the
    /// hardware is confirmed off.
    pub fn heater_off(&mut self) -> Result<(), BoardError> {
        if self.faces.is_none() {
            warn!("led driver not initialized");
            return Err(BoardError::Unavailable(Peripheral::Fld));
        }

        match self.heater_shutdown_sequence() {
            Ok(()) => {
                if self.heating {
                    self.heating = false;
                    self.counters.set_flag(Flag::BrownoutActive, false);
                    self.indicate(INDICATOR_OFF);
                    info!("battery heater off");
                }
                Ok(())
            }
            Err((device, source)) => {
                error!("heater off failed: {}", source);
                let _ = self.set_heater_duty(0);
                self.note_fault(FaultKind::Actuation, device, source);
                Err(BoardError::Transient { device, source })
            }
        }
    }

    fn heater_engage_sequence(&mut self) -> Result<(), StepFault> {
        self.relay
            .set_drive_mode(DriveMode::PushPull)
            .map_err(|e| ("burn relay", e))?;
        self.relay.write(true).map_err(|e| ("burn relay", e))?;
        self.indicate(RELAY_ACTIVE_COLOR);
        self.board.sleep(HEATER_SETTLE);
        self.set_heater_duty(HEATER_DUTY)
    }

    fn heater_shutdown_sequence(&mut self) -> Result<(), StepFault> {
        self.set_heater_duty(0)?;
        self.relay.write(false).map_err(|e| ("burn relay", e))?;
        self.relay
            .set_drive_mode(DriveMode::OpenDrain)
            .map_err(|e| ("burn relay", e))
    }

    fn set_heater_duty(&mut self, duty: u16) -> Result<(), StepFault> {
        match self.faces.as_mut() {
            Some(bank) => bank.set_heater_duty(duty).map_err(|e| ("heater", e)),
            None => Err(("heater", HalError::InitFailed)),
        }
    }
}

fn duty_from_percent(duty_percent: f32) -> u16 {
    (duty_percent / 100.0 * f32::from(u16::MAX)).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_conversion_rounds() {
        assert_eq!(duty_from_percent(0.0), 0);
        assert_eq!(duty_from_percent(100.0), 0xFFFF);
        assert_eq!(duty_from_percent(50.0), 0x8000);
        assert_eq!(duty_from_percent(25.0), 16384);
    }

    #[test]
    fn test_nan_duty_fails_range_check() {
        assert!(!(0.0..=100.0).contains(&f32::NAN));
    }
}
