use crate::error::HalError;
use heapless::Vec;
use serde::Serialize;

const MAX_FAULT_HISTORY: usize = 64;

/// Which activity a fault interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FaultKind {
    /// A bring-up step failed and the peripheral was marked unavailable.
    BringUp,
    /// A sensor read failed on hardware that is marked present.
    Telemetry,
    /// A burn, heater or face operation faulted mid-sequence.
    Actuation,
    /// A control line write failed (reset, radio enable, indicator).
    Control,
}

/// One recorded hardware fault. Records are point events; they carry the
/// board uptime at which they happened and are never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaultRecord {
    pub id: u32,
    pub kind: FaultKind,
    pub device: &'static str,
    pub error: HalError,
    pub uptime_ms: u64,
}

/// Bounded fault history. When full, the oldest record is evicted so the
/// log always holds the most recent faults.
#[derive(Debug)]
pub struct FaultLog {
    history: Vec<FaultRecord, MAX_FAULT_HISTORY>,
    next_id: u32,
}

impl FaultLog {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            next_id: 1,
        }
    }

    pub fn record(
        &mut self,
        kind: FaultKind,
        device: &'static str,
        error: HalError,
        uptime_ms: u64,
    ) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        if self.history.is_full() {
            self.history.remove(0);
        }

        let _ = self.history.push(FaultRecord {
            id,
            kind,
            device,
            error,
            uptime_ms,
        });
        id
    }

    pub fn history(&self) -> &[FaultRecord] {
        &self.history
    }

    pub fn last(&self) -> Option<&FaultRecord> {
        self.history.last()
    }

    pub fn count_for(&self, device: &str) -> usize {
        self.history.iter().filter(|f| f.device == device).count()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for FaultLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_keep_insertion_order() {
        let mut log = FaultLog::new();
        log.record(FaultKind::BringUp, "power monitor", HalError::InitFailed, 10);
        log.record(FaultKind::Telemetry, "solar monitor", HalError::I2c, 250);

        let history = log.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].device, "power monitor");
        assert_eq!(history[1].uptime_ms, 250);
        assert_eq!(log.last().unwrap().kind, FaultKind::Telemetry);
    }

    #[test]
    fn test_full_log_evicts_oldest() {
        let mut log = FaultLog::new();
        for i in 0..(MAX_FAULT_HISTORY as u64 + 4) {
            log.record(FaultKind::Telemetry, "power monitor", HalError::I2c, i);
        }

        assert_eq!(log.len(), MAX_FAULT_HISTORY);
        // The four oldest records are gone.
        assert_eq!(log.history()[0].uptime_ms, 4);
    }

    #[test]
    fn test_count_for_filters_by_device() {
        let mut log = FaultLog::new();
        log.record(FaultKind::Actuation, "face driver", HalError::I2c, 1);
        log.record(FaultKind::Actuation, "face driver", HalError::I2c, 2);
        log.record(FaultKind::Control, "vbus reset", HalError::Gpio, 3);

        assert_eq!(log.count_for("face driver"), 2);
        assert_eq!(log.count_for("vbus reset"), 1);
        assert_eq!(log.count_for("heater"), 0);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut log = FaultLog::new();
        let a = log.record(FaultKind::BringUp, "mux", HalError::Nack, 0);
        let b = log.record(FaultKind::BringUp, "can", HalError::Spi, 0);
        assert!(b > a);
    }
}
