//! Sticky telemetry aggregation.
//!
//! Once a program stops the charger reports zeroed or garbage current and
//! temperatures, while the capacity and elapsed time of the last active run
//! stay meaningful. [`TelemetryAggregator`] keeps those totals across polls
//! until the next running reading replaces them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::B6Mini;
use crate::transport::Channel;
use crate::types::{ChargeInfo, SysInfo};

/// Everything one poll produced, ready to publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub timestamp: DateTime<Utc>,
    /// Aggregated (sticky) charge status
    pub status: ChargeInfo,
    /// System info as read this poll
    pub sys_info: SysInfo,
    /// Pack voltage to show: live while running, idle reading otherwise
    pub voltage: f64,
    pub cells: Vec<f64>,
}

impl TelemetrySnapshot {
    /// Pick the voltage view for `status` and stamp it with the current time.
    pub fn compose(status: ChargeInfo, sys_info: SysInfo) -> Self {
        let (voltage, cells) = if status.state.is_running() {
            (status.voltage, status.cells.clone())
        } else {
            (sys_info.voltage, sys_info.cells.clone())
        };
        TelemetrySnapshot {
            timestamp: Utc::now(),
            status,
            sys_info,
            voltage,
            cells,
        }
    }

    /// Cell voltages numbered from 1.
    pub fn cell_voltages(&self) -> Vec<(usize, f64)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &v)| (i + 1, v))
            .collect()
    }
}

/// Holds the last authoritative [`ChargeInfo`] across polls.
#[derive(Debug, Clone, Default)]
pub struct TelemetryAggregator {
    status: ChargeInfo,
}

impl TelemetryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a first reading. Its elapsed time is discarded so a stale
    /// run is not reported as the current one.
    pub fn with_initial(mut initial: ChargeInfo) -> Self {
        initial.time_sec = 0;
        TelemetryAggregator { status: initial }
    }

    pub fn status(&self) -> &ChargeInfo {
        &self.status
    }

    /// Fold a fresh reading into the aggregate.
    ///
    /// A running reading replaces everything. Otherwise only the state and
    /// impedance are taken from it; current and temperatures drop to zero
    /// and capacity, time, voltage and cells keep their last running values.
    pub fn merge(&mut self, fresh: ChargeInfo) -> &ChargeInfo {
        if fresh.state.is_running() {
            self.status = fresh;
        } else {
            log::debug!(
                "Charger {}, keeping {} mAh / {} s from last run",
                fresh.state,
                self.status.mah,
                self.status.time_sec
            );
            self.status.state = fresh.state;
            self.status.impedance_int = fresh.impedance_int;
            self.status.current = 0;
            self.status.temp_int = 0;
            self.status.temp_ext = 0;
        }
        &self.status
    }

    /// Read charge and system info from `charger` and build a snapshot.
    ///
    /// A failed charge info read leaves the aggregate untouched.
    pub fn poll<C: Channel>(&mut self, charger: &mut B6Mini<C>) -> Result<TelemetrySnapshot> {
        let fresh = charger.get_charge_info()?;
        let status = self.merge(fresh).clone();
        let sys_info = charger.get_sys_info()?;
        Ok(TelemetrySnapshot::compose(status, sys_info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChargeState;

    fn running() -> ChargeInfo {
        ChargeInfo {
            state: ChargeState::Running,
            mah: 500,
            time_sec: 900,
            voltage: 8.3,
            current: 1200,
            temp_ext: 28,
            temp_int: 35,
            impedance_int: 30,
            cells: vec![4.15, 4.15, 0.0, 0.0, 0.0, 0.0],
        }
    }

    fn done() -> ChargeInfo {
        ChargeInfo {
            state: ChargeState::Done,
            mah: 0,
            time_sec: 0,
            voltage: 0.0,
            current: 0,
            temp_ext: 200,
            temp_int: 201,
            impedance_int: 42,
            cells: vec![0.0; 6],
        }
    }

    fn sys(voltage: f64, cells: Vec<f64>) -> SysInfo {
        SysInfo {
            voltage,
            cells,
            ..SysInfo::default()
        }
    }

    #[test]
    fn test_running_reading_replaces_aggregate() {
        let mut agg = TelemetryAggregator::new();
        agg.merge(running());
        assert_eq!(agg.status(), &running());
    }

    #[test]
    fn test_idle_reading_keeps_last_run_totals() {
        let mut agg = TelemetryAggregator::new();
        agg.merge(running());
        let status = agg.merge(done()).clone();

        assert_eq!(status.state, ChargeState::Done);
        assert_eq!(status.mah, 500);
        assert_eq!(status.time_sec, 900);
        assert_eq!(status.voltage, 8.3);
        assert_eq!(status.cells, running().cells);
        assert_eq!(status.current, 0);
        assert_eq!(status.temp_int, 0);
        assert_eq!(status.temp_ext, 0);
        assert_eq!(status.impedance_int, 42);
    }

    #[test]
    fn test_new_run_overwrites_sticky_values() {
        let mut agg = TelemetryAggregator::new();
        agg.merge(running());
        agg.merge(done());
        let mut next = running();
        next.mah = 12;
        next.time_sec = 30;
        agg.merge(next.clone());
        assert_eq!(agg.status(), &next);
    }

    #[test]
    fn test_unknown_state_is_treated_as_idle() {
        let mut agg = TelemetryAggregator::new();
        agg.merge(running());
        let mut odd = done();
        odd.state = ChargeState::Unknown(99);
        let status = agg.merge(odd);
        assert_eq!(status.state.label(), "unknown(99)");
        assert_eq!(status.mah, 500);
    }

    #[test]
    fn test_with_initial_resets_elapsed_time() {
        let agg = TelemetryAggregator::with_initial(running());
        assert_eq!(agg.status().time_sec, 0);
        assert_eq!(agg.status().mah, 500);
    }

    #[test]
    fn test_snapshot_uses_live_voltage_while_running() {
        let snap = TelemetrySnapshot::compose(running(), sys(7.9, vec![3.95, 3.95]));
        assert_eq!(snap.voltage, 8.3);
        assert_eq!(snap.cells, running().cells);
    }

    #[test]
    fn test_snapshot_uses_sys_voltage_when_idle() {
        let mut agg = TelemetryAggregator::new();
        agg.merge(running());
        let status = agg.merge(done()).clone();
        let snap = TelemetrySnapshot::compose(status, sys(7.9, vec![3.95, 3.95]));
        assert_eq!(snap.voltage, 7.9);
        assert_eq!(snap.cell_voltages(), vec![(1, 3.95), (2, 3.95)]);

        let snap = TelemetrySnapshot::compose(done(), sys(0.0, Vec::new()));
        assert!(snap.cells.is_empty());
        assert!(snap.cell_voltages().is_empty());
    }
}
