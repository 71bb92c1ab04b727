//! Program selection at the control boundary.
//!
//! Remote controls deliver mode, chemistry and numbers as strings, one
//! parameter at a time. [`ChargeProgram`] parses each one into the closed
//! enumerations before anything reaches the driver, then starts the program
//! with a pack voltage derived from the cell count.

use serde::{Deserialize, Serialize};

use crate::constants::{CELL_FULL_VOLTAGE, CELL_STORAGE_VOLTAGE};
use crate::error::{B6Error, Result};
use crate::protocol::B6Mini;
use crate::transport::Channel;
use crate::types::{BatteryChemistry, OperatingMode};

/// Program parameters selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeProgram {
    pub mode: OperatingMode,
    pub chemistry: BatteryChemistry,
    pub cells: u8,
    /// Charge or discharge current in amps
    pub current: f64,
    /// Per-cell discharge cut-off in volts
    pub min_voltage: f64,
}

impl Default for ChargeProgram {
    fn default() -> Self {
        ChargeProgram {
            mode: OperatingMode::Charge,
            chemistry: BatteryChemistry::LiIon,
            cells: 1,
            current: 1.0,
            min_voltage: 3.0,
        }
    }
}

fn invalid(name: &str, value: &str) -> B6Error {
    B6Error::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_number(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(name, value))
}

impl ChargeProgram {
    /// Update one parameter from its string form.
    ///
    /// Recognised names are `mode`, `battery_type`, `cells`, `current` and
    /// `min_voltage`. The program is unchanged when parsing fails.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "mode" => self.mode = value.parse()?,
            "battery_type" | "chemistry" => self.chemistry = value.parse()?,
            "cells" => {
                let cells = parse_number(name, value)?;
                if cells.fract() != 0.0 || !(1.0..=6.0).contains(&cells) {
                    return Err(invalid(name, value));
                }
                self.cells = cells as u8;
            }
            "current" => {
                let current = parse_number(name, value)?;
                if current <= 0.0 {
                    return Err(B6Error::InvalidCurrent(current));
                }
                self.current = current;
            }
            "min_voltage" => self.min_voltage = parse_number(name, value)?,
            _ => return Err(invalid(name, value)),
        }
        Ok(())
    }

    /// Pack voltage the program runs towards.
    pub fn boundary_voltage(&self) -> f64 {
        let cells = self.cells as f64;
        match self.mode {
            OperatingMode::Charge | OperatingMode::FastCharge => cells * CELL_FULL_VOLTAGE,
            OperatingMode::Discharge => cells * self.min_voltage,
            OperatingMode::Storage => cells * CELL_STORAGE_VOLTAGE,
        }
    }

    /// Start the program on `charger`.
    pub fn start<C: Channel>(&self, charger: &mut B6Mini<C>) -> Result<Vec<u8>> {
        let voltage = self.boundary_voltage();
        log::info!(
            "Starting {} for {} {}S at {:.2}A, limit {:.3}V",
            self.mode,
            self.chemistry,
            self.cells,
            self.current,
            voltage
        );
        match self.mode {
            OperatingMode::Charge => charger.charge(self.chemistry, self.cells, self.current, voltage),
            OperatingMode::FastCharge => {
                charger.fastcharge(self.chemistry, self.cells, self.current, voltage)
            }
            OperatingMode::Discharge => {
                charger.discharge(self.chemistry, self.cells, self.current, voltage)
            }
            OperatingMode::Storage => charger.storage(self.chemistry, self.cells, self.current, voltage),
        }
    }
}
