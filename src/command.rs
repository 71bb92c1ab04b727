//! Commands understood by the charger and their wire encoding.

use crate::constants::*;
use crate::error::{B6Error, Result};
use crate::fixed_point::push_milli;
use crate::frame;
use crate::types::{BatteryChemistry, OperatingMode};

/// Parameters of a program start, as laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramParams {
    pub chemistry: BatteryChemistry,
    pub cells: u8,
    pub mode: OperatingMode,
    pub charge_current: f64,
    pub discharge_current: f64,
    pub voltage_low: f64,
    pub voltage_high: f64,
}

impl ProgramParams {
    /// Payload following the program opcode:
    /// reserved, chemistry, cells, mode, four milli-unit fields, zero padding.
    pub fn payload(&self) -> Result<Vec<u8>> {
        if self.cells == 0 || self.cells > MAX_CELLS {
            return Err(B6Error::InvalidCellCount(self.cells));
        }
        let mut payload = vec![0x00, self.chemistry.to_byte(), self.cells, self.mode.to_byte()];
        push_milli(&mut payload, "charge current", self.charge_current)?;
        push_milli(&mut payload, "discharge current", self.discharge_current)?;
        push_milli(&mut payload, "low voltage", self.voltage_low)?;
        push_milli(&mut payload, "high voltage", self.voltage_high)?;
        payload.extend_from_slice(&[0x00; PROGRAM_PADDING]);
        Ok(payload)
    }
}

/// A request the driver can send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Stop,
    Charge {
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        max_voltage: f64,
    },
    Discharge {
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        min_voltage: f64,
    },
    Storage {
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        storage_voltage: f64,
    },
    FastCharge {
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        max_voltage: f64,
    },
    QueryDeviceInfo,
    QueryChargeInfo,
    QuerySysInfo,
}

fn check_current(current: f64) -> Result<()> {
    if current.is_finite() && current > 0.0 {
        Ok(())
    } else {
        Err(B6Error::InvalidCurrent(current))
    }
}

impl Command {
    /// Opcode byte following the length byte.
    pub fn opcode(&self) -> u8 {
        match self {
            Command::Stop => STOP_CMD,
            Command::Charge { .. }
            | Command::Discharge { .. }
            | Command::Storage { .. }
            | Command::FastCharge { .. } => PROGRAM_CMD,
            Command::QueryDeviceInfo => DEVICE_INFO_CMD,
            Command::QueryChargeInfo => CHARGE_INFO_CMD,
            Command::QuerySysInfo => SYS_INFO_CMD,
        }
    }

    /// Wire parameters for the program commands, `None` for the others.
    ///
    /// Storage caps its discharge leg at 1 A whatever current was requested.
    pub fn program(&self) -> Result<Option<ProgramParams>> {
        let params = match *self {
            Command::Charge { chemistry, cells, current, max_voltage } => ProgramParams {
                chemistry,
                cells,
                mode: OperatingMode::Charge,
                charge_current: current,
                discharge_current: 0.0,
                voltage_low: 0.0,
                voltage_high: max_voltage,
            },
            Command::FastCharge { chemistry, cells, current, max_voltage } => ProgramParams {
                chemistry,
                cells,
                mode: OperatingMode::FastCharge,
                charge_current: current,
                discharge_current: 0.0,
                voltage_low: 0.0,
                voltage_high: max_voltage,
            },
            Command::Discharge { chemistry, cells, current, min_voltage } => ProgramParams {
                chemistry,
                cells,
                mode: OperatingMode::Discharge,
                charge_current: 0.0,
                discharge_current: current,
                voltage_low: min_voltage,
                voltage_high: 0.0,
            },
            Command::Storage { chemistry, cells, current, storage_voltage } => ProgramParams {
                chemistry,
                cells,
                mode: OperatingMode::Storage,
                charge_current: current,
                discharge_current: current.min(STORAGE_DISCHARGE_LIMIT_A),
                voltage_low: 0.0,
                voltage_high: storage_voltage,
            },
            _ => return Ok(None),
        };
        Ok(Some(params))
    }

    /// Bytes between the opcode and the checksum.
    pub fn payload(&self) -> Result<Vec<u8>> {
        match *self {
            Command::Charge { current, .. }
            | Command::FastCharge { current, .. }
            | Command::Discharge { current, .. }
            | Command::Storage { current, .. } => check_current(current)?,
            _ => {}
        }
        match self.program()? {
            Some(params) => params.payload(),
            None => Ok(vec![0x00]),
        }
    }

    /// Complete request frame, validated before any byte is produced.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = self.payload()?;
        Ok(frame::encode(self.opcode(), &payload))
    }
}
