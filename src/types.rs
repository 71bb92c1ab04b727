use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::{B6Error, Result};
use crate::fixed_point::FieldReader;
use crate::frame::check_reply_len;

/// Battery technology selector. Discriminants are sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BatteryChemistry {
    LiPo = 0,
    LiIon = 1,
    LiFe = 2,
    LiHV = 3,
    NiMH = 4,
    NiCd = 5,
    Pb = 6,
}

impl BatteryChemistry {
    pub const ALL: [BatteryChemistry; 7] = [
        BatteryChemistry::LiPo,
        BatteryChemistry::LiIon,
        BatteryChemistry::LiFe,
        BatteryChemistry::LiHV,
        BatteryChemistry::NiMH,
        BatteryChemistry::NiCd,
        BatteryChemistry::Pb,
    ];

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            BatteryChemistry::LiPo => "LiPo",
            BatteryChemistry::LiIon => "LiIo",
            BatteryChemistry::LiFe => "LiFe",
            BatteryChemistry::LiHV => "LiHV",
            BatteryChemistry::NiMH => "NiMH",
            BatteryChemistry::NiCd => "NiCd",
            BatteryChemistry::Pb => "Pb",
        }
    }
}

impl FromStr for BatteryChemistry {
    type Err = B6Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lipo" => Ok(BatteryChemistry::LiPo),
            "liio" | "liion" | "li-ion" => Ok(BatteryChemistry::LiIon),
            "life" => Ok(BatteryChemistry::LiFe),
            "lihv" => Ok(BatteryChemistry::LiHV),
            "nimh" => Ok(BatteryChemistry::NiMH),
            "nicd" => Ok(BatteryChemistry::NiCd),
            "pb" => Ok(BatteryChemistry::Pb),
            _ => Err(B6Error::UnknownChemistry(s.to_string())),
        }
    }
}

impl fmt::Display for BatteryChemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Program the charger runs. Discriminants are sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperatingMode {
    Charge = 0,
    Discharge = 1,
    Storage = 2,
    FastCharge = 3,
}

impl OperatingMode {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperatingMode::Charge => "charge",
            OperatingMode::Discharge => "discharge",
            OperatingMode::Storage => "storage",
            OperatingMode::FastCharge => "fast_charge",
        }
    }
}

impl FromStr for OperatingMode {
    type Err = B6Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "charge" => Ok(OperatingMode::Charge),
            "discharge" => Ok(OperatingMode::Discharge),
            "storage" => Ok(OperatingMode::Storage),
            "fast_charge" | "fastcharge" => Ok(OperatingMode::FastCharge),
            _ => Err(B6Error::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State code reported in a charge info reply.
///
/// Codes outside the known table are kept as `Unknown` so a firmware
/// variant never breaks decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChargeState {
    #[default]
    Idle,
    Running,
    Waiting,
    Done,
    Error,
    NotNeeded,
    Unknown(u8),
}

impl ChargeState {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => ChargeState::Idle,
            1 => ChargeState::Running,
            2 => ChargeState::Waiting,
            3 => ChargeState::Done,
            4 => ChargeState::Error,
            5 => ChargeState::NotNeeded,
            other => ChargeState::Unknown(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ChargeState::Idle => 0,
            ChargeState::Running => 1,
            ChargeState::Waiting => 2,
            ChargeState::Done => 3,
            ChargeState::Error => 4,
            ChargeState::NotNeeded => 5,
            ChargeState::Unknown(code) => code,
        }
    }

    pub fn is_running(&self) -> bool {
        *self == ChargeState::Running
    }

    /// Fixed display label; idle is reported as the bare code `0`.
    pub fn label(&self) -> String {
        match self {
            ChargeState::Idle => "0".to_string(),
            ChargeState::Running => "RUNNING".to_string(),
            ChargeState::Waiting => "WAITING".to_string(),
            ChargeState::Done => "DONE".to_string(),
            ChargeState::Error => "ERROR".to_string(),
            ChargeState::NotNeeded => "NOT_NEEDED".to_string(),
            ChargeState::Unknown(code) => format!("unknown({})", code),
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Live measurements of the running program (query `0x55`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeInfo {
    pub state: ChargeState,
    /// Accumulated capacity in mAh
    pub mah: u16,
    /// Elapsed program time in seconds
    pub time_sec: u16,
    /// Pack voltage in volts
    pub voltage: f64,
    /// Current in milliamps, left unscaled
    pub current: u16,
    pub temp_ext: u8,
    pub temp_int: u8,
    pub impedance_int: u16,
    /// Per-cell voltages in volts
    pub cells: Vec<f64>,
}

impl ChargeInfo {
    pub fn from_reply(reply: &[u8]) -> Result<Self> {
        check_reply_len(reply, CHARGE_INFO_MIN_LEN)?;
        let mut r = FieldReader::new(reply, REPLY_HEADER_LEN);
        Ok(ChargeInfo {
            state: ChargeState::from_byte(r.u8()?),
            mah: r.u16()?,
            time_sec: r.u16()?,
            voltage: r.volts()?,
            current: r.u16()?,
            temp_ext: r.u8()?,
            temp_int: r.u8()?,
            impedance_int: r.u16()?,
            cells: (0..CELL_SLOTS).map(|_| r.volts()).collect::<Result<_>>()?,
        })
    }

    /// Current in amps.
    pub fn current_amps(&self) -> f64 {
        self.current as f64 / 1000.0
    }
}

/// Charger settings plus idle pack voltages (query `0x5A`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    /// Pause between cycles in minutes
    pub cycle_time: u8,
    pub time_limit_on: bool,
    /// Safety timer in minutes
    pub time_limit: u16,
    pub cap_limit_on: bool,
    /// Capacity cut-off in mAh
    pub cap_limit: u16,
    pub key_buzz: bool,
    pub sys_buzz: bool,
    /// Low input voltage cut-off in volts
    pub in_dc_low: f64,
    pub temp_limit: u8,
    pub voltage: f64,
    pub cells: Vec<f64>,
}

impl SysInfo {
    pub fn from_reply(reply: &[u8]) -> Result<Self> {
        check_reply_len(reply, SYS_INFO_MIN_LEN)?;
        let mut r = FieldReader::new(reply, REPLY_HEADER_LEN);
        let cycle_time = r.u8()?;
        let time_limit_on = r.flag()?;
        let time_limit = r.u16()?;
        let cap_limit_on = r.flag()?;
        let cap_limit = r.u16()?;
        let key_buzz = r.flag()?;
        let sys_buzz = r.flag()?;
        let in_dc_low = r.volts()?;
        r.skip(2)?;
        let temp_limit = r.u8()?;
        let voltage = r.volts()?;
        let cells = (0..CELL_SLOTS).map(|_| r.volts()).collect::<Result<_>>()?;
        Ok(SysInfo {
            cycle_time,
            time_limit_on,
            time_limit,
            cap_limit_on,
            cap_limit,
            key_buzz,
            sys_buzz,
            in_dc_low,
            temp_limit,
            voltage,
            cells,
        })
    }
}

/// Firmware and hardware versions (query `0x57`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub sw_major: u8,
    pub sw_minor: u8,
    pub hw_version: u8,
}

impl DeviceInfo {
    pub fn from_reply(reply: &[u8]) -> Result<Self> {
        check_reply_len(reply, DEVICE_INFO_MIN_LEN)?;
        let mut r = FieldReader::new(reply, DEVICE_INFO_OFFSET);
        Ok(DeviceInfo {
            sw_major: r.u8()?,
            sw_minor: r.u8()?,
            hw_version: r.u8()?,
        })
    }

    /// Firmware version as `major + minor / 100`, e.g. `1.12`.
    pub fn sw_version(&self) -> f64 {
        self.sw_major as f64 + self.sw_minor as f64 / 100.0
    }
}
