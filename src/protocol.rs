use crate::command::Command;
use crate::error::Result;
use crate::transport::{Channel, SerialChannel, Transport, TransportConfig};
use crate::types::*;

/// Main iMAX B6 Mini protocol interface.
///
/// Owns the channel to one charger. Every call is one blocking
/// request/reply transaction; callers serialise access to the handle.
pub struct B6Mini<C: Channel> {
    transport: Transport<C>,
}

impl B6Mini<SerialChannel> {
    /// Open a charger exposed as a serial device node.
    pub fn open(port_name: &str) -> Result<Self> {
        Ok(B6Mini::new(SerialChannel::open(port_name)?))
    }
}

impl<C: Channel> B6Mini<C> {
    /// Create a driver over an already-open channel.
    pub fn new(channel: C) -> Self {
        B6Mini {
            transport: Transport::new(channel),
        }
    }

    /// Create a driver with non-default retry and timeout settings.
    pub fn with_config(channel: C, config: TransportConfig) -> Self {
        B6Mini {
            transport: Transport::with_config(channel, config),
        }
    }

    /// Release the underlying channel.
    pub fn into_inner(self) -> C {
        self.transport.into_inner()
    }

    /// Encode and send `command`, returning the raw reply.
    ///
    /// Parameters are validated before anything is written.
    pub fn execute(&mut self, command: &Command) -> Result<Vec<u8>> {
        let frame = command.encode()?;
        self.transport.send(&frame)
    }

    /// Stop the running program
    pub fn stop(&mut self) -> Result<Vec<u8>> {
        self.execute(&Command::Stop)
    }

    /// Charge up to `max_voltage` (pack volts) at `current` amps
    pub fn charge(
        &mut self,
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        max_voltage: f64,
    ) -> Result<Vec<u8>> {
        self.execute(&Command::Charge {
            chemistry,
            cells,
            current,
            max_voltage,
        })
    }

    /// Fast charge up to `max_voltage` (pack volts) at `current` amps
    pub fn fastcharge(
        &mut self,
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        max_voltage: f64,
    ) -> Result<Vec<u8>> {
        self.execute(&Command::FastCharge {
            chemistry,
            cells,
            current,
            max_voltage,
        })
    }

    /// Discharge down to `min_voltage` (pack volts) at `current` amps
    pub fn discharge(
        &mut self,
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        min_voltage: f64,
    ) -> Result<Vec<u8>> {
        self.execute(&Command::Discharge {
            chemistry,
            cells,
            current,
            min_voltage,
        })
    }

    /// Bring the pack to `storage_voltage`; the discharge leg is capped at 1 A
    pub fn storage(
        &mut self,
        chemistry: BatteryChemistry,
        cells: u8,
        current: f64,
        storage_voltage: f64,
    ) -> Result<Vec<u8>> {
        self.execute(&Command::Storage {
            chemistry,
            cells,
            current,
            storage_voltage,
        })
    }

    /// Read live charge information
    pub fn get_charge_info(&mut self) -> Result<ChargeInfo> {
        let reply = self.execute(&Command::QueryChargeInfo)?;
        ChargeInfo::from_reply(&reply)
    }

    /// Read system settings and idle voltages
    pub fn get_sys_info(&mut self) -> Result<SysInfo> {
        let reply = self.execute(&Command::QuerySysInfo)?;
        SysInfo::from_reply(&reply)
    }

    /// Read firmware and hardware versions
    pub fn get_device_info(&mut self) -> Result<DeviceInfo> {
        let reply = self.execute(&Command::QueryDeviceInfo)?;
        DeviceInfo::from_reply(&reply)
    }
}
