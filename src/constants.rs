//! Protocol constants for iMAX B6 Mini communication.
//!
//! This module defines the command opcodes, framing bytes, timing parameters
//! and charge-program defaults used on the charger's USB link.

/// First byte of every request frame
pub const FRAME_START: u8 = 0x0F;

/// Two bytes closing every request frame
pub const FRAME_END: [u8; 2] = [0xFF, 0xFF];

/// Stop the running program
pub const STOP_CMD: u8 = 0xFE;

/// Start a charge/discharge/storage program
pub const PROGRAM_CMD: u8 = 0x05;

/// Query live charge information
pub const CHARGE_INFO_CMD: u8 = 0x55;

/// Query firmware and hardware versions
pub const DEVICE_INFO_CMD: u8 = 0x57;

/// Query system settings and idle voltages
pub const SYS_INFO_CMD: u8 = 0x5A;

/// Trailing zero bytes appended to a program command
pub const PROGRAM_PADDING: usize = 8;

/// Opaque header preceding the fields of every reply
pub const REPLY_HEADER_LEN: usize = 4;

/// Minimum reply length accepted for a charge info query
pub const CHARGE_INFO_MIN_LEN: usize = 30;

/// Minimum reply length accepted for a system info query
pub const SYS_INFO_MIN_LEN: usize = 32;

/// Offset of the version fields in a device info reply
pub const DEVICE_INFO_OFFSET: usize = 13;

/// Minimum reply length accepted for a device info query
pub const DEVICE_INFO_MIN_LEN: usize = DEVICE_INFO_OFFSET + 3;

/// Number of cell voltage slots reported by the charger
pub const CELL_SLOTS: usize = 6;

/// Largest cell count a program may be started with
pub const MAX_CELLS: u8 = 6;

/// Largest reply read from the channel in one transaction
pub const MAX_REPLY_LEN: usize = 64;

/// Read timeout in milliseconds
pub const READ_TIMEOUT_MS: u64 = 500;

/// Send attempts per transaction (first try included)
pub const SEND_ATTEMPTS: usize = 5;

/// Baud rate used when the channel is a serial device
pub const BAUD_RATE: u32 = 115_200;

/// Storage mode caps its discharge leg at this current (amps)
pub const STORAGE_DISCHARGE_LIMIT_A: f64 = 1.0;

/// Per-cell target voltage for charge and fast charge programs
pub const CELL_FULL_VOLTAGE: f64 = 4.2;

/// Per-cell target voltage for storage programs
pub const CELL_STORAGE_VOLTAGE: f64 = 3.8;
