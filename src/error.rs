//! Error types for iMAX B6 Mini protocol operations.

use thiserror::Error;

/// Result type alias for charger operations.
pub type Result<T> = std::result::Result<T, B6Error>;

/// Error types for charger communication.
#[derive(Error, Debug)]
pub enum B6Error {
    /// I/O failure on the byte channel
    #[error("Channel error: {0}")]
    Channel(#[from] std::io::Error),

    /// Serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// Channel accepted fewer bytes than the frame holds
    #[error("Short write: {written} of {expected} bytes accepted")]
    ShortWrite {
        /// Bytes the channel reported as written
        written: usize,
        /// Length of the frame
        expected: usize,
    },

    /// Reply is shorter than the query requires
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum length for the query
        expected: usize,
        /// Length actually received
        actual: usize,
    },

    /// Cell count outside 1..=6
    #[error("Invalid cell count: {0} (expected 1-6)")]
    InvalidCellCount(u8),

    /// Current must be positive and finite
    #[error("Invalid current: {0}A")]
    InvalidCurrent(f64),

    /// Value does not fit the 16-bit fixed-point encoding
    #[error("{field} out of range: {value}")]
    FieldOutOfRange {
        /// Name of the encoded field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Unrecognised battery chemistry name
    #[error("Unknown battery chemistry: {0}")]
    UnknownChemistry(String),

    /// Unrecognised operating mode name
    #[error("Unknown operating mode: {0}")]
    UnknownMode(String),

    /// Program parameter that is unknown or does not parse
    #[error("Invalid parameter {name}: {value:?}")]
    InvalidParameter {
        /// Parameter name as given
        name: String,
        /// Raw value as given
        value: String,
    },
}

impl B6Error {
    /// Whether the transport may retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, B6Error::Channel(_))
    }
}
