//! Byte channel abstraction and the retrying request/reply transport.

use crate::constants::*;
use crate::error::{B6Error, Result};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// An already-open bidirectional byte channel to the charger.
///
/// Device discovery and endpoint setup happen before a channel is handed
/// to the driver.
pub trait Channel {
    /// Write `bytes`, returning how many the channel accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read one reply of at most `max_len` bytes, waiting up to `timeout`.
    fn read(&mut self, max_len: usize, timeout: Duration) -> io::Result<Vec<u8>>;
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, max_len: usize, timeout: Duration) -> io::Result<Vec<u8>> {
        (**self).read(max_len, timeout)
    }
}

/// Channel over a serial device node (e.g. a USB CDC bridge).
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Open `port_name` with the default baud rate and read timeout.
    pub fn open(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()?;
        Ok(SerialChannel { port })
    }

    /// Wrap a port the caller already configured.
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        SerialChannel { port }
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }
}

impl Channel for SerialChannel {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.port.clear(serialport::ClearBuffer::Input)?;
        let written = Write::write(&mut self.port, bytes)?;
        Write::flush(&mut self.port)?;
        Ok(written)
    }

    fn read(&mut self, max_len: usize, timeout: Duration) -> io::Result<Vec<u8>> {
        self.port.set_timeout(timeout)?;
        let mut buf = vec![0u8; max_len];
        let n = Read::read(&mut self.port, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// Transport tuning, defaulting to the charger's documented limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Total attempts per transaction, first try included
    pub attempts: usize,
    pub read_timeout: Duration,
    pub max_reply_len: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            attempts: SEND_ATTEMPTS,
            read_timeout: Duration::from_millis(READ_TIMEOUT_MS),
            max_reply_len: MAX_REPLY_LEN,
        }
    }
}

/// Run `op` up to `attempts` times, retrying only retryable errors.
///
/// Returns the first success, the first non-retryable error, or the error
/// of the last attempt. There is no delay between attempts.
pub fn with_retries<T, F>(attempts: usize, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                log::warn!("Send failed ({}), retry {}/{}", e, attempt, attempts - 1);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sends one frame and reads one reply over an owned [`Channel`].
pub struct Transport<C: Channel> {
    channel: C,
    config: TransportConfig,
}

impl<C: Channel> Transport<C> {
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, TransportConfig::default())
    }

    pub fn with_config(channel: C, config: TransportConfig) -> Self {
        Transport { channel, config }
    }

    /// Give the channel back to the caller.
    pub fn into_inner(self) -> C {
        self.channel
    }

    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        log::trace!("TX: {}", hex(frame));
        let written = self.channel.write(frame)?;
        if written != frame.len() {
            return Err(B6Error::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        let reply = self
            .channel
            .read(self.config.max_reply_len, self.config.read_timeout)?;
        log::trace!("RX: {}", hex(&reply));
        Ok(reply)
    }

    /// Write `frame` and return the raw reply, retrying channel errors.
    ///
    /// A short write is returned immediately without retrying.
    pub fn send(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        let attempts = self.config.attempts;
        with_retries(attempts, || self.exchange(frame))
    }
}
