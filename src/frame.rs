//! Request framing and reply length checks.
//!
//! A request frame is laid out as:
//!
//! ```text
//! 0x0F | len | cmd | payload... | checksum | 0xFF 0xFF
//! ```
//!
//! where `len` counts itself, `cmd` and the payload, and `checksum` is the
//! 8-bit sum of `cmd` and every payload byte (the frame from its third byte
//! up to the last payload byte).
//!
//! Replies start with a 4-byte header the charger fills in; the fields after
//! it are decoded by the response types. Inbound checksums are not verified.

use crate::constants::{FRAME_END, FRAME_START};
use crate::error::{B6Error, Result};

/// Bytes added around the command body: start byte, checksum and end marker
pub const FRAME_OVERHEAD: usize = 1 + 1 + FRAME_END.len();

/// Sum `cmd` and the payload, truncated to 8 bits.
pub fn checksum(command_id: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(command_id, |acc, &b| acc.wrapping_add(b))
}

/// Build a complete request frame for `command_id` and `payload`.
pub fn encode(command_id: u8, payload: &[u8]) -> Vec<u8> {
    let body_len = payload.len() + 2;
    let mut frame = Vec::with_capacity(body_len + FRAME_OVERHEAD);
    frame.push(FRAME_START);
    frame.push(body_len as u8);
    frame.push(command_id);
    frame.extend_from_slice(payload);
    frame.push(checksum(command_id, payload));
    frame.extend_from_slice(&FRAME_END);
    frame
}

/// Whether `frame` is a well-formed request: start byte, end marker and a
/// checksum matching the bytes it covers.
pub fn is_well_formed(frame: &[u8]) -> bool {
    if frame.len() < 2 + FRAME_OVERHEAD
        || frame[0] != FRAME_START
        || !frame.ends_with(&FRAME_END)
    {
        return false;
    }
    let checksum_at = frame.len() - 1 - FRAME_END.len();
    let window = &frame[2..checksum_at];
    checksum(window[0], &window[1..]) == frame[checksum_at]
}

/// Ensure a reply holds at least `min_len` bytes before it is decoded.
pub fn check_reply_len(reply: &[u8], min_len: usize) -> Result<()> {
    if reply.len() < min_len {
        log::warn!(
            "Reply too short - required={} received={}",
            min_len,
            reply.len()
        );
        return Err(B6Error::FrameTooShort {
            expected: min_len,
            actual: reply.len(),
        });
    }
    Ok(())
}
