//! # iMAX B6 Mini Protocol Library
//!
//! A Rust library for driving SkyRC iMAX B6 Mini battery chargers over their
//! USB command/response link and turning the raw readings into stable
//! telemetry.
//!
//! ## Features
//!
//! - Start charge, fast charge, discharge and storage programs, and stop them
//! - Read live charge info, system settings and firmware/hardware versions
//! - Bounded-retry transport over any [`Channel`] (serial nodes built in)
//! - Sticky aggregation that hides the zeroed readings of an idle charger
//! - Strict parsing of user-facing mode and chemistry names
//!
//! ## Example
//!
//! ```no_run
//! use b6mini_protocol::{B6Mini, BatteryChemistry, TelemetryAggregator};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut charger = B6Mini::open("/dev/ttyACM0")?;
//!     charger.charge(BatteryChemistry::LiPo, 2, 1.0, 8.4)?;
//!
//!     let mut telemetry = TelemetryAggregator::new();
//!     let snapshot = telemetry.poll(&mut charger)?;
//!     println!("{} {:.3}V {} mAh", snapshot.status.state, snapshot.voltage, snapshot.status.mah);
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod constants;
pub mod error;
pub mod fixed_point;
pub mod frame;
pub mod program;
pub mod protocol;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use command::{Command, ProgramParams};
pub use error::{B6Error, Result};
pub use program::ChargeProgram;
pub use protocol::B6Mini;
pub use telemetry::{TelemetryAggregator, TelemetrySnapshot};
pub use transport::{Channel, SerialChannel, Transport, TransportConfig};
pub use types::*;
