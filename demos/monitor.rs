//! Telemetry monitor
//!
//! Polls a charger at a fixed interval and prints each aggregated snapshot
//! as JSON, the way a bridge would publish it.
//!
//! Usage:
//!   cargo run --example monitor                      # Interactive port selection
//!   cargo run --example monitor -- /dev/ttyACM0      # Specify port
//!   cargo run --example monitor -- /dev/ttyACM0 5    # Poll every 5 seconds
//!
//! Set RUST_LOG to see protocol traffic:
//!   RUST_LOG=trace cargo run --example monitor

use b6mini_protocol::{B6Error, B6Mini, Result, SerialChannel, TelemetryAggregator};
use inquire::Select;
use log::{error, info};
use std::thread;
use std::time::Duration;

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = SerialChannel::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();

    Select::new("Select the charger port:", port_names)
        .prompt()
        .map_err(|e| {
            B6Error::Channel(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Selection cancelled: {}", e),
            ))
        })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let port_name = match args.next() {
        Some(port) => port,
        None => select_port()?,
    };
    let interval = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(2));

    info!("Connecting to charger on {}...", port_name);
    let mut charger = B6Mini::open(&port_name)?;

    let device = charger.get_device_info()?;
    info!(
        "Firmware {:.2}, hardware {}",
        device.sw_version(),
        device.hw_version
    );

    let mut telemetry = TelemetryAggregator::with_initial(charger.get_charge_info()?);
    loop {
        match telemetry.poll(&mut charger) {
            Ok(snapshot) => match serde_json::to_string(&snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Could not serialise snapshot: {}", e),
            },
            Err(e) => error!("Poll failed: {}", e),
        }
        thread::sleep(interval);
    }
}
