use b6mini_protocol::{
    B6Error, B6Mini, BatteryChemistry, Channel, ChargeProgram, ChargeState, TelemetryAggregator,
};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// In-memory charger: records every frame written and replays scripted replies.
#[derive(Default)]
struct ScriptedChannel {
    sent: Vec<Vec<u8>>,
    replies: VecDeque<io::Result<Vec<u8>>>,
}

impl ScriptedChannel {
    fn reply(mut self, bytes: Vec<u8>) -> Self {
        self.replies.push_back(Ok(bytes));
        self
    }

    fn fail(mut self) -> Self {
        self.replies
            .push_back(Err(io::Error::new(io::ErrorKind::TimedOut, "usb timeout")));
        self
    }
}

impl Channel for ScriptedChannel {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.sent.push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn read(&mut self, max_len: usize, timeout: Duration) -> io::Result<Vec<u8>> {
        assert_eq!(max_len, 64);
        assert_eq!(timeout, Duration::from_millis(500));
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::Other, "no reply scripted")))
    }
}

fn word(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn charge_reply(state: u8, mah: u16, secs: u16, mv: u16, ma: u16, impedance: u16) -> Vec<u8> {
    let mut b = vec![0xF0, 0xFF, 0x55, 0x00, state];
    word(&mut b, mah);
    word(&mut b, secs);
    word(&mut b, mv);
    word(&mut b, ma);
    b.push(27);
    b.push(33);
    word(&mut b, impedance);
    for i in 0..6 {
        word(&mut b, if i < 2 { mv / 2 } else { 0 });
    }
    b.resize(64, 0);
    b
}

fn sys_reply(mv: u16) -> Vec<u8> {
    let mut b = vec![0xF0, 0xFF, 0x5A, 0x00, 0, 1];
    word(&mut b, 240);
    b.push(0);
    word(&mut b, 5000);
    b.push(1);
    b.push(1);
    word(&mut b, 11000);
    b.extend_from_slice(&[0, 0]);
    b.push(80);
    word(&mut b, mv);
    word(&mut b, mv / 2);
    word(&mut b, mv / 2);
    b.resize(64, 0);
    b
}

#[test]
fn stop_writes_stop_frame() {
    let mut charger = B6Mini::new(ScriptedChannel::default().reply(vec![0xF0]));
    charger.stop().unwrap();
    let channel = charger.into_inner();
    assert_eq!(
        channel.sent,
        vec![vec![0x0F, 0x03, 0xFE, 0x00, 0xFE, 0xFF, 0xFF]]
    );
}

#[test]
fn invalid_parameters_never_reach_the_channel() {
    let mut charger = B6Mini::new(ScriptedChannel::default());
    assert!(matches!(
        charger.charge(BatteryChemistry::LiPo, 0, 1.0, 4.2),
        Err(B6Error::InvalidCellCount(0))
    ));
    assert!(matches!(
        charger.discharge(BatteryChemistry::LiPo, 2, -1.0, 6.0),
        Err(B6Error::InvalidCurrent(_))
    ));
    assert!(charger.into_inner().sent.is_empty());
}

#[test]
fn storage_frame_caps_discharge_leg() {
    let mut charger = B6Mini::new(ScriptedChannel::default().reply(vec![0xF0]));
    charger
        .storage(BatteryChemistry::LiPo, 2, 5.0, 7.6)
        .unwrap();
    let frame = &charger.into_inner().sent[0];
    assert_eq!(frame.len(), 26);
    assert_eq!(&frame[7..9], &5000u16.to_be_bytes());
    assert_eq!(&frame[9..11], &1000u16.to_be_bytes());
    assert_eq!(&frame[13..15], &7600u16.to_be_bytes());
}

#[test]
fn charge_info_query_decodes_reply() {
    let channel = ScriptedChannel::default().reply(charge_reply(1, 321, 60, 8200, 1500, 18));
    let mut charger = B6Mini::new(channel);
    let info = charger.get_charge_info().unwrap();
    assert_eq!(info.state, ChargeState::Running);
    assert_eq!(info.mah, 321);
    assert_eq!(info.voltage, 8.2);
    assert_eq!(info.current, 1500);
    assert_eq!(info.impedance_int, 18);
    assert_eq!(info.cells[..2], [4.1, 4.1]);
    assert_eq!(
        charger.into_inner().sent[0],
        vec![0x0F, 0x03, 0x55, 0x00, 0x55, 0xFF, 0xFF]
    );
}

#[test]
fn short_reply_is_not_retried() {
    let channel = ScriptedChannel::default()
        .reply(vec![0xF0, 0xFF, 0x55, 0x00, 0x01])
        .reply(charge_reply(1, 1, 1, 4200, 100, 1));
    let mut charger = B6Mini::new(channel);
    assert!(matches!(
        charger.get_charge_info(),
        Err(B6Error::FrameTooShort { expected: 30, actual: 5 })
    ));
    assert_eq!(charger.into_inner().sent.len(), 1);
}

#[test]
fn device_info_survives_transient_failures() {
    let mut reply = vec![0u8; 13];
    reply.extend_from_slice(&[1, 10, 2]);
    let channel = ScriptedChannel::default()
        .fail()
        .fail()
        .fail()
        .fail()
        .reply(reply);
    let mut charger = B6Mini::new(channel);
    let info = charger.get_device_info().unwrap();
    assert!((info.sw_version() - 1.10).abs() < 1e-9);
    assert_eq!(info.hw_version, 2);
    assert_eq!(charger.into_inner().sent.len(), 5);
}

#[test]
fn sys_info_gives_up_after_retry_budget() {
    let channel = ScriptedChannel::default()
        .fail()
        .fail()
        .fail()
        .fail()
        .fail()
        .reply(sys_reply(7400));
    let mut charger = B6Mini::new(channel);
    assert!(matches!(charger.get_sys_info(), Err(B6Error::Channel(_))));
}

#[test]
fn telemetry_keeps_last_run_after_done() {
    let channel = ScriptedChannel::default()
        .reply(charge_reply(1, 500, 1800, 8300, 1200, 30))
        .reply(sys_reply(7900))
        .reply(charge_reply(3, 0, 0, 0, 0, 42))
        .reply(sys_reply(7900));
    let mut charger = B6Mini::new(channel);
    let mut telemetry = TelemetryAggregator::new();

    let first = telemetry.poll(&mut charger).unwrap();
    assert_eq!(first.status.state, ChargeState::Running);
    assert_eq!(first.voltage, 8.3);

    let second = telemetry.poll(&mut charger).unwrap();
    assert_eq!(second.status.state, ChargeState::Done);
    assert_eq!(second.status.state.label(), "DONE");
    assert_eq!(second.status.mah, 500);
    assert_eq!(second.status.time_sec, 1800);
    assert_eq!(second.status.current, 0);
    assert_eq!(second.status.temp_int, 0);
    assert_eq!(second.status.temp_ext, 0);
    assert_eq!(second.status.impedance_int, 42);
    assert_eq!(second.voltage, 7.9);
    assert_eq!(second.cells[..2], [3.95, 3.95]);
    assert_eq!(second.sys_info.time_limit, 240);

    let json = serde_json::to_value(&second).unwrap();
    assert_eq!(json["status"]["mah"], 500);
    assert_eq!(json["sys_info"]["cap_limit"], 5000);
}

#[test]
fn failed_poll_leaves_aggregate_untouched() {
    let channel = ScriptedChannel::default()
        .reply(charge_reply(1, 500, 1800, 8300, 1200, 30))
        .reply(sys_reply(7900))
        .reply(vec![0xF0, 0xFF]);
    let mut charger = B6Mini::new(channel);
    let mut telemetry = TelemetryAggregator::new();
    telemetry.poll(&mut charger).unwrap();
    assert!(telemetry.poll(&mut charger).is_err());
    assert_eq!(telemetry.status().current, 1200);
}

#[test]
fn program_start_sends_cell_scaled_voltage() {
    let mut program = ChargeProgram::default();
    program.set("mode", "discharge").unwrap();
    program.set("battery_type", "NiMH").unwrap();
    program.set("cells", "4").unwrap();
    program.set("current", "0.5").unwrap();
    program.set("min_voltage", "1.0").unwrap();

    let mut charger = B6Mini::new(ScriptedChannel::default().reply(vec![0xF0]));
    program.start(&mut charger).unwrap();
    let frame = &charger.into_inner().sent[0];
    assert_eq!(frame[4], 4);
    assert_eq!(frame[5], 4);
    assert_eq!(frame[6], 1);
    assert_eq!(&frame[9..11], &500u16.to_be_bytes());
    assert_eq!(&frame[11..13], &4000u16.to_be_bytes());
}
