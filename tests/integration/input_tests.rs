//! Input Port Manager integration tests.
//!
//! Drive the expanders' pins and interrupt lines through the mock bus and
//! check the classified events that reach the listener.

use panelio::adapters::hardware::GpioInterruptLines;
use panelio::addressing::LogicalPort;
use panelio::app::events::{EventRecorder, PanelEvent};
use panelio::inputs::{ContactState, InputPortManager};
use panelio::profiles;

use super::mock_hw::{DEBOUNCE, MockBus, idle_bus, input_profile};

type Manager = InputPortManager<GpioInterruptLines, EventRecorder>;

const INT_0: u8 = 34;
const INT_1: u8 = 35;

fn started(bus: &mut MockBus) -> Manager {
    let mut mgr = InputPortManager::new(
        input_profile(),
        DEBOUNCE,
        GpioInterruptLines::new(),
        EventRecorder::new(),
    );
    mgr.begin(bus).unwrap();
    mgr
}

fn events(mgr: &mut Manager) -> Vec<(LogicalPort, bool)> {
    let mut out = Vec::new();
    mgr.listener_mut().drain(|e| {
        if let PanelEvent::Port { port, long_press } = e {
            out.push((port, long_press));
        }
    });
    out
}

#[test]
fn short_then_long_then_fresh_short() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);
    let port = LogicalPort::new(12, 1);

    bus.set_bit(0x20, 3, true);
    mgr.lines_mut().set_asserted(INT_0, true);
    mgr.poll(&mut bus, 0);
    mgr.lines_mut().set_asserted(INT_0, false);
    assert!(events(&mut mgr).is_empty());

    mgr.poll(&mut bus, 40);
    assert!(events(&mut mgr).is_empty());

    mgr.poll(&mut bus, 60);
    assert_eq!(events(&mut mgr), [(port, false)]);

    mgr.poll(&mut bus, 1000);
    assert!(events(&mut mgr).is_empty());

    mgr.poll(&mut bus, 1600);
    assert_eq!(events(&mut mgr), [(port, true)]);

    mgr.poll(&mut bus, 1650);
    assert!(events(&mut mgr).is_empty());

    bus.set_bit(0x20, 3, false);
    mgr.lines_mut().set_asserted(INT_0, true);
    mgr.poll(&mut bus, 1700);
    mgr.lines_mut().set_asserted(INT_0, false);
    mgr.poll(&mut bus, 1900);
    assert!(events(&mut mgr).is_empty());

    bus.set_bit(0x20, 3, true);
    mgr.lines_mut().set_asserted(INT_0, true);
    mgr.poll(&mut bus, 2000);
    mgr.lines_mut().set_asserted(INT_0, false);
    mgr.poll(&mut bus, 2060);
    assert_eq!(events(&mut mgr), [(port, false)]);
}

#[test]
fn bounce_shorter_than_threshold_emits_nothing() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);
    mgr.lines_mut().set_asserted(INT_0, true);

    bus.set_bit(0x20, 0, true);
    mgr.poll(&mut bus, 100);
    bus.set_bit(0x20, 0, false);
    mgr.poll(&mut bus, 130);

    for t in (130..4000).step_by(100) {
        mgr.poll(&mut bus, t);
    }
    assert!(events(&mut mgr).is_empty());
}

#[test]
fn second_device_ports_are_offset() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);

    bus.set_bit(0x21, 3, true);
    mgr.lines_mut().set_asserted(INT_1, true);
    mgr.poll(&mut bus, 0);
    mgr.poll(&mut bus, 100);

    assert_eq!(events(&mut mgr), [(LogicalPort::new(16, 1), false)]);
    assert_eq!(
        mgr.observed(LogicalPort::new(16, 1)),
        Some(ContactState::Closed)
    );
    assert_eq!(
        mgr.observed(LogicalPort::new(12, 1)),
        Some(ContactState::Open)
    );
}

#[test]
fn reed_switch_opening_is_abnormal_without_long_press() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);
    let reed = LogicalPort::new(15, 1);

    bus.set_bit(0x20, 15, false);
    mgr.lines_mut().set_asserted(INT_0, true);
    mgr.poll(&mut bus, 0);
    mgr.poll(&mut bus, 60);
    mgr.poll(&mut bus, 5000);

    assert_eq!(events(&mut mgr), [(reed, false)]);
}

#[test]
fn unasserted_line_skips_the_read() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);
    bus.clear();

    bus.set_bit(0x20, 0, true);
    for t in (0..3000).step_by(50) {
        mgr.poll(&mut bus, t);
    }
    assert_eq!(bus.transactions, 0);
    assert!(events(&mut mgr).is_empty());
}

#[test]
fn transitions_between_polls_collapse() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);
    mgr.lines_mut().set_asserted(INT_0, true);

    // Closed and reopened between two samples: never observed.
    bus.set_bit(0x20, 1, true);
    bus.set_bit(0x20, 1, false);
    mgr.poll(&mut bus, 0);
    mgr.poll(&mut bus, 500);

    assert!(events(&mut mgr).is_empty());
    assert!(mgr.channel_state(0, 1).unwrap().is_at_rest());
}

#[test]
fn simultaneous_presses_report_in_bit_order() {
    let mut bus = idle_bus();
    let mut mgr = started(&mut bus);

    bus.set_bit(0x20, 4, true);
    bus.set_bit(0x20, 0, true);
    mgr.lines_mut().set_asserted(INT_0, true);
    mgr.poll(&mut bus, 0);
    mgr.poll(&mut bus, 50);

    assert_eq!(
        events(&mut mgr),
        [
            (LogicalPort::new(12, 2), false),
            (LogicalPort::new(13, 2), false)
        ]
    );
}

#[test]
fn built_in_profile_starts_every_expander() {
    let p = profiles::for_product(0x3232_2505).unwrap();
    let mut bus = MockBus::new();
    for a in 0x20..0x28 {
        bus.set_inputs(a, 0xFFFF);
    }
    let mut mgr = InputPortManager::new(
        p.inputs,
        p.debounce,
        GpioInterruptLines::new(),
        EventRecorder::new(),
    );
    mgr.begin(&mut bus).unwrap();

    let health = mgr.health();
    assert_eq!(health.count(), 8);
    assert!(health.all_enabled());
    assert!(mgr.lines_mut().is_input(15));
    assert!(mgr.listener().is_empty());
}
