//! Output Port Manager integration tests.

use panelio::app::events::EventRecorder;
use panelio::outputs::{OutputPortManager, OutputType, SetPortResult};
use panelio::profiles;

use super::mock_hw::{MockBus, output_profile};

fn started(bus: &mut MockBus) -> OutputPortManager<EventRecorder> {
    let mut mgr = OutputPortManager::new(output_profile(), EventRecorder::new());
    mgr.begin(bus).unwrap();
    bus.clear();
    mgr
}

#[test]
fn begin_leaves_every_output_off() {
    let mut bus = MockBus::new();
    let mgr = started(&mut bus);

    for port in mgr.ports() {
        assert_eq!(mgr.get_port_value(port), 0);
    }
    assert_eq!(mgr.ports().count(), 32);
    assert!(mgr.health().all_enabled());
}

#[test]
fn binary_port_saturates_and_suppresses_repeats() {
    let mut bus = MockBus::new();
    let mut mgr = started(&mut bus);

    assert_eq!(mgr.port_type(5), Some(OutputType::Binary));
    assert_eq!(mgr.set_port_value(&mut bus, 5, 50), SetPortResult::Success);
    assert_eq!(bus.led_ticks(0x40, 4), Some(4095));
    assert_eq!(mgr.set_port_value(&mut bus, 5, 80), SetPortResult::Excessive);
    assert_eq!(bus.transactions, 1);
}

#[test]
fn variable_port_drives_duty_cycle() {
    let mut bus = MockBus::new();
    let mut mgr = started(&mut bus);

    assert_eq!(mgr.set_port_value(&mut bus, 9, 25), SetPortResult::Success);
    assert_eq!(bus.led_ticks(0x40, 8), Some(1024));
    assert_eq!(mgr.get_port_value(9), 25);

    assert_eq!(mgr.set_port_value(&mut bus, 25, 97), SetPortResult::Success);
    assert_eq!(bus.led_ticks(0x41, 8), Some(4095));
    assert_eq!(mgr.get_port_value(25), 100);
}

#[test]
fn deadband_suppresses_near_zero_writes() {
    let mut bus = MockBus::new();
    let mut mgr = started(&mut bus);

    for p in 0..5 {
        assert_eq!(mgr.set_port_value(&mut bus, 9, p), SetPortResult::Excessive);
    }
    assert_eq!(mgr.set_port_value(&mut bus, 9, 100), SetPortResult::Success);
    assert_eq!(mgr.set_port_value(&mut bus, 9, 96), SetPortResult::Excessive);
    assert_eq!(mgr.set_port_value(&mut bus, 9, 255), SetPortResult::Excessive);
    assert_eq!(bus.transactions, 1);
}

#[test]
fn disable_forces_zero_and_blocks_writes() {
    let mut bus = MockBus::new();
    let mut mgr = started(&mut bus);

    assert_eq!(mgr.set_port_value(&mut bus, 9, 60), SetPortResult::Success);
    assert_eq!(mgr.enable_port(&mut bus, 9, false), SetPortResult::Success);
    assert_eq!(bus.led_ticks(0x40, 8), Some(0));
    assert_eq!(mgr.set_port_value(&mut bus, 9, 60), SetPortResult::PortNotEnabled);

    // Re-enabling does not restore the previous level.
    assert_eq!(mgr.enable_port(&mut bus, 9, true), SetPortResult::Success);
    assert_eq!(mgr.get_port_value(9), 0);
    assert_eq!(bus.led_ticks(0x40, 8), Some(0));
}

#[test]
fn labels_are_bookkeeping_only() {
    let mut bus = MockBus::new();
    let mut mgr = started(&mut bus);

    mgr.set_port_id(17, "GATE-2").unwrap();
    assert_eq!(mgr.port_id(17), Some("GATE-2"));
    assert_eq!(mgr.port_id(18), Some(""));
    assert_eq!(mgr.port_id(99), None);
    assert_eq!(bus.transactions, 0);
}

#[test]
fn six_port_board_uses_its_pin_table() {
    let p = profiles::for_product(0x0806_2305).unwrap();
    let mut bus = MockBus::new();
    let mut mgr = OutputPortManager::new(p.outputs, EventRecorder::new());
    mgr.begin(&mut bus).unwrap();

    assert_eq!(mgr.set_port_value(&mut bus, 3, 100), SetPortResult::Success);
    // Port 3 is wired to pin 3 and port 4 to pin 2.
    assert_eq!(bus.led_ticks(0x40, 3), Some(4095));
    assert_eq!(bus.led_ticks(0x40, 2), Some(0));
    assert_eq!(
        mgr.set_port_value(&mut bus, 7, 100),
        SetPortResult::InvalidPort
    );
}
