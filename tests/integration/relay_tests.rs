//! Relay pulse bounds and exclusivity under concurrent callers.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use smsgate::drivers::relay::RelayActuator;

use crate::mock_hw::MockPin;

const HOLD: Duration = Duration::from_millis(40);

#[test]
fn construction_leaves_relay_inactive() {
    let pin = MockPin::new();
    let relay = RelayActuator::new(pin.clone(), HOLD).unwrap();
    assert_eq!(pin.history(), vec![false]);
    assert_eq!(relay.pulse_count(), 0);
    assert_eq!(relay.hold_duration(), HOLD);
}

#[test]
fn single_pulse_is_bounded() {
    let pin = MockPin::new();
    let relay = RelayActuator::new(pin.clone(), HOLD).unwrap();
    relay.pulse().unwrap();

    let pulses = pin.pulses();
    assert_eq!(pulses.len(), 1);
    let (rise, fall) = pulses[0];
    assert!(fall.duration_since(rise) >= HOLD);
    assert!(!pin.is_high());
}

#[test]
fn concurrent_pulses_never_overlap() {
    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), HOLD).unwrap());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let relay = Arc::clone(&relay);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                relay.pulse().unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(relay.pulse_count(), 2);
    assert_eq!(pin.history(), vec![false, true, false, true, false]);

    let pulses = pin.pulses();
    assert_eq!(pulses.len(), 2);
    for (rise, fall) in &pulses {
        assert!(fall.duration_since(*rise) >= HOLD);
    }
    // second rise only after first fall
    assert!(pulses[1].0 >= pulses[0].1);
}

#[test]
fn many_callers_serialise() {
    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), Duration::from_millis(2)).unwrap());

    thread::scope(|s| {
        for _ in 0..8 {
            let relay = &relay;
            s.spawn(move || relay.pulse().unwrap());
        }
    });

    assert_eq!(relay.pulse_count(), 8);
    let history = pin.history();
    // strictly alternating after the initial low: no two highs in a row
    assert!(history.windows(2).all(|w| !(w[0] && w[1])));
    assert_eq!(pin.pulses().len(), 8);
    assert!(!pin.is_high());
}
