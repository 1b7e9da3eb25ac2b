//! Countdown clock tests: cadence, pause/resume, bonus time and formatting.

use duomind_core::clock::{ClockSignal, ClockState, CountdownClock};

fn ticks(signals: &[ClockSignal]) -> Vec<u32> {
    signals
        .iter()
        .filter_map(|s| match s {
            ClockSignal::Tick { remaining } => Some(*remaining),
            ClockSignal::Timeout => None,
        })
        .collect()
}

/// Fire every decrement due up to and including `until`.
fn run_until(clock: &mut CountdownClock, until: u64) -> Vec<ClockSignal> {
    let mut out = Vec::new();
    while let Some(due) = clock.next_due() {
        if due > until {
            break;
        }
        out.extend(clock.fire());
    }
    out
}

#[test]
fn start_emits_immediately_and_schedules_one_second_out() {
    let mut clock = CountdownClock::default();
    let signals = clock.start(500, 60);

    assert_eq!(signals, vec![ClockSignal::Tick { remaining: 60 }]);
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.next_due(), Some(1500));
}

#[test]
fn counts_down_once_per_interval_and_times_out_once() {
    let mut clock = CountdownClock::default();
    clock.start(0, 3);

    let signals = run_until(&mut clock, 10_000);
    assert_eq!(ticks(&signals), vec![2, 1, 0]);
    let timeouts = signals.iter().filter(|s| **s == ClockSignal::Timeout).count();
    assert_eq!(timeouts, 1, "timeout must fire exactly once");
    assert_eq!(signals.last(), Some(&ClockSignal::Timeout));

    assert_eq!(clock.state(), ClockState::Expired);
    assert!(!clock.is_scheduled());
    assert!(clock.fire().is_empty(), "an expired clock must stay silent");
}

#[test]
fn starting_from_zero_expires_immediately() {
    let mut clock = CountdownClock::default();
    let signals = clock.start(0, 0);
    assert_eq!(
        signals,
        vec![ClockSignal::Tick { remaining: 0 }, ClockSignal::Timeout]
    );
    assert_eq!(clock.state(), ClockState::Expired);
    assert!(!clock.is_scheduled());
}

#[test]
fn restart_replaces_the_previous_schedule() {
    let mut clock = CountdownClock::default();
    clock.start(0, 10);
    clock.start(500, 5);

    assert_eq!(clock.remaining(), 5);
    assert_eq!(clock.next_due(), Some(1500));
    let signals = run_until(&mut clock, 1500);
    assert_eq!(ticks(&signals), vec![4], "only one decrement loop may run");
}

#[test]
fn pause_freezes_and_resume_restarts_from_now() {
    let mut clock = CountdownClock::default();
    clock.start(0, 10);
    run_until(&mut clock, 2000);
    assert_eq!(clock.remaining(), 8);

    clock.pause();
    assert_eq!(clock.state(), ClockState::Paused);
    assert!(!clock.is_scheduled());
    clock.pause();
    assert_eq!(clock.remaining(), 8, "pause must be idempotent");

    clock.resume(7300);
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.next_due(), Some(8300));

    // Resuming a running clock must not reschedule it.
    clock.resume(8000);
    assert_eq!(clock.next_due(), Some(8300));
}

#[test]
fn resume_is_a_no_op_without_remaining_time() {
    let mut clock = CountdownClock::default();
    clock.resume(0);
    assert_eq!(clock.state(), ClockState::Idle);
    assert!(!clock.is_scheduled());

    clock.start(0, 1);
    run_until(&mut clock, 1000);
    clock.resume(2000);
    assert_eq!(clock.state(), ClockState::Expired);
    assert!(!clock.is_scheduled());
}

#[test]
fn add_time_extends_without_realigning_cadence() {
    let mut clock = CountdownClock::default();
    clock.start(0, 10);
    run_until(&mut clock, 1000);
    let due_before = clock.next_due();

    let signal = clock.add_time(3);
    assert_eq!(signal, ClockSignal::Tick { remaining: 12 });
    assert_eq!(clock.next_due(), due_before);

    let signals = run_until(&mut clock, 2000);
    assert_eq!(ticks(&signals), vec![11]);
}

#[test]
fn stop_is_idempotent_and_keeps_remaining() {
    let mut clock = CountdownClock::default();
    clock.start(0, 30);
    clock.stop();
    clock.stop();
    assert_eq!(clock.state(), ClockState::Idle);
    assert_eq!(clock.remaining(), 30);
    assert!(!clock.is_scheduled());
}

#[test]
fn custom_interval_sets_the_cadence() {
    let mut clock = CountdownClock::new(250);
    clock.start(0, 4);
    let signals = run_until(&mut clock, 1000);
    assert_eq!(ticks(&signals), vec![3, 2, 1, 0]);
}

#[test]
fn format_pads_seconds_only() {
    assert_eq!(CountdownClock::format(0), "0:00");
    assert_eq!(CountdownClock::format(9), "0:09");
    assert_eq!(CountdownClock::format(59), "0:59");
    assert_eq!(CountdownClock::format(60), "1:00");
    assert_eq!(CountdownClock::format(75), "1:15");
    assert_eq!(CountdownClock::format(600), "10:00");
}

#[test]
fn schedule_saturates_at_the_end_of_time() {
    let mut clock = CountdownClock::default();
    clock.start(u64::MAX - 1, 2);
    assert_eq!(clock.next_due(), Some(u64::MAX));

    assert_eq!(ticks(&clock.fire()), vec![1]);
    assert_eq!(clock.next_due(), Some(u64::MAX));

    clock.pause();
    clock.resume(u64::MAX);
    assert_eq!(clock.next_due(), Some(u64::MAX));
    assert_eq!(clock.fire(), vec![ClockSignal::Tick { remaining: 0 }, ClockSignal::Timeout]);
    assert_eq!(clock.state(), ClockState::Expired);
}

#[test]
fn add_time_saturates() {
    let mut clock = CountdownClock::default();
    clock.start(0, u32::MAX - 1);
    assert_eq!(clock.add_time(5), ClockSignal::Tick { remaining: u32::MAX });
}
