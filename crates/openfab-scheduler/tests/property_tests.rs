//! Property-based tests for the scheduler crate.

use openfab_scheduler::{DispatchMetrics, Edge, Event, EventQueue, MonoTime};
use quickcheck_macros::quickcheck;

fn deadline_from_offset(offset_ns: u32) -> MonoTime {
    MonoTime::new(1_000, offset_ns as u64)
}

#[quickcheck]
fn queue_pops_in_nondecreasing_deadline_order(offsets: Vec<u32>) {
    let mut queue = EventQueue::new();
    for &offset in &offsets {
        queue.insert(Event::new(deadline_from_offset(offset), 0, Edge::Rise));
    }

    let mut last = None;
    while let Some(evt) = queue.pop_min() {
        if let Some(prev) = last {
            assert!(evt.deadline() >= prev, "deadlines went backwards");
        }
        last = Some(evt.deadline());
    }
}

#[quickcheck]
fn queue_returns_every_event_exactly_once(offsets: Vec<u32>) {
    let base = MonoTime::new(1_000, 0);
    let mut queue = EventQueue::new();
    for &offset in &offsets {
        queue.insert(Event::new(deadline_from_offset(offset), 0, Edge::Rise));
    }
    assert_eq!(queue.len(), offsets.len());

    let mut popped: Vec<u64> = std::iter::from_fn(|| queue.pop_min())
        .map(|evt| evt.deadline().nanos_since(base))
        .collect();
    assert!(queue.is_empty());

    let mut expected: Vec<u64> = offsets.into_iter().map(u64::from).collect();
    expected.sort_unstable();
    popped.sort_unstable();
    assert_eq!(popped, expected);
}

#[quickcheck]
fn equal_deadlines_pop_in_insertion_order(len: u8) {
    let deadline = MonoTime::new(50, 0);
    let mut queue = EventQueue::new();
    for i in 0..len {
        queue.insert(Event::new(deadline, i, Edge::Rise));
    }
    for expected in 0..len {
        assert_eq!(queue.pop_min().map(|evt| evt.channel()), Some(expected));
    }
    assert!(queue.pop_min().is_none());
}

#[quickcheck]
fn peek_latest_is_the_maximum_deadline(offsets: Vec<u32>) {
    let mut queue = EventQueue::new();
    for &offset in &offsets {
        queue.insert(Event::new(deadline_from_offset(offset), 0, Edge::Rise));
    }

    match offsets.iter().max() {
        None => assert!(queue.peek_latest().is_none()),
        Some(&max) => {
            let tail = queue.peek_latest().map(|evt| evt.deadline());
            assert_eq!(tail, Some(deadline_from_offset(max)));
        }
    }
}

#[quickcheck]
fn monotime_nanos_stay_normalized(secs: u32, nanos: u64, extra: u64) {
    let t = MonoTime::new(secs as i64, nanos % 4_000_000_000)
        .add_nanos(extra % 10_000_000_000);
    assert!(t.subsec_nanos() < 1_000_000_000);
}

#[quickcheck]
fn monotime_add_splits(a: u32, b: u32) {
    let t = MonoTime::new(100, 999_999_999);
    assert_eq!(
        t.add_nanos(a as u64 + b as u64),
        t.add_nanos(a as u64).add_nanos(b as u64)
    );
}

#[quickcheck]
fn nanos_since_inverts_add(secs: u32, ns: u32) {
    let t = MonoTime::new(secs as i64, 0);
    let later = t.add_nanos(ns as u64);
    assert_eq!(later.nanos_since(t), ns as u64);
    assert_eq!(t.nanos_since(later), 0);
}

#[quickcheck]
fn lateness_percentiles_are_monotonic(samples: Vec<u64>) {
    if samples.is_empty() {
        return;
    }

    let mut metrics = DispatchMetrics::with_capacity(samples.len().min(10_000));
    for &sample in &samples {
        metrics.record_dispatch(sample.min(10_000_000_000), false);
    }

    let p50 = metrics.percentile_lateness_ns(0.50);
    let p95 = metrics.percentile_lateness_ns(0.95);
    let p99 = metrics.p99_lateness_ns();
    assert!(p50 <= p95, "p50 ({p50}) > p95 ({p95})");
    assert!(p95 <= p99, "p95 ({p95}) > p99 ({p99})");
}

#[quickcheck]
fn tardy_rate_stays_in_bounds(total: u16, tardy: u16) {
    let total = total as u64;
    let tardy = (tardy as u64).min(total);

    let mut metrics = DispatchMetrics::with_capacity(0);
    for i in 0..total {
        metrics.record_dispatch(100, i < tardy);
    }

    let rate = metrics.tardy_rate();
    assert!((0.0..=1.0).contains(&rate));
    if total > 0 {
        let expected = tardy as f64 / total as f64;
        assert!((rate - expected).abs() < 1e-10);
    } else {
        assert_eq!(rate, 0.0);
    }
}
