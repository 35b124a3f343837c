//! End-to-end tests for the scheduler crate.
//!
//! Scenario tests drive `next_event` from the test thread so assertions on
//! queue contents stay deterministic; deadlines are exact arithmetic, so
//! spacing checks compare deadlines rather than wall-clock wakeups.

use openfab_scheduler::{Edge, Event, MonoTime, Scheduler, SchedulerConfig};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn scheduler_with_buffer(buffer_size: usize) -> Scheduler {
    Scheduler::new(SchedulerConfig::default().with_buffer_size(buffer_size)).expect("valid config")
}

#[test]
fn events_come_back_in_deadline_order() {
    let scheduler = scheduler_with_buffer(16);
    let t0 = MonoTime::now();

    scheduler.queue(Event::new(t0.add_nanos(30_000_000), 1, Edge::Rise));
    scheduler.queue(Event::new(t0.add_nanos(10_000_000), 2, Edge::Rise));
    scheduler.queue(Event::new(t0.add_nanos(20_000_000), 1, Edge::Rise));

    let first = scheduler.next_event();
    let second = scheduler.next_event();
    let third = scheduler.next_event();

    assert_eq!(first.channel(), 2);
    assert_eq!(first.deadline(), t0.add_nanos(10_000_000));
    assert_eq!(second.channel(), 1);
    assert_eq!(second.deadline(), t0.add_nanos(20_000_000));
    assert_eq!(third.channel(), 1);
    assert_eq!(third.deadline(), t0.add_nanos(30_000_000));

    // The consumer slept to each absolute deadline on the way.
    assert!(MonoTime::now() >= third.deadline());
}

#[test]
fn pwm_seed_alternates_with_the_configured_half_periods() {
    let scheduler = scheduler_with_buffer(16);
    let t0 = MonoTime::now();

    scheduler.schedule_pwm(5, 1_000_000, 2_000_000);

    let rise = scheduler.next_event();
    let fall = scheduler.next_event();
    let rise2 = scheduler.next_event();

    assert_eq!(
        (rise.channel(), rise.edge()),
        (5, Edge::Rise),
        "seed edge"
    );
    // The seed is stamped when schedule_pwm runs, i.e. "now".
    assert!(rise.deadline() >= t0);
    assert!(rise.deadline().nanos_since(t0) < 100_000_000);

    assert_eq!((fall.channel(), fall.edge()), (5, Edge::Fall));
    assert_eq!(fall.deadline(), rise.deadline().add_nanos(1_000_000));

    assert_eq!((rise2.channel(), rise2.edge()), (5, Edge::Rise));
    assert_eq!(rise2.deadline(), fall.deadline().add_nanos(2_000_000));
}

#[test]
fn pwm_update_changes_duty_without_reseeding() {
    let scheduler = scheduler_with_buffer(16);
    scheduler.schedule_pwm(5, 1_000_000, 2_000_000);

    let rise = scheduler.next_event();
    assert_eq!(rise.edge(), Edge::Rise);
    assert_eq!(scheduler.pending(), 1);

    // Updating an active channel must not enqueue anything.
    scheduler.schedule_pwm(5, 500_000, 500_000);
    assert_eq!(scheduler.pending(), 1);

    // The edge already in flight was generated under the old duty; the one
    // after it regenerates with the new one.
    let fall = scheduler.next_event();
    assert_eq!(fall.deadline(), rise.deadline().add_nanos(1_000_000));

    let rise2 = scheduler.next_event();
    assert_eq!(rise2.deadline(), fall.deadline().add_nanos(500_000));
}

#[test]
fn pwm_stops_gracefully_after_both_zero() {
    let scheduler = scheduler_with_buffer(16);
    scheduler.schedule_pwm(5, 2_000_000, 2_000_000);

    let _rise = scheduler.next_event();
    assert_eq!(scheduler.pending(), 1);

    scheduler.schedule_pwm(5, 0, 0);
    // No seed, no removal: just the in-flight Fall.
    assert_eq!(scheduler.pending(), 1);

    let fall = scheduler.next_event();
    assert_eq!(fall.edge(), Edge::Fall);

    // The Fall found low_ns == 0 and regenerated nothing.
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn backpressure_blocks_the_overflowing_producer() {
    let scheduler = Arc::new(scheduler_with_buffer(4));
    let t0 = MonoTime::now();

    // Five immediate events; the gate is still open because the consumer
    // has not observed saturation yet.
    for ch in 0..5u8 {
        scheduler.queue(Event::new(t0, ch, Edge::Rise));
    }
    assert_eq!(scheduler.pending(), 5);

    // One pop leaves four queued, exactly at capacity, so the consumer
    // closes the gate.
    let first = scheduler.next_event();
    assert_eq!(first.channel(), 0);
    assert_eq!(scheduler.pending(), 4);

    let (tx, rx) = mpsc::channel();
    let producer = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || {
            scheduler.queue(Event::new(MonoTime::now(), 9, Edge::Rise));
            tx.send(()).expect("send unblock notice");
        })
    };

    // The overflowing insert must stall while the gate is closed.
    assert!(
        rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "producer should be throttled at capacity"
    );

    // The next pop drops below capacity and reopens the gate.
    let second = scheduler.next_event();
    assert_eq!(second.channel(), 1);
    rx.recv_timeout(Duration::from_secs(5))
        .expect("producer should unblock after a pop");
    producer.join().expect("producer thread");
    assert_eq!(scheduler.pending(), 4);
}

#[test]
fn concurrent_producers_lose_nothing() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 8;

    let scheduler = Arc::new(scheduler_with_buffer(64));
    let t0 = MonoTime::now();

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let ch = (p * PER_PRODUCER + i) as u8;
                    scheduler.queue(Event::new(
                        t0.add_nanos(ch as u64 * 100_000),
                        ch,
                        Edge::Rise,
                    ));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer thread");
    }

    let mut channels_seen = vec![false; PRODUCERS * PER_PRODUCER];
    let mut last_deadline = None;
    for _ in 0..PRODUCERS * PER_PRODUCER {
        let evt = scheduler.next_event();
        assert!(
            !std::mem::replace(&mut channels_seen[evt.channel() as usize], true),
            "channel {} dispatched twice",
            evt.channel()
        );
        if let Some(last) = last_deadline {
            assert!(evt.deadline() >= last, "deadlines went backwards");
        }
        last_deadline = Some(evt.deadline());
    }
    assert!(channels_seen.into_iter().all(|seen| seen));
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn producers_chain_after_the_scheduled_tail() {
    let scheduler = scheduler_with_buffer(16);
    let t0 = MonoTime::now();

    let tail = t0.add_nanos(5_000_000);
    scheduler.queue(Event::new(t0.add_nanos(1_000_000), 0, Edge::Rise));
    scheduler.queue(Event::new(tail, 1, Edge::Rise));

    let next = scheduler.last_scheduled_time().add_nanos(1_000_000);
    scheduler.queue(Event::new(next, 2, Edge::Rise));

    assert_eq!(next, tail.add_nanos(1_000_000));
    assert_eq!(scheduler.next_event().channel(), 0);
    assert_eq!(scheduler.next_event().channel(), 1);
    assert_eq!(scheduler.next_event().channel(), 2);
}

#[test]
fn dispatch_metrics_accumulate() {
    let scheduler = scheduler_with_buffer(16);
    let t0 = MonoTime::now();

    scheduler.queue(Event::new(t0.add_nanos(1_000_000), 0, Edge::Rise));
    scheduler.queue(Event::new(t0.add_nanos(2_000_000), 1, Edge::Rise));
    let _ = scheduler.next_event();
    let _ = scheduler.next_event();

    let metrics = scheduler.metrics();
    assert_eq!(metrics.total_dispatched, 2);
    assert_eq!(metrics.sample_count(), 2);
}

#[test]
fn init_consumer_thread_is_best_effort() {
    // Unprivileged test runners are refused SCHED_FIFO; this must not
    // panic or abort either way.
    let scheduler = scheduler_with_buffer(16);
    scheduler.init_consumer_thread();
}
