//! Partition size bounds in-flight units; batches are barrier-separated.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use batchloop_engine::{LoopOptions, LoopTimeout, PartitionSize, invocation};

use crate::common::{ConcurrencyProbe, engine};

#[test]
fn in_flight_units_never_exceed_partition_size() {
    let engine = engine(4, 30_000);
    let probe = ConcurrencyProbe::default();
    let body = {
        let probe = probe.clone();
        invocation(move |x: usize| {
            let _guard = probe.enter();
            thread::sleep(Duration::from_millis(15));
            Ok(x)
        })
    };

    let results = engine.for_each(0..20usize, body).unwrap();

    assert_eq!(results.len(), 20);
    assert!(probe.peak() <= 4, "peak concurrency {} exceeded 4", probe.peak());
    assert!(probe.peak() >= 2, "units never overlapped (peak {})", probe.peak());
    assert_eq!(probe.current(), 0);
}

#[test]
fn partition_of_one_runs_sequentially() {
    let engine = engine(1, 30_000);
    let probe = ConcurrencyProbe::default();
    let order = Arc::new(Mutex::new(Vec::new()));
    let body = {
        let probe = probe.clone();
        let order = Arc::clone(&order);
        invocation(move |x: u32| {
            let _guard = probe.enter();
            thread::sleep(Duration::from_millis(2));
            order.lock().unwrap().push(x);
            Ok(())
        })
    };

    engine.for_each(0..10u32, body).unwrap();

    assert_eq!(probe.peak(), 1);
    assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
}

#[test]
fn batch_members_start_only_after_previous_batch_finishes() {
    let engine = engine(3, 30_000);
    let log = Arc::new(Mutex::new(Vec::new()));
    let body = {
        let log = Arc::clone(&log);
        invocation(move |x: usize| {
            log.lock().unwrap().push(("start", x / 3));
            thread::sleep(Duration::from_millis(5));
            log.lock().unwrap().push(("end", x / 3));
            Ok(())
        })
    };

    engine.for_each(0..9usize, body).unwrap();

    let log = log.lock().unwrap();
    for (position, (event, batch)) in log.iter().enumerate() {
        if *event == "start" {
            let unfinished_earlier = log[position..]
                .iter()
                .any(|(later_event, later_batch)| *later_event == "end" && later_batch < batch);
            assert!(!unfinished_earlier, "batch {batch} started before an earlier batch ended");
        }
    }
}

#[test]
fn scoped_options_override_partition_size() {
    let engine = engine(8, 30_000);
    let probe = ConcurrencyProbe::default();
    let body = {
        let probe = probe.clone();
        invocation(move |_: u8| {
            let _guard = probe.enter();
            thread::sleep(Duration::from_millis(5));
            Ok(())
        })
    };
    let narrow = LoopOptions::new(
        PartitionSize::new(2).unwrap(),
        LoopTimeout::from_millis(30_000).unwrap(),
    );

    engine.scoped(narrow).for_each(0..10u8, body).unwrap();

    assert!(probe.peak() <= 2);
}
