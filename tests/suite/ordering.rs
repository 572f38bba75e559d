//! Results come back in logical input order, whatever order units finish in.

use std::thread;
use std::time::Duration;

use batchloop_engine::{CounterRange, invocation};

use crate::common::engine;

#[test]
fn later_inputs_finishing_first_keep_input_order() {
    let engine = engine(8, 30_000);
    // Item i sleeps (8 - i) * 5ms, so completion order is the reverse of input order.
    let body = invocation(|i: u64| {
        thread::sleep(Duration::from_millis((8 - i) * 5));
        Ok(i * 100)
    });
    let results = engine.for_each(0..8u64, body).unwrap();
    assert_eq!(results, (0..8u64).map(|i| i * 100).collect::<Vec<_>>());
}

#[test]
fn squares_across_partitions_of_two() {
    let engine = engine(2, 30_000);
    // Within the last batch {4, 5}, unit 5 finishes first.
    let body = invocation(|x: u64| {
        if x == 4 {
            thread::sleep(Duration::from_millis(40));
        }
        Ok(x * x)
    });
    let results = engine.for_each([1u64, 2, 3, 4, 5], body).unwrap();
    assert_eq!(results, vec![1, 4, 9, 16, 25]);
}

#[test]
fn counter_values_keep_counter_order() {
    let engine = engine(3, 30_000);
    let body = invocation(|i: i32| {
        thread::sleep(Duration::from_millis(u64::from((i % 3).unsigned_abs()) * 3));
        Ok(i.to_string())
    });
    let results = engine.for_range(CounterRange::up_to(-4, 5), body).unwrap();
    let expected: Vec<String> = (-4..5).map(|i: i32| i.to_string()).collect();
    assert_eq!(results, expected);
}

#[test]
fn replaying_a_pure_body_is_deterministic() {
    let engine = engine(4, 30_000);
    let body = invocation(|x: u32| {
        thread::sleep(Duration::from_millis(u64::from(x % 4)));
        Ok(x.wrapping_mul(2_654_435_761))
    });

    let first = engine.for_each(0..40u32, body.clone()).unwrap();
    let second = engine.for_each(0..40u32, body).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 40);
}
