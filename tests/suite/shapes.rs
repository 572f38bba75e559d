//! The three loop shapes and the ways to build an engine.

use std::io::Write;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use batchloop_config::BatchloopConfig;
use batchloop_engine::{
    Assignment, CounterRange, EngineConfig, LoopTimeout, OptionsError, ParallelLoop,
    PartitionSize, Relation, bind, cursor_fn, invocation, predicate_cursor,
};

use crate::common::engine;

fn counting<T: 'static>(
    calls: &Arc<AtomicUsize>,
) -> impl Fn(T) -> anyhow::Result<()> + Clone + Send + 'static {
    let calls = Arc::clone(calls);
    move |_: T| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn multiplying_counter_range() {
    let engine = engine(3, 30_000);
    let range = CounterRange::new(1u32, Relation::LessThan, 100).step(Assignment::Multiply, 2);
    let results = engine.for_range(range, invocation(|i: u32| Ok(i))).unwrap();
    assert_eq!(results, vec![1, 2, 4, 8, 16, 32, 64]);
}

#[test]
fn range_with_bound_arguments() {
    let engine = engine(2, 30_000);
    let body = bind(
        |i: i64, (offset, label): &mut (i64, &'static str)| Ok(format!("{label}{}", i + *offset)),
        (100, "n="),
    );
    let results = engine
        .for_range(CounterRange::new(0i64, Relation::NotEqual, 3), body)
        .unwrap();
    assert_eq!(results, vec!["n=100", "n=101", "n=102"]);
}

#[test]
fn while_cursor_drains_a_work_queue() {
    let engine = engine(3, 30_000);
    let queue = Mutex::new((0..11u32).collect::<Vec<_>>());
    let processed = Arc::new(Mutex::new(Vec::new()));
    let body = {
        let processed = Arc::clone(&processed);
        invocation(move |job: u32| {
            processed.lock().unwrap().push(job);
            Ok(())
        })
    };

    let cursor = cursor_fn(|| queue.lock().unwrap().pop());
    engine.while_cursor(cursor, body).unwrap();

    let mut processed = processed.lock().unwrap().clone();
    processed.sort_unstable();
    assert_eq!(processed, (0..11).collect::<Vec<_>>());
    assert!(queue.lock().unwrap().is_empty());
}

#[test]
fn predicate_cursor_state_survives_the_loop() {
    let engine = engine(4, 30_000);
    let mut cursor = predicate_cursor(String::new(), |s: &mut String| {
        s.push('x');
        s.len() <= 5
    });
    engine
        .while_cursor(&mut cursor, invocation(|s: String| {
            assert!(!s.is_empty() && s.len() <= 5);
            Ok(())
        }))
        .unwrap();
    assert_eq!(cursor.state(), "xxxxxx");
}

#[test]
fn empty_inputs_never_call_the_body() {
    let engine = engine(2, 30_000);
    let calls = Arc::new(AtomicUsize::new(0));

    let results = engine
        .for_each(Vec::<u8>::new(), invocation(counting::<u8>(&calls)))
        .unwrap();
    assert!(results.is_empty());

    let results = engine
        .for_range(
            CounterRange::new(5i32, Relation::GreaterThan, 5),
            invocation(counting::<i32>(&calls)),
        )
        .unwrap();
    assert!(results.is_empty());

    engine
        .while_cursor(
            predicate_cursor(0u8, |_: &mut u8| false),
            invocation(counting::<u8>(&calls)),
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_options_are_rejected_up_front() {
    assert_eq!(PartitionSize::new(0).unwrap_err(), OptionsError::ZeroPartition);
    assert!(matches!(
        LoopTimeout::from_millis(LoopTimeout::MAX_MILLIS + 1),
        Err(OptionsError::TimeoutOutOfRange { .. })
    ));
    assert!(LoopTimeout::from_millis(LoopTimeout::MAX_MILLIS).is_ok());
}

#[test]
fn engine_built_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine]\npartition_size = 3\ntimeout_ms = 2500").unwrap();

    let config = BatchloopConfig::load_from(file.path()).unwrap();
    let engine_config = config.engine.unwrap_or_default();
    let engine =
        ParallelLoop::from_config_with_parallelism(&engine_config, NonZeroUsize::new(8).unwrap())
            .unwrap();

    assert_eq!(engine.options().partition_size.get(), 3);
    assert_eq!(engine.options().timeout.get().as_millis(), 2_500);
    let results = engine.for_each(0..5u8, invocation(|x: u8| Ok(x))).unwrap();
    assert_eq!(results, vec![0, 1, 2, 3, 4]);
}

#[test]
fn config_defaults_scale_with_parallelism() {
    let engine = ParallelLoop::from_config_with_parallelism(
        &EngineConfig::default(),
        NonZeroUsize::new(3).unwrap(),
    )
    .unwrap();
    assert_eq!(
        engine.options().partition_size.get(),
        3 * PartitionSize::DEFAULT_MULTIPLIER
    );
    assert_eq!(engine.options().timeout, LoopTimeout::DEFAULT);
}
