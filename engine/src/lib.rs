//! Bounded-concurrency loop engine.
//!
//! Runs a body over a counter range, a cursor, or a collection with many
//! invocations in flight at once, while behaving like a sequential loop from
//! the caller's point of view:
//!
//! - input is pulled serially and dispatched in batches of at most
//!   `partition_size` units, with a barrier between batches;
//! - results come back in input order regardless of completion order;
//! - any unit failure fails the whole operation with one [`AggregateFailure`]
//!   and no partial results;
//! - one deadline covers the whole operation. Units that have not started by
//!   then fail without running; running bodies are never interrupted.
//!
//! ```no_run
//! use batchloop_engine::{ParallelLoop, invocation};
//!
//! let engine = ParallelLoop::for_host()?;
//! let squares = engine.for_each(1..=5, invocation(|x: u64| Ok(x * x)))?;
//! assert_eq!(squares, vec![1, 4, 9, 16, 25]);
//! # Ok::<(), batchloop_engine::LoopError>(())
//! ```

mod deadline;
mod dispatch;
mod error;
mod invocation;
mod ledger;
mod parallel;
mod scheduler;
mod shapes;

pub use error::{AggregateFailure, LoopError, UnitFault};
pub use invocation::{Bound, FnInvocation, Invocation, bind, invocation};
pub use parallel::{ParallelLoop, ScopedLoop};
pub use shapes::{Cursor, FnCursor, PredicateCursor, cursor_fn, predicate_cursor};

pub use batchloop_config::EngineConfig;
pub use batchloop_types::{
    Assignment, CounterRange, LoopOptions, LoopTimeout, Operand, OptionsError, PartitionSize,
    Relation, SequenceKey, StepperError,
};
