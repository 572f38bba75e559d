//! Core domain types for batchloop.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod options;
pub mod stepper;

pub use options::{LoopOptions, LoopTimeout, OptionsError, PartitionSize, SequenceKey};
pub use stepper::{
    Assignment, Counter, CounterRange, Operand, OperandKind, Relation, StepperError,
};
