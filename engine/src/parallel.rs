//! The engine handle callers hold: options plus the runtime units run on.

use std::num::NonZeroUsize;

use tokio::runtime::{Builder, Runtime};

use batchloop_config::{BatchloopConfig, EngineConfig, host_parallelism};
use batchloop_types::LoopOptions;

use crate::error::LoopError;
use crate::invocation::Invocation;
use crate::scheduler;

/// Lower bound on the blocking pool, matching tokio's own default.
const MIN_BLOCKING_THREADS: usize = 512;

/// Bounded-concurrency loop engine.
///
/// Every façade call blocks the calling thread until the operation finishes.
/// Units run on a dedicated blocking pool owned by this value. Calling a
/// façade from inside another tokio runtime panics, as does dropping a
/// `ParallelLoop` there.
#[derive(Debug)]
pub struct ParallelLoop {
    runtime: Runtime,
    options: LoopOptions,
}

impl ParallelLoop {
    pub fn new(options: LoopOptions) -> Result<Self, LoopError> {
        let runtime = Builder::new_current_thread()
            .max_blocking_threads(options.partition_size.get().max(MIN_BLOCKING_THREADS))
            .thread_name("batchloop-unit")
            .build()
            .map_err(LoopError::Runtime)?;
        tracing::debug!(
            partition_size = options.partition_size.get(),
            timeout_ms = options.timeout.get().as_millis(),
            "Parallel loop engine ready"
        );
        Ok(Self { runtime, options })
    }

    /// Defaults derived from this host's parallelism.
    pub fn for_host() -> Result<Self, LoopError> {
        Self::new(LoopOptions::for_hardware(host_parallelism()))
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, LoopError> {
        Self::from_config_with_parallelism(config, host_parallelism())
    }

    pub fn from_config_with_parallelism(
        config: &EngineConfig,
        parallelism: NonZeroUsize,
    ) -> Result<Self, LoopError> {
        Self::new(config.resolve(parallelism)?)
    }

    /// Config file (if any) plus `BATCHLOOP_*` environment overrides.
    ///
    /// An unreadable or malformed config file is logged and treated as absent.
    pub fn from_environment() -> Result<Self, LoopError> {
        let file = match BatchloopConfig::load() {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(path = %err.path().display(), "Ignoring config file: {err}");
                BatchloopConfig::default()
            }
        };
        Self::from_config(&file.engine_with_env())
    }

    #[must_use]
    pub fn options(&self) -> LoopOptions {
        self.options
    }

    /// A view running on the same pool with different options.
    #[must_use]
    pub fn scoped(&self, options: LoopOptions) -> ScopedLoop<'_> {
        ScopedLoop {
            runtime: &self.runtime,
            options,
        }
    }

    pub(crate) fn default_scope(&self) -> ScopedLoop<'_> {
        self.scoped(self.options)
    }
}

/// [`ParallelLoop`] façades bound to a specific set of options.
#[derive(Debug, Clone, Copy)]
pub struct ScopedLoop<'a> {
    runtime: &'a Runtime,
    options: LoopOptions,
}

impl ScopedLoop<'_> {
    #[must_use]
    pub fn options(&self) -> LoopOptions {
        self.options
    }

    pub(crate) fn run<S, I>(&self, source: S, invocation: I) -> Result<Vec<I::Output>, LoopError>
    where
        S: Iterator,
        S::Item: Send + 'static,
        I: Invocation<S::Item>,
    {
        self.runtime
            .block_on(scheduler::schedule(self.options, source, invocation))
            .map_err(LoopError::from)
    }
}
