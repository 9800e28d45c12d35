//! Worker pool configuration for primitive classification
//!
//! Classification runs on a process-wide rayon pool. The pool is created lazily
//! with one thread per logical CPU unless [`init_thread_pool`] was called first.

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use meshmask_core::{Error, Result};

static GLOBAL_THREAD_POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();

/// Default number of primitives per parallel work unit
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Parallel processing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelConfig {
    /// Number of pool threads (None = one per logical CPU). Only read by [`init_thread_pool`].
    pub num_threads: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Primitives classified per work unit
    pub batch_size: usize,
    /// Below this many primitives classification stays on the calling thread
    pub min_parallel_primitives: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name_prefix: "meshmask".to_string(),
            enabled: true,
            batch_size: DEFAULT_BATCH_SIZE,
            min_parallel_primitives: 256,
        }
    }
}

impl ParallelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never leaves the calling thread
    pub fn sequential() -> Self {
        Self::default().with_enabled(false)
    }

    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the number of primitives per work unit (at least 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the sequential cutoff
    pub fn with_min_parallel_primitives(mut self, min: usize) -> Self {
        self.min_parallel_primitives = min;
        self
    }

    /// Whether a workload of `primitive_count` should be split across the pool
    pub fn should_parallelize(&self, primitive_count: usize) -> bool {
        self.enabled && primitive_count >= self.min_parallel_primitives.max(1)
    }

    /// Batch size clamped to a usable value
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Initialize the global thread pool; a no-op if it already exists
pub fn init_thread_pool(config: &ParallelConfig) -> Result<()> {
    if GLOBAL_THREAD_POOL.get().is_some() {
        return Ok(());
    }

    let pool = build_pool(config)?;

    // a concurrent initializer may have won the race
    let _ = GLOBAL_THREAD_POOL.set(Arc::new(pool));
    Ok(())
}

fn build_pool(config: &ParallelConfig) -> Result<ThreadPool> {
    let mut builder = ThreadPoolBuilder::new()
        .num_threads(config.num_threads.unwrap_or_else(num_cpus::get));

    if !config.thread_name_prefix.is_empty() {
        let prefix = config.thread_name_prefix.clone();
        builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
    }

    builder
        .build()
        .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))
}

/// Get the global thread pool, initializing with defaults if needed
pub fn get_thread_pool() -> Result<Arc<ThreadPool>> {
    if let Some(pool) = GLOBAL_THREAD_POOL.get() {
        return Ok(pool.clone());
    }
    init_thread_pool(&ParallelConfig::default())?;
    GLOBAL_THREAD_POOL
        .get()
        .cloned()
        .ok_or_else(|| Error::Algorithm("thread pool unavailable".to_string()))
}

/// Execute a parallel operation on the global thread pool
pub fn execute_parallel<F, R>(op: F) -> Result<R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    Ok(get_thread_pool()?.install(op))
}

/// Cooperative cancellation signal polled between work units
pub trait Cancellation: Sync {
    fn is_cancelled(&self) -> bool;
}

/// Cancellation that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: Cancellation + Send + ?Sized> Cancellation for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
