//! Mask-driven polygon removal
//!
//! This crate provides the algorithms behind remove-mesh-by-mask:
//! - Per-primitive classification against a mask texture
//! - Index buffer rebuilding from the resulting decisions
//! - Whole-mesh application of per-submesh settings

pub mod parallel;
pub mod classify;
pub mod rebuild;
pub mod remove_by_mask;

pub use parallel::{
    execute_parallel, get_thread_pool, init_thread_pool, Cancellation, NeverCancel, ParallelConfig,
    DEFAULT_BATCH_SIZE,
};
pub use classify::*;
pub use rebuild::*;
pub use remove_by_mask::*;
