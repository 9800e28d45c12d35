//! Core data structures and traits for meshmask
//!
//! This crate provides the fundamental types shared by the mask-driven polygon
//! removal pipeline: submeshed meshes, mask images, per-submesh removal settings,
//! the mask source trait and the common error type.

pub mod point;
pub mod mesh;
pub mod mask;
pub mod settings;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use mask::*;
pub use settings::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
