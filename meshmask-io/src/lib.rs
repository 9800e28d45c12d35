//! I/O operations for meshmask
//!
//! Decodes mask textures through the `image` crate and reads/writes meshes and
//! remove-by-mask settings as JSON.

pub mod error;
pub mod mask;
pub mod json;

pub use error::*;
pub use mask::{load_mask_image, save_mask_image, FileMaskSource};
pub use json::*;
