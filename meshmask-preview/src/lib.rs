//! Preview integration for mask-driven polygon removal
//!
//! Wires the removal engine into a preview pipeline: dependency tracking and
//! invalidation, mask resolution with live edit overrides, and the node that
//! owns the generated proxy mesh.

pub mod context;
pub mod renderer;
pub mod resolver;
pub mod node;
pub mod filter;

pub use context::{ComputeContext, DependencyKey, InvalidationHub, InvalidationToken};
pub use renderer::{MeshRenderer, Renderer, RendererId, SkinnedMeshRenderer};
pub use resolver::{DefaultMaskResolver, LiveMaskEdits, MaskResolver};
pub use node::{RemoveMeshByMaskNode, GENERATED_MESH_SUFFIX};
pub use filter::RemoveMeshByMaskFilter;
