//! Renderer handles exchanged with the host

use meshmask_core::Mesh;
use std::fmt;
use std::sync::Arc;

/// Stable identity of an authored renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub u64);

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer#{}", self.0)
    }
}

/// A renderer drawing a skinned mesh
#[derive(Debug, Clone)]
pub struct SkinnedMeshRenderer {
    pub id: RendererId,
    pub name: String,
    pub shared_mesh: Option<Arc<Mesh>>,
}

impl SkinnedMeshRenderer {
    pub fn new(id: RendererId, name: impl Into<String>, mesh: Option<Arc<Mesh>>) -> Self {
        Self {
            id,
            name: name.into(),
            shared_mesh: mesh,
        }
    }
}

/// A renderer drawing a static mesh; remove-by-mask does not apply to it
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub id: RendererId,
    pub name: String,
}

/// Any renderer the host may hand over
#[derive(Debug, Clone)]
pub enum Renderer {
    Skinned(SkinnedMeshRenderer),
    Static(MeshRenderer),
}

impl Renderer {
    pub fn id(&self) -> RendererId {
        match self {
            Renderer::Skinned(r) => r.id,
            Renderer::Static(r) => r.id,
        }
    }

    pub fn as_skinned(&self) -> Option<&SkinnedMeshRenderer> {
        match self {
            Renderer::Skinned(r) => Some(r),
            Renderer::Static(_) => None,
        }
    }

    pub fn as_skinned_mut(&mut self) -> Option<&mut SkinnedMeshRenderer> {
        match self {
            Renderer::Skinned(r) => Some(r),
            Renderer::Static(_) => None,
        }
    }
}

impl From<SkinnedMeshRenderer> for Renderer {
    fn from(renderer: SkinnedMeshRenderer) -> Self {
        Renderer::Skinned(renderer)
    }
}

impl From<MeshRenderer> for Renderer {
    fn from(renderer: MeshRenderer) -> Self {
        Renderer::Static(renderer)
    }
}
