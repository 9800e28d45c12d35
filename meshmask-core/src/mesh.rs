//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// Primitive kind stored in a submesh index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshTopology {
    Triangles,
    Quads,
    Lines,
    LineStrip,
    Points,
}

impl MeshTopology {
    /// Number of indices forming one primitive, or `None` when the topology
    /// cannot be split into independent primitives.
    pub fn vertices_per_primitive(self) -> Option<usize> {
        match self {
            MeshTopology::Triangles => Some(3),
            MeshTopology::Quads => Some(4),
            MeshTopology::Lines => Some(2),
            MeshTopology::Points => Some(1),
            MeshTopology::LineStrip => None,
        }
    }
}

/// An independently indexed primitive group sharing one material slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMesh {
    pub topology: MeshTopology,
    pub indices: Vec<u32>,
}

impl SubMesh {
    pub fn new(topology: MeshTopology, indices: Vec<u32>) -> Self {
        Self { topology, indices }
    }

    /// Get the number of whole primitives, `None` for unsupported topologies
    pub fn primitive_count(&self) -> Option<usize> {
        self.topology
            .vertices_per_primitive()
            .map(|arity| self.indices.len() / arity)
    }
}

/// A skinned mesh with shared vertex attributes and several submeshes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Point3f>,
    #[serde(default)]
    pub normals: Option<Vec<Vector3f>>,
    pub uvs: Vec<UV>,
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            normals: None,
            uvs: Vec::new(),
            submeshes: Vec::new(),
        }
    }

    /// Create a mesh from vertices, UVs and submeshes
    pub fn from_parts(
        name: impl Into<String>,
        vertices: Vec<Point3f>,
        uvs: Vec<UV>,
        submeshes: Vec<SubMesh>,
    ) -> Self {
        Self {
            name: name.into(),
            vertices,
            normals: None,
            uvs,
            submeshes,
        }
    }

    /// Deep copy of the mesh under the name `"<name> (<suffix>)"`
    pub fn duplicate(&self, suffix: &str) -> Self {
        let mut copy = self.clone();
        copy.name = format!("{} ({})", self.name, suffix);
        copy
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of submeshes
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.submeshes.iter().all(|s| s.indices.is_empty())
    }

    /// Get a submesh by index
    pub fn submesh(&self, index: usize) -> Result<&SubMesh> {
        self.submeshes.get(index).ok_or_else(|| {
            Error::InvalidData(format!(
                "submesh index {} out of range ({} submeshes)",
                index,
                self.submeshes.len()
            ))
        })
    }

    /// Replace the index buffer of one submesh, keeping its topology
    pub fn set_indices(&mut self, index: usize, indices: Vec<u32>) -> Result<()> {
        let count = self.submeshes.len();
        let submesh = self.submeshes.get_mut(index).ok_or_else(|| {
            Error::InvalidData(format!(
                "submesh index {} out of range ({} submeshes)",
                index, count
            ))
        })?;
        submesh.indices = indices;
        Ok(())
    }

    /// Add a submesh and return its index
    pub fn add_submesh(&mut self, submesh: SubMesh) -> usize {
        self.submeshes.push(submesh);
        self.submeshes.len() - 1
    }

    /// Check attribute lengths and index ranges
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        if self.uvs.len() != vertex_count {
            return Err(Error::InvalidData(format!(
                "mesh '{}' has {} UVs for {} vertices",
                self.name,
                self.uvs.len(),
                vertex_count
            )));
        }
        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(Error::InvalidData(format!(
                    "mesh '{}' has {} normals for {} vertices",
                    self.name,
                    normals.len(),
                    vertex_count
                )));
            }
        }
        for (submesh_index, submesh) in self.submeshes.iter().enumerate() {
            if let Some(&bad) = submesh
                .indices
                .iter()
                .find(|&&i| i as usize >= vertex_count)
            {
                return Err(Error::InvalidData(format!(
                    "submesh {} of '{}' references vertex {} but only {} exist",
                    submesh_index, self.name, bad, vertex_count
                )));
            }
        }
        Ok(())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new("")
    }
}
