//! Index buffer rebuilding from per-primitive decisions

use meshmask_core::{Error, Result};

/// Drop the primitives flagged in `remove` from an index buffer.
///
/// Kept primitives are copied in their original order with their indices
/// unchanged; the vertex buffer they point into is never touched.
pub fn rebuild_indices(
    indices: &[u32],
    vertex_per_primitive: usize,
    remove: &[bool],
) -> Result<Vec<u32>> {
    if vertex_per_primitive == 0 {
        return Err(Error::InvalidData("vertex_per_primitive must be positive".to_string()));
    }
    if indices.len() % vertex_per_primitive != 0
        || indices.len() / vertex_per_primitive != remove.len()
    {
        return Err(Error::InvalidData(format!(
            "{} decisions for {} indices of arity {}",
            remove.len(),
            indices.len(),
            vertex_per_primitive
        )));
    }

    let kept = remove.iter().filter(|&&r| !r).count();
    let mut rebuilt = Vec::with_capacity(kept * vertex_per_primitive);
    for (primitive, &removed) in indices.chunks_exact(vertex_per_primitive).zip(remove) {
        if !removed {
            rebuilt.extend_from_slice(primitive);
        }
    }
    Ok(rebuilt)
}

/// Number of primitives flagged for removal
pub fn removed_primitive_count(remove: &[bool]) -> usize {
    remove.iter().filter(|&&r| r).count()
}
