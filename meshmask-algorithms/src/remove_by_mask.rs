//! Remove-mesh-by-mask over a whole mesh
//!
//! Walks the submeshes of an (already duplicated) mesh, classifies every
//! configured submesh against its mask and writes the rebuilt index buffer back.
//! Vertex attributes are never touched.

use crate::classify::classify_primitives;
use crate::parallel::{Cancellation, ParallelConfig};
use crate::rebuild::{rebuild_indices, removed_primitive_count};
use meshmask_core::{AssetRef, MaskImage, Mesh, RemoveMeshByMask, RemoveMode, Result};
use std::sync::Arc;
use std::time::Instant;

/// Why a submesh kept its index buffer untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No setting at this submesh index
    NoSetting,
    Disabled,
    NoMask,
    /// Mask could not be resolved or its pixels are not accessible
    UnreadableMask,
    UnknownMode,
    UnsupportedTopology,
}

/// What happened to one submesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmeshStatus {
    Rebuilt { kept: usize, removed: usize },
    Skipped(SkipReason),
}

/// Per-submesh outcome of [`MaskRemover::apply`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub submeshes: Vec<SubmeshStatus>,
}

impl RemovalReport {
    /// Total primitives removed across all submeshes
    pub fn removed_primitives(&self) -> usize {
        self.submeshes
            .iter()
            .map(|s| match s {
                SubmeshStatus::Rebuilt { removed, .. } => *removed,
                SubmeshStatus::Skipped(_) => 0,
            })
            .sum()
    }

    /// Number of submeshes whose index buffer was rewritten
    pub fn rebuilt_submeshes(&self) -> usize {
        self.submeshes
            .iter()
            .filter(|s| matches!(s, SubmeshStatus::Rebuilt { .. }))
            .count()
    }
}

/// Classify and rebuild one submesh of `mesh` in place
pub fn remove_submesh_by_mask<C>(
    mesh: &mut Mesh,
    submesh_index: usize,
    mask: &MaskImage,
    mode: RemoveMode,
    config: &ParallelConfig,
    cancel: &C,
) -> Result<SubmeshStatus>
where
    C: Cancellation + ?Sized,
{
    let Some(remove_white) = mode.removes_white() else {
        log::error!(
            "RemoveMeshByMask: unknown remove mode for submesh {} of '{}'",
            submesh_index,
            mesh.name
        );
        return Ok(SubmeshStatus::Skipped(SkipReason::UnknownMode));
    };

    let submesh = mesh.submesh(submesh_index)?;
    let Some(arity) = submesh.topology.vertices_per_primitive() else {
        return Ok(SubmeshStatus::Skipped(SkipReason::UnsupportedTopology));
    };
    if !mask.is_readable() {
        return Ok(SubmeshStatus::Skipped(SkipReason::UnreadableMask));
    }

    let started = Instant::now();
    let remove = classify_primitives(
        submesh.topology,
        &submesh.indices,
        &mesh.uvs,
        mask,
        remove_white,
        config,
        cancel,
    )?;
    let rebuilt = rebuild_indices(&submesh.indices, arity, &remove)?;

    let removed = removed_primitive_count(&remove);
    let kept = remove.len() - removed;
    log::debug!(
        "submesh {} of '{}': removed {} of {} primitives in {:?}",
        submesh_index,
        mesh.name,
        removed,
        remove.len(),
        started.elapsed()
    );

    mesh.set_indices(submesh_index, rebuilt)?;
    Ok(SubmeshStatus::Rebuilt { kept, removed })
}

/// Applies a [`RemoveMeshByMask`] component to meshes
#[derive(Debug, Clone, Default)]
pub struct MaskRemover {
    pub config: ParallelConfig,
}

impl MaskRemover {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Rewrite the index buffers of `mesh` according to `settings`.
    ///
    /// `resolve_mask` is asked for the mask of every enabled, masked submesh and
    /// may return `None` to skip it. Submeshes without a setting are untouched.
    pub fn apply<F, C>(
        &self,
        mesh: &mut Mesh,
        settings: &RemoveMeshByMask,
        mut resolve_mask: F,
        cancel: &C,
    ) -> Result<RemovalReport>
    where
        F: FnMut(usize, &AssetRef) -> Option<Arc<MaskImage>>,
        C: Cancellation + ?Sized,
    {
        let started = Instant::now();
        let mut report = RemovalReport::default();

        for submesh_index in 0..mesh.submesh_count() {
            let status = match settings.material(submesh_index) {
                None => SubmeshStatus::Skipped(SkipReason::NoSetting),
                Some(setting) if !setting.enabled => SubmeshStatus::Skipped(SkipReason::Disabled),
                Some(setting) => match &setting.mask {
                    None => SubmeshStatus::Skipped(SkipReason::NoMask),
                    Some(asset) => match resolve_mask(submesh_index, asset) {
                        Some(mask) if mask.is_readable() => remove_submesh_by_mask(
                            mesh,
                            submesh_index,
                            &mask,
                            setting.mode,
                            &self.config,
                            cancel,
                        )?,
                        _ => {
                            log::trace!(
                                "submesh {}: mask '{}' unavailable, skipping",
                                submesh_index,
                                asset
                            );
                            SubmeshStatus::Skipped(SkipReason::UnreadableMask)
                        }
                    },
                },
            };
            report.submeshes.push(status);
        }

        log::debug!(
            "'{}': removed {} primitives across {} submeshes in {:?}",
            mesh.name,
            report.removed_primitives(),
            report.rebuilt_submeshes(),
            started.elapsed()
        );
        Ok(report)
    }
}
