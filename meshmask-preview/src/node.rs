//! The remove-by-mask preview node
//!
//! A node owns the mesh it generated for a proxy renderer. Each successful
//! [`RemoveMeshByMaskNode::process`] call duplicates the proxy's upstream mesh,
//! rewrites the masked submeshes and swaps the result in. A failed or cancelled
//! call leaves the previously generated mesh in place.
//!
//! When the proxy still shows the node's own output, the upstream mesh it was
//! generated from is used instead, so earlier removals never accumulate.

use crate::context::{ComputeContext, DependencyKey};
use crate::renderer::SkinnedMeshRenderer;
use crate::resolver::MaskResolver;
use meshmask_algorithms::{MaskRemover, ParallelConfig, RemovalReport};
use meshmask_core::{Error, Mesh, RemoveMeshByMask, Result};
use std::sync::Arc;
use std::time::Instant;

/// Name suffix of generated meshes
pub const GENERATED_MESH_SUFFIX: &str = "Mask Generated";

#[derive(Debug, Default)]
pub struct RemoveMeshByMaskNode {
    remover: MaskRemover,
    upstream: Option<Arc<Mesh>>,
    duplicated: Option<Arc<Mesh>>,
    report: RemovalReport,
}

impl RemoveMeshByMaskNode {
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            remover: MaskRemover::new(config),
            upstream: None,
            duplicated: None,
            report: RemovalReport::default(),
        }
    }

    /// Regenerate the proxy mesh from its current mesh and `settings`
    pub fn process<R>(
        &mut self,
        original: &SkinnedMeshRenderer,
        proxy: &mut SkinnedMeshRenderer,
        settings: &RemoveMeshByMask,
        resolver: &R,
        ctx: &ComputeContext,
    ) -> Result<&RemovalReport>
    where
        R: MaskResolver + ?Sized,
    {
        let started = Instant::now();
        ctx.observe(DependencyKey::Mesh(proxy.id));
        let source = self.source_mesh(proxy).ok_or_else(|| {
            Error::InvalidData(format!("proxy of '{}' has no mesh", original.name))
        })?;

        let mut duplicated = source.duplicate(GENERATED_MESH_SUFFIX);
        let report = self.remover.apply(
            &mut duplicated,
            settings,
            |submesh, mask| resolver.resolve(original.id, submesh, mask, ctx),
            ctx,
        )?;

        let duplicated = Arc::new(duplicated);
        proxy.shared_mesh = Some(duplicated.clone());
        if self.duplicated.replace(duplicated).is_some() {
            log::debug!("replaced generated mesh of '{}'", original.name);
        }
        self.upstream = Some(source);
        self.report = report;

        log::debug!("processed '{}' in {:?}", original.name, started.elapsed());
        Ok(&self.report)
    }

    /// Mesh the next run starts from
    fn source_mesh(&self, proxy: &SkinnedMeshRenderer) -> Option<Arc<Mesh>> {
        let current = proxy.shared_mesh.as_ref()?;
        match (&self.duplicated, &self.upstream) {
            (Some(generated), Some(upstream)) if Arc::ptr_eq(current, generated) => {
                Some(upstream.clone())
            }
            _ => Some(current.clone()),
        }
    }

    /// The mesh produced by the last successful [`process`](Self::process)
    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.duplicated.as_ref()
    }

    pub fn report(&self) -> &RemovalReport {
        &self.report
    }

    /// Re-assign the generated mesh to a proxy that was reset by the host
    pub fn on_frame(&self, proxy: &mut SkinnedMeshRenderer) {
        if let Some(mesh) = &self.duplicated {
            proxy.shared_mesh = Some(mesh.clone());
        }
    }

    /// Release the generated mesh. Returns whether there was one.
    pub fn dispose(&mut self) -> bool {
        self.upstream = None;
        match self.duplicated.take() {
            Some(mesh) => {
                log::debug!("released generated mesh '{}'", mesh.name);
                true
            }
            None => false,
        }
    }
}

impl Drop for RemoveMeshByMaskNode {
    fn drop(&mut self) {
        self.dispose();
    }
}
