//! Remove-by-mask filter: decides whether a proxy pair gets a node

use crate::context::{ComputeContext, DependencyKey};
use crate::node::RemoveMeshByMaskNode;
use crate::renderer::Renderer;
use crate::resolver::MaskResolver;
use meshmask_algorithms::ParallelConfig;
use meshmask_core::{RemoveMeshByMask, Result};

#[derive(Debug, Clone, Default)]
pub struct RemoveMeshByMaskFilter {
    pub config: ParallelConfig,
}

impl RemoveMeshByMaskFilter {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Build and run a node for the given `(original, proxy)` pairs.
    ///
    /// Returns `Ok(None)` unless there is exactly one pair of skinned
    /// renderers whose proxy carries a mesh.
    pub fn instantiate<R>(
        &self,
        proxy_pairs: &mut [(Renderer, Renderer)],
        component: &RemoveMeshByMask,
        resolver: &R,
        ctx: &ComputeContext,
    ) -> Result<Option<RemoveMeshByMaskNode>>
    where
        R: MaskResolver + ?Sized,
    {
        let pair_count = proxy_pairs.len();
        let [(original, proxy)] = proxy_pairs else {
            log::trace!("remove-by-mask expects one renderer pair, got {}", pair_count);
            return Ok(None);
        };
        let (Some(original), Some(proxy)) = (original.as_skinned(), proxy.as_skinned_mut()) else {
            return Ok(None);
        };
        if proxy.shared_mesh.is_none() {
            return Ok(None);
        }

        ctx.observe(DependencyKey::Settings(original.id));
        let mut node = RemoveMeshByMaskNode::new(self.config.clone());
        node.process(original, proxy, component, resolver, ctx)?;
        Ok(Some(node))
    }
}
