//! Mask resolution: live edits take precedence over committed assets

use crate::context::{ComputeContext, DependencyKey, InvalidationHub};
use crate::renderer::RendererId;
use meshmask_core::{AssetRef, MaskImage, MaskSource};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Chooses the mask image a submesh is sampled against
pub trait MaskResolver: Send + Sync {
    /// Return the mask for `submesh` of `original`, or `None` to leave the
    /// submesh unmasked. Implementations register what they read on `ctx`.
    fn resolve(
        &self,
        original: RendererId,
        submesh: usize,
        configured: &AssetRef,
        ctx: &ComputeContext,
    ) -> Option<Arc<MaskImage>>;
}

/// In-progress mask edits keyed by renderer and submesh.
///
/// Every change notifies the hub so previews depending on the slot recompute.
#[derive(Debug)]
pub struct LiveMaskEdits {
    hub: Arc<InvalidationHub>,
    edits: RwLock<HashMap<(RendererId, usize), Arc<MaskImage>>>,
}

impl LiveMaskEdits {
    pub fn new(hub: Arc<InvalidationHub>) -> Self {
        Self {
            hub,
            edits: RwLock::new(HashMap::new()),
        }
    }

    /// Start or update the live edit of one submesh
    pub fn update(&self, renderer: RendererId, submesh: usize, mask: MaskImage) {
        self.edits
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((renderer, submesh), Arc::new(mask));
        self.hub.notify(&DependencyKey::LiveMask { renderer, submesh });
    }

    /// End the live edit of one submesh, returning the last edited image
    pub fn finish(&self, renderer: RendererId, submesh: usize) -> Option<Arc<MaskImage>> {
        let finished = self
            .edits
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&(renderer, submesh));
        if finished.is_some() {
            self.hub.notify(&DependencyKey::LiveMask { renderer, submesh });
        }
        finished
    }

    pub fn get(&self, renderer: RendererId, submesh: usize) -> Option<Arc<MaskImage>> {
        self.edits
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(renderer, submesh))
            .cloned()
    }

    pub fn is_editing(&self, renderer: RendererId, submesh: usize) -> bool {
        self.get(renderer, submesh).is_some()
    }
}

/// Resolver backed by a [`MaskSource`] and an optional live edit registry
pub struct DefaultMaskResolver<S> {
    source: S,
    live_edits: Option<Arc<LiveMaskEdits>>,
}

impl<S: MaskSource> DefaultMaskResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            live_edits: None,
        }
    }

    pub fn with_live_edits(mut self, live_edits: Arc<LiveMaskEdits>) -> Self {
        self.live_edits = Some(live_edits);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: MaskSource> MaskResolver for DefaultMaskResolver<S> {
    fn resolve(
        &self,
        original: RendererId,
        submesh: usize,
        configured: &AssetRef,
        ctx: &ComputeContext,
    ) -> Option<Arc<MaskImage>> {
        ctx.observe(DependencyKey::Mask(configured.clone()));
        let committed = match self.source.load_mask(configured) {
            Ok(mask) if mask.is_readable() => mask,
            Ok(_) => {
                log::trace!("mask '{}' is not readable", configured);
                return None;
            }
            Err(e) => {
                log::trace!("mask '{}' unavailable: {}", configured, e);
                return None;
            }
        };

        let Some(live_edits) = &self.live_edits else {
            return Some(committed);
        };
        ctx.observe(DependencyKey::LiveMask { renderer: original, submesh });
        Some(live_edits.get(original, submesh).unwrap_or(committed))
    }
}
