//! Core traits for meshmask

use crate::error::{Error, Result};
use crate::mask::MaskImage;
use crate::settings::AssetRef;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Provider of committed (static) mask assets
pub trait MaskSource: Send + Sync {
    /// Load the mask identified by `mask`
    fn load_mask(&self, mask: &AssetRef) -> Result<Arc<MaskImage>>;
}

/// Mask source backed by images already held in memory
#[derive(Debug, Default)]
pub struct InMemoryMaskSource {
    masks: RwLock<HashMap<AssetRef, Arc<MaskImage>>>,
}

impl InMemoryMaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a mask, returning the previous one
    pub fn insert(&self, id: impl Into<AssetRef>, mask: MaskImage) -> Option<Arc<MaskImage>> {
        self.masks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.into(), Arc::new(mask))
    }

    pub fn remove(&self, id: &AssetRef) -> Option<Arc<MaskImage>> {
        self.masks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
    }
}

impl MaskSource for InMemoryMaskSource {
    fn load_mask(&self, mask: &AssetRef) -> Result<Arc<MaskImage>> {
        self.masks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(mask)
            .cloned()
            .ok_or_else(|| Error::InvalidData(format!("unknown mask asset '{}'", mask)))
    }
}

impl<T: MaskSource + ?Sized> MaskSource for Arc<T> {
    fn load_mask(&self, mask: &AssetRef) -> Result<Arc<MaskImage>> {
        (**self).load_mask(mask)
    }
}
