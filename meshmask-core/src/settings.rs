//! Per-submesh removal settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an asset, such as a mask texture path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Which side of the mask is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RemoveMode {
    #[default]
    RemoveWhite,
    RemoveBlack,
    /// Any value this version does not understand
    #[serde(other)]
    Unknown,
}

impl RemoveMode {
    /// `Some(true)` when white texels are removed, `None` for unknown modes
    pub fn removes_white(self) -> Option<bool> {
        match self {
            RemoveMode::RemoveWhite => Some(true),
            RemoveMode::RemoveBlack => Some(false),
            RemoveMode::Unknown => None,
        }
    }
}

/// Mask configuration for one material slot (submesh)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSetting {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mask: Option<AssetRef>,
    #[serde(default)]
    pub mode: RemoveMode,
}

impl Default for MaterialSetting {
    fn default() -> Self {
        Self {
            enabled: false,
            mask: None,
            mode: RemoveMode::RemoveWhite,
        }
    }
}

impl MaterialSetting {
    /// An enabled setting using `mask`
    pub fn masked(mask: impl Into<AssetRef>, mode: RemoveMode) -> Self {
        Self {
            enabled: true,
            mask: Some(mask.into()),
            mode,
        }
    }

    /// A disabled setting
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Remove-mesh-by-mask component attached to a renderer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoveMeshByMask {
    /// One entry per submesh; submeshes past the end are left untouched
    #[serde(default)]
    pub materials: Vec<MaterialSetting>,
}

impl RemoveMeshByMask {
    pub fn new(materials: Vec<MaterialSetting>) -> Self {
        Self { materials }
    }

    /// Setting for a submesh if one is configured
    pub fn material(&self, submesh_index: usize) -> Option<&MaterialSetting> {
        self.materials.get(submesh_index)
    }

    /// Every distinct mask referenced by an enabled setting
    pub fn referenced_masks(&self) -> Vec<&AssetRef> {
        let mut masks: Vec<&AssetRef> = self
            .materials
            .iter()
            .filter(|m| m.enabled)
            .filter_map(|m| m.mask.as_ref())
            .collect();
        masks.sort();
        masks.dedup();
        masks
    }
}
