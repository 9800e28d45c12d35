//! Mask image loading
//!
//! Image files store their top row first while texture space puts `v = 0` at
//! the bottom, so decoded images are flipped vertically: row 0 of the resulting
//! [`MaskImage`] is the bottom row of the file.

use crate::error::IoError;
use image::{imageops, RgbaImage};
use meshmask_core::{AssetRef, Error, MaskImage, MaskSource, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

fn image_error(path: &Path, err: image::ImageError) -> Error {
    match err {
        image::ImageError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
            IoError::FileNotFound { path: path.display().to_string() }.into()
        }
        image::ImageError::IoError(e) => Error::Io(e),
        other => IoError::InvalidFormat {
            format: format!("{}: {}", path.display(), other),
        }
        .into(),
    }
}

/// Decode any format supported by `image` into a readable mask
pub fn load_mask_image<P: AsRef<Path>>(path: P) -> Result<MaskImage> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|e| image_error(path, e))?;
    let rgba = imageops::flip_vertical(&decoded.to_rgba8());
    let (width, height) = rgba.dimensions();
    MaskImage::from_rgba8(width as usize, height as usize, &rgba.into_raw())
}

/// Encode a mask; the format follows the file extension
pub fn save_mask_image<P: AsRef<Path>>(mask: &MaskImage, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes: Vec<u8> = bytemuck::cast_slice(mask.pixels()?).to_vec();
    let (width, height) = (mask.width() as u32, mask.height() as u32);
    let buffer = RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
        Error::from(IoError::WriteError {
            message: format!("pixel buffer does not match {}x{}", width, height),
        })
    })?;
    imageops::flip_vertical(&buffer)
        .save(path)
        .map_err(|e| image_error(path, e))
}

/// Mask source reading image files relative to a base directory.
///
/// Decoded masks are cached by asset reference until [`FileMaskSource::invalidate`]
/// is called for them.
#[derive(Debug)]
pub struct FileMaskSource {
    base_dir: PathBuf,
    cache: RwLock<HashMap<AssetRef, Arc<MaskImage>>>,
}

impl FileMaskSource {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Path an asset reference resolves to
    pub fn path_of(&self, mask: &AssetRef) -> PathBuf {
        let path = Path::new(mask.as_str());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Forget the cached decode of `mask` so the next load reads the file again
    pub fn invalidate(&self, mask: &AssetRef) {
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(mask);
    }
}

impl MaskSource for FileMaskSource {
    fn load_mask(&self, mask: &AssetRef) -> Result<Arc<MaskImage>> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(mask)
        {
            return Ok(cached.clone());
        }

        let path = self.path_of(mask);
        log::debug!("loading mask {}", path.display());
        let image = Arc::new(load_mask_image(&path)?);
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(mask.clone(), image.clone());
        Ok(image)
    }
}
