//! Per-primitive mask classification
//!
//! Every vertex of a primitive samples the mask at its UV. A primitive is marked
//! for removal only when all of its vertices agree with the removal side; any
//! disagreement keeps the primitive, so mask edges never punch holes through
//! partially covered faces.

use crate::parallel::{execute_parallel, Cancellation, ParallelConfig};
use meshmask_core::{Color32, Error, MaskImage, MeshTopology, Result, UV};
use rayon::prelude::*;

/// Map `x` into `[0, 1)`, tiling values outside the unit range
#[inline]
pub fn wrap_unit(x: f32) -> f32 {
    ((x % 1.0) + 1.0) % 1.0
}

/// Nearest-texel lookup into a readable mask
#[derive(Debug, Clone, Copy)]
pub struct MaskSampler<'a> {
    pixels: &'a [Color32],
    width: usize,
    height: usize,
}

impl<'a> MaskSampler<'a> {
    /// Borrow the pixels of `mask`; fails if the mask is unreadable
    pub fn new(mask: &'a MaskImage) -> Result<Self> {
        let pixels = mask.pixels()?;
        Ok(Self {
            pixels,
            width: mask.width(),
            height: mask.height(),
        })
    }

    /// Texel `(row, column)` addressed by a UV.
    ///
    /// The row comes from `v` and the column from `u`; rows are counted from the
    /// start of the pixel buffer.
    #[inline]
    pub fn texel_coords(&self, u: f32, v: f32) -> (usize, usize) {
        // `as usize` saturates, so NaN lands on 0 and the clamp covers rounding up to 1.0
        let row = ((wrap_unit(v) * self.height as f32).floor() as usize).min(self.height - 1);
        let column = ((wrap_unit(u) * self.width as f32).floor() as usize).min(self.width - 1);
        (row, column)
    }

    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Color32 {
        let (row, column) = self.texel_coords(u, v);
        self.pixels[row * self.width + column]
    }

    #[inline]
    pub fn is_white(&self, u: f32, v: f32) -> bool {
        self.sample(u, v).is_white()
    }

    /// Unanimous vertex vote for one primitive
    #[inline]
    pub fn should_remove(&self, primitive: &[u32], uvs: &[UV], remove_white: bool) -> bool {
        primitive.iter().all(|&index| {
            let [u, v] = uvs[index as usize];
            self.is_white(u, v) == remove_white
        })
    }
}

/// Decide, for each primitive of an index buffer, whether it is removed.
///
/// Returns one flag per primitive (`true` = remove). Fails with
/// [`Error::Cancelled`] if `cancel` fires before all work units finished; no
/// partial result is returned in that case.
pub fn classify_primitives<C>(
    topology: MeshTopology,
    indices: &[u32],
    uvs: &[UV],
    mask: &MaskImage,
    remove_white: bool,
    config: &ParallelConfig,
    cancel: &C,
) -> Result<Vec<bool>>
where
    C: Cancellation + ?Sized,
{
    let arity = topology.vertices_per_primitive().ok_or_else(|| {
        Error::Unsupported(format!("cannot classify primitives of {:?}", topology))
    })?;

    if indices.len() % arity != 0 {
        return Err(Error::InvalidData(format!(
            "{} indices do not form whole {:?} primitives",
            indices.len(),
            topology
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= uvs.len()) {
        return Err(Error::InvalidData(format!(
            "index {} has no UV ({} UVs)",
            bad,
            uvs.len()
        )));
    }

    let sampler = MaskSampler::new(mask)?;
    let primitive_count = indices.len() / arity;
    let batch_size = config.effective_batch_size();
    let mut decisions = vec![false; primitive_count];

    let classify_batch = |(batch, slots): (usize, &mut [bool])| -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let first = batch * batch_size;
        for (offset, slot) in slots.iter_mut().enumerate() {
            let start = (first + offset) * arity;
            *slot = sampler.should_remove(&indices[start..start + arity], uvs, remove_white);
        }
        Ok(())
    };

    if config.should_parallelize(primitive_count) {
        execute_parallel(|| {
            decisions
                .par_chunks_mut(batch_size)
                .enumerate()
                .try_for_each(classify_batch)
        })??;
    } else {
        decisions
            .chunks_mut(batch_size)
            .enumerate()
            .try_for_each(classify_batch)?;
    }

    Ok(decisions)
}
