//! Mask image types
//!
//! A mask is a plain RGBA8 pixel grid used as a lookup table. Pixels are stored
//! row-major with row 0 first; row 0 is the row addressed by `v` close to 0.

use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};

/// An 8-bit RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const WHITE: Color32 = Color32::new(255, 255, 255, 255);
    pub const BLACK: Color32 = Color32::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Brightest color channel; alpha is ignored
    #[inline]
    pub fn max_channel(self) -> u8 {
        self.r.max(self.g).max(self.b)
    }

    /// A texel counts as white when its brightest channel is above mid-range
    #[inline]
    pub fn is_white(self) -> bool {
        self.max_channel() > 127
    }
}

/// A read-only 2D mask texture
#[derive(Debug, Clone, PartialEq)]
pub struct MaskImage {
    width: usize,
    height: usize,
    pixels: Vec<Color32>,
    readable: bool,
}

impl MaskImage {
    /// Create a readable mask from row-major pixels
    pub fn new(width: usize, height: usize, pixels: Vec<Color32>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::InvalidData(format!(
                "mask of {}x{} needs {} pixels, got {}",
                width,
                height,
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            readable: true,
        })
    }

    /// Create a mask from tightly packed RGBA8 bytes
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let pixels: &[Color32] = bytemuck::try_cast_slice(bytes)
            .map_err(|e| Error::InvalidData(format!("RGBA8 buffer: {}", e)))?;
        Self::new(width, height, pixels.to_vec())
    }

    /// Create a mask filled with a single color
    pub fn filled(width: usize, height: usize, color: Color32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            readable: true,
        }
    }

    /// Create a mask from a row-major grid of booleans (`true` = white)
    pub fn from_rows(rows: &[&[bool]]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::InvalidData("mask rows differ in length".to_string()));
        }
        let pixels = rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|&white| if white { Color32::WHITE } else { Color32::BLACK })
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mark the pixel data as (in)accessible to CPU-side sampling
    pub fn set_readable(&mut self, readable: bool) {
        self.readable = readable;
    }

    /// Whether raw pixel access is available. Zero-sized masks are never readable.
    pub fn is_readable(&self) -> bool {
        self.readable && self.width > 0 && self.height > 0
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> Result<&[Color32]> {
        if !self.is_readable() {
            return Err(Error::UnreadableMask(format!(
                "{}x{} mask has no accessible pixel data",
                self.width, self.height
            )));
        }
        Ok(&self.pixels)
    }

    /// Pixel at `(row, column)`
    pub fn get(&self, row: usize, column: usize) -> Option<Color32> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.pixels.get(row * self.width + column).copied()
    }

    /// Overwrite the pixel at `(row, column)`
    pub fn put(&mut self, row: usize, column: usize, color: Color32) -> Result<()> {
        if row >= self.height || column >= self.width {
            return Err(Error::InvalidData(format!(
                "pixel ({}, {}) outside {}x{} mask",
                row, column, self.width, self.height
            )));
        }
        self.pixels[row * self.width + column] = color;
        Ok(())
    }
}
