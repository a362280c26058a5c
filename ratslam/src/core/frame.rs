//! Grayscale camera frames.

use crate::error::{Result, SlamError};

/// A grayscale intensity image, stored row-major.
///
/// Frames are produced by an external camera or video source; the core
/// only ever reads them.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<f64>,
}

impl Frame {
    /// Create a frame from row-major intensities.
    ///
    /// Fails if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<f64>) -> Result<Self> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(SlamError::FrameBuffer {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a frame from 8-bit grayscale pixels.
    pub fn from_u8(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        Self::new(width, height, pixels.iter().map(|&p| p as f64).collect())
    }

    /// Create a frame in which every row is `row`.
    ///
    /// Convenient for synthetic panoramas where only the column profile
    /// matters.
    pub fn from_column_profile(row: &[f64], height: usize) -> Self {
        let mut pixels = Vec::with_capacity(row.len() * height);
        for _ in 0..height {
            pixels.extend_from_slice(row);
        }
        Self {
            width: row.len(),
            height,
            pixels,
        }
    }

    /// Image width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel intensities
    #[inline]
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    /// Pixel at (row, column)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.pixels[row * self.width + col])
        } else {
            None
        }
    }

    /// Sum of every column, left to right.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.width];
        if self.width == 0 {
            return sums;
        }
        for row in self.pixels.chunks_exact(self.width) {
            for (sum, &p) in sums.iter_mut().zip(row) {
                *sum += p;
            }
        }
        sums
    }
}
