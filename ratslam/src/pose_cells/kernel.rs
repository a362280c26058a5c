//! Weight kernels and lookup tables for the pose cell network.

use std::f64::consts::TAU;

/// Cubic Gaussian weight kernel, normalized to sum 1.
#[derive(Clone, Debug)]
pub struct Kernel {
    dim: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Gaussian of variance `var` centred at cell `dim / 2` on every axis.
    pub fn gaussian(dim: usize, var: f64) -> Self {
        let center = (dim / 2) as f64;
        let mut weights = Vec::with_capacity(dim * dim * dim);
        for a in 0..dim {
            for b in 0..dim {
                for c in 0..dim {
                    let d2 = (a as f64 - center).powi(2)
                        + (b as f64 - center).powi(2)
                        + (c as f64 - center).powi(2);
                    weights.push((-d2 / (2.0 * var * var)).exp());
                }
            }
        }

        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter_mut().for_each(|w| *w /= total);
        }

        Self { dim, weights }
    }

    /// Side length
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Weight at kernel offset (a, b, c)
    #[inline]
    pub fn weight(&self, a: usize, b: usize, c: usize) -> f64 {
        self.weights[(a * self.dim + b) * self.dim + c]
    }

    /// All weights, x-major then y then heading
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Index table for neighbourhoods on a ring.
///
/// `index(base, offset)` is `(base + offset - half) mod extent` for
/// `offset` in `0..2 * half + 1`, read from a table built once.
#[derive(Clone, Debug)]
pub struct WrapTable {
    indices: Vec<usize>,
}

impl WrapTable {
    /// Build the table for a ring of `extent` cells and a neighbourhood
    /// reaching `half` cells either side.
    pub fn new(extent: usize, half: usize) -> Self {
        let indices = (0..extent + 2 * half)
            .map(|i| (i + extent * (half / extent.max(1) + 1) - half) % extent)
            .collect();
        Self { indices }
    }

    /// Wrapped index of `base + offset - half`
    #[inline]
    pub fn index(&self, base: usize, offset: usize) -> usize {
        self.indices[base + offset]
    }
}

/// Sin/cos tables for population-vector decoding along one axis.
#[derive(Clone, Debug)]
pub struct CircularTable {
    extent: usize,
    sin: Vec<f64>,
    cos: Vec<f64>,
}

impl CircularTable {
    /// Tables for a ring of `extent` cells, cell `i` sitting at angle
    /// `2 pi i / extent`.
    pub fn new(extent: usize) -> Self {
        let angle = |i: usize| TAU * i as f64 / extent as f64;
        Self {
            extent,
            sin: (0..extent).map(|i| angle(i).sin()).collect(),
            cos: (0..extent).map(|i| angle(i).cos()).collect(),
        }
    }

    /// Circular mean position of a histogram over the ring, in `[0, extent)`.
    pub fn decode(&self, sums: &[f64]) -> f64 {
        let (s, c) = sums
            .iter()
            .zip(self.sin.iter().zip(&self.cos))
            .fold((0.0, 0.0), |(s, c), (v, (sin, cos))| (s + v * sin, c + v * cos));

        let extent = self.extent as f64;
        let position = (s.atan2(c) * extent / TAU).rem_euclid(extent);
        // rem_euclid can round up to the extent itself
        if position >= extent { 0.0 } else { position }
    }
}
