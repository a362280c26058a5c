//! Three-dimensional continuous attractor network over (x, y, heading).

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::core::{EPSILON, PoseEstimate};
use crate::error::Result;
use crate::view_cells::ViewCell;

use super::PoseCellConfig;
use super::kernel::{CircularTable, Kernel, WrapTable};

/// Integer cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellIndex {
    /// Planar x
    pub x: usize,
    /// Planar y
    pub y: usize,
    /// Heading
    pub th: usize,
}

impl CellIndex {
    /// Create new cell coordinates
    pub fn new(x: usize, y: usize, th: usize) -> Self {
        Self { x, y, th }
    }
}

/// Where and how strongly a recognised place feeds the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InjectionSite {
    /// Pose-cell coordinates stored with the view cell
    pub pose: PoseEstimate,
    /// Decay accumulator of the view cell
    pub decay: f64,
}

impl From<&ViewCell> for InjectionSite {
    fn from(cell: &ViewCell) -> Self {
        Self {
            pose: cell.pose(),
            decay: cell.decay(),
        }
    }
}

/// Result of one network iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseCellUpdate {
    /// Decoded pose after path integration
    pub estimate: PoseEstimate,
    /// Activity collapsed and was reseeded at the previous peak
    pub reseeded: bool,
}

/// Pose cell network.
///
/// Activity is stored densely, x-major then y then heading, and sums to 1
/// after every [`update`](Self::update).
#[derive(Clone, Debug)]
pub struct PoseCellNetwork {
    config: PoseCellConfig,
    cells: Vec<f64>,

    // Scratch buffers reused across updates
    excited: Vec<f64>,
    inhibited: Vec<f64>,
    slice: Vec<f64>,
    rotated: Vec<f64>,

    excite: Kernel,
    inhibit: Kernel,
    excite_xy: WrapTable,
    excite_th: WrapTable,
    inhibit_xy: WrapTable,
    inhibit_th: WrapTable,
    decode_xy: WrapTable,
    decode_th: WrapTable,
    circular_xy: CircularTable,
    circular_th: CircularTable,

    peak: CellIndex,
    estimate: PoseEstimate,
}

impl PoseCellNetwork {
    /// Validate the configuration and create a network with unit activity
    /// at the grid centre.
    pub fn new(config: PoseCellConfig) -> Result<Self> {
        config.validate()?;

        let n = config.dim_xy;
        let t = config.dim_th;
        let size = config.cell_count();
        let r = config.decode_radius;

        let mut network = Self {
            cells: vec![0.0; size],
            excited: vec![0.0; size],
            inhibited: vec![0.0; size],
            slice: vec![0.0; n * n],
            rotated: vec![0.0; n * n],
            excite: Kernel::gaussian(config.excite_dim, config.excite_var),
            inhibit: Kernel::gaussian(config.inhibit_dim, config.inhibit_var),
            excite_xy: WrapTable::new(n, config.excite_dim / 2),
            excite_th: WrapTable::new(t, config.excite_dim / 2),
            inhibit_xy: WrapTable::new(n, config.inhibit_dim / 2),
            inhibit_th: WrapTable::new(t, config.inhibit_dim / 2),
            decode_xy: WrapTable::new(n, r),
            decode_th: WrapTable::new(t, r),
            circular_xy: CircularTable::new(n),
            circular_th: CircularTable::new(t),
            peak: CellIndex::new(0, 0, 0),
            estimate: PoseEstimate::default(),
            config,
        };
        network.reset();
        Ok(network)
    }

    /// Return to unit activity at the grid centre.
    pub fn reset(&mut self) {
        let center = CellIndex::new(
            self.config.dim_xy / 2,
            self.config.dim_xy / 2,
            self.config.dim_th / 2,
        );
        self.seed(center);
        self.estimate = PoseEstimate::new(center.x as f64, center.y as f64, center.th as f64);
    }

    /// Run one iteration: inject, excite, inhibit, normalize, then path
    /// integrate translation and rotation, and decode.
    ///
    /// `vtrans` is scaled by the configured translation scaling and clamped
    /// to at most one cell per tick. Non-finite motion is ignored.
    pub fn update(&mut self, injection: Option<InjectionSite>, vtrans: f64, vrot: f64) -> PoseCellUpdate {
        if let Some(site) = injection {
            self.inject(&site);
        }

        self.attractor_dynamics();
        let reseeded = !self.normalize();

        let v = vtrans * self.config.vtrans_scaling;
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        if v > 0.0 {
            self.translate(v);
        }

        if vrot.is_finite() && vrot != 0.0 {
            self.rotate(vrot);
        }

        self.estimate = self.decode();
        log::trace!(
            "Pose cells: peak ({}, {}, {}) estimate ({:.2}, {:.2}, {:.2})",
            self.peak.x,
            self.peak.y,
            self.peak.th,
            self.estimate.x,
            self.estimate.y,
            self.estimate.th
        );

        PoseCellUpdate {
            estimate: self.estimate,
            reseeded,
        }
    }

    /// Last decoded pose
    #[inline]
    pub fn estimate(&self) -> PoseEstimate {
        self.estimate
    }

    /// Most active cell found by the last decode
    #[inline]
    pub fn peak(&self) -> CellIndex {
        self.peak
    }

    /// Raw activity, x-major then y then heading
    #[inline]
    pub fn activity(&self) -> &[f64] {
        &self.cells
    }

    /// Activity of one cell
    #[inline]
    pub fn value(&self, x: usize, y: usize, th: usize) -> f64 {
        self.cells[self.offset(x, y, th)]
    }

    /// Sum of all activity
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Get the configuration
    pub fn config(&self) -> &PoseCellConfig {
        &self.config
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, th: usize) -> usize {
        (x * self.config.dim_xy + y) * self.config.dim_th + th
    }

    fn seed(&mut self, at: CellIndex) {
        self.cells.fill(0.0);
        let index = self.offset(at.x, at.y, at.th);
        self.cells[index] = 1.0;
        self.peak = at;
    }

    fn inject(&mut self, site: &InjectionSite) {
        let energy = self.config.inject_energy * (1.0 / 30.0) * (30.0 - (1.2 * site.decay).exp());
        if !energy.is_finite() || energy <= 0.0 {
            return;
        }

        let cell = |coord: f64, extent: usize| {
            if coord.is_finite() {
                (coord.floor().max(0.0) as usize).min(extent - 1)
            } else {
                0
            }
        };
        let x = cell(site.pose.x, self.config.dim_xy);
        let y = cell(site.pose.y, self.config.dim_xy);
        let th = cell(site.pose.th, self.config.dim_th);

        let index = self.offset(x, y, th);
        self.cells[index] += energy;
        log::trace!("Injected {:.4} at ({}, {}, {})", energy, x, y, th);
    }

    /// Local excitation, local inhibition and global inhibition.
    fn attractor_dynamics(&mut self) {
        let n = self.config.dim_xy;
        let t = self.config.dim_th;

        spread(
            &self.cells,
            &mut self.excited,
            &self.excite,
            &self.excite_xy,
            &self.excite_th,
            n,
            t,
        );
        spread(
            &self.excited,
            &mut self.inhibited,
            &self.inhibit,
            &self.inhibit_xy,
            &self.inhibit_th,
            n,
            t,
        );

        let global = self.config.global_inhibition;
        for ((cell, &e), &i) in self.cells.iter_mut().zip(&self.excited).zip(&self.inhibited) {
            let v = e - i;
            *cell = if v < global { 0.0 } else { v - global };
        }
    }

    /// Scale activity to sum 1. Returns false if it had collapsed and was
    /// reseeded.
    fn normalize(&mut self) -> bool {
        let total = self.total();
        if total.is_finite() && total > EPSILON {
            self.cells.iter_mut().for_each(|v| *v /= total);
            return true;
        }

        log::warn!(
            "Pose cell activity collapsed (total {:e}), reseeding at ({}, {}, {})",
            total,
            self.peak.x,
            self.peak.y,
            self.peak.th
        );
        self.seed(self.peak);
        false
    }

    /// Shift every heading slice `v` cells along its own direction.
    fn translate(&mut self, v: f64) {
        let n = self.config.dim_xy;
        let t = self.config.dim_th;
        let cell_size = self.config.heading_cell_size();

        for k in 0..t {
            for x in 0..n {
                for y in 0..n {
                    self.slice[x * n + y] = self.cells[(x * n + y) * t + k];
                }
            }

            if (4 * k) % t == 0 {
                shift_cardinal(&self.slice, &mut self.rotated, n, (4 * k) / t, v);
            } else {
                let quarter = (4 * k) / t;
                let residual = k as f64 * cell_size - quarter as f64 * FRAC_PI_2;
                shift_oblique(
                    &mut self.slice,
                    &mut self.rotated,
                    n,
                    quarter,
                    residual,
                    v,
                );
            }

            for x in 0..n {
                for y in 0..n {
                    self.cells[(x * n + y) * t + k] = self.rotated[x * n + y];
                }
            }
        }
    }

    /// Shift activity along the heading axis by `vrot` radians.
    fn rotate(&mut self, vrot: f64) {
        let t = self.config.dim_th as isize;
        // Whole turns are dropped so the shifts stay within the heading axis
        let cells_moved = (vrot.abs() % TAU) / self.config.heading_cell_size();
        let mut weight = cells_moved.fract();
        if weight == 0.0 {
            weight = 1.0;
        }
        let sign = vrot.signum() as isize;
        let shift_floor = sign * cells_moved.floor() as isize;
        let shift_ceil = sign * cells_moved.ceil() as isize;

        let columns = self.config.dim_xy * self.config.dim_xy;
        let t_usize = self.config.dim_th;
        for column in 0..columns {
            let base = column * t_usize;
            for th in 0..t_usize {
                let from_floor = (th as isize - shift_floor).rem_euclid(t) as usize;
                let from_ceil = (th as isize - shift_ceil).rem_euclid(t) as usize;
                self.excited[base + th] = self.cells[base + from_floor] * (1.0 - weight)
                    + self.cells[base + from_ceil] * weight;
            }
        }
        std::mem::swap(&mut self.cells, &mut self.excited);
    }

    /// Population-vector decode around the most active cell.
    fn decode(&mut self) -> PoseEstimate {
        let (best, _) = self
            .cells
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv { (i, v) } else { (bi, bv) }
            });

        let n = self.config.dim_xy;
        let t = self.config.dim_th;
        let peak = CellIndex::new(best / (n * t), (best / t) % n, best % t);
        self.peak = peak;

        let span = 2 * self.config.decode_radius + 1;
        let mut x_sums = vec![0.0; n];
        let mut y_sums = vec![0.0; n];
        let mut th_sums = vec![0.0; t];
        for a in 0..span {
            let x = self.decode_xy.index(peak.x, a);
            for b in 0..span {
                let y = self.decode_xy.index(peak.y, b);
                for c in 0..span {
                    let th = self.decode_th.index(peak.th, c);
                    let v = self.cells[(x * n + y) * t + th];
                    x_sums[x] += v;
                    y_sums[y] += v;
                    th_sums[th] += v;
                }
            }
        }

        PoseEstimate::new(
            self.circular_xy.decode(&x_sums),
            self.circular_xy.decode(&y_sums),
            self.circular_th.decode(&th_sums),
        )
    }
}

/// Spread every nonzero cell of `src` over its kernel neighbourhood.
fn spread(
    src: &[f64],
    dst: &mut [f64],
    kernel: &Kernel,
    wrap_xy: &WrapTable,
    wrap_th: &WrapTable,
    n: usize,
    t: usize,
) {
    dst.fill(0.0);
    let dim = kernel.dim();

    for (index, &value) in src.iter().enumerate() {
        if value == 0.0 {
            continue;
        }
        let x = index / (n * t);
        let y = (index / t) % n;
        let th = index % t;

        for a in 0..dim {
            let wx = wrap_xy.index(x, a);
            for b in 0..dim {
                let row = (wx * n + wrap_xy.index(y, b)) * t;
                for c in 0..dim {
                    dst[row + wrap_th.index(th, c)] += value * kernel.weight(a, b, c);
                }
            }
        }
    }
}

/// Rotate an `n x n` slice by `turns` quarter turns counter-clockwise,
/// matching the axis convention `out[i][j] = src[j][n - 1 - i]` for one turn.
fn rotate_quarter(src: &[f64], dst: &mut [f64], n: usize, turns: usize) {
    for i in 0..n {
        for j in 0..n {
            let (si, sj) = match turns % 4 {
                0 => (i, j),
                1 => (j, n - 1 - i),
                2 => (n - 1 - i, n - 1 - j),
                _ => (n - 1 - j, i),
            };
            dst[i * n + j] = src[si * n + sj];
        }
    }
}

/// Translation along a cardinal heading as a blended one-cell roll.
///
/// Quarter 0 moves along +y, 1 along +x, 2 along -y, 3 along -x.
fn shift_cardinal(src: &[f64], dst: &mut [f64], n: usize, quarter: usize, v: f64) {
    for i in 0..n {
        for j in 0..n {
            let (si, sj) = match quarter % 4 {
                0 => (i, (j + n - 1) % n),
                1 => ((i + n - 1) % n, j),
                2 => (i, (j + 1) % n),
                _ => ((i + 1) % n, j),
            };
            dst[i * n + j] = src[i * n + j] * (1.0 - v) + src[si * n + sj] * v;
        }
    }
}

/// Translation along an oblique heading.
///
/// The slice is rotated by `quarter` turns so the motion falls in the first
/// quadrant at angle `residual`, the four neighbouring cells are blended by
/// the areas they overlap after moving `v` cells, and the result is rotated
/// back. `slice` is used as scratch; the output lands in `out`.
fn shift_oblique(
    slice: &mut [f64],
    out: &mut [f64],
    n: usize,
    quarter: usize,
    residual: f64,
    v: f64,
) {
    let (sin, cos) = residual.sin_cos();
    let sw = v * v * cos * sin;
    let se = v * sin - sw;
    let nw = v * cos - sw;
    let ne = 1.0 - sw - se - nw;

    rotate_quarter(slice, out, n, quarter);
    for i in 0..n {
        let up = (i + n - 1) % n;
        for j in 0..n {
            let left = (j + n - 1) % n;
            slice[i * n + j] = ne * out[i * n + j]
                + nw * out[i * n + left]
                + se * out[up * n + j]
                + sw * out[up * n + left];
        }
    }
    rotate_quarter(slice, out, n, 4 - quarter % 4);
}
