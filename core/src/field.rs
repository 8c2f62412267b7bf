use log::{debug, warn};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Result, invalid, require_positive};
use crate::utils::{Field2D, mean_std2, min_max2, standardize2};

// Kernel extent in standard deviations, same cut-off as the usual ndimage filter
const KERNEL_TRUNCATE: f64 = 4.0;
// Upper bound on taps per side; the folded kernel is flat long before this
const MAX_KERNEL_RADIUS: usize = 1 << 22;

// Standardized 2D Gaussian random field, Ny rows × Nx columns
#[derive(Debug, Clone, PartialEq)]
pub struct RandomField {
    map: Field2D,
}

impl RandomField {
    // Wrap a rectangular map as is. Mean 0 / std 1 is NOT checked here, so
    // only FieldGenerator::generate builds fields outside this crate.
    pub(crate) fn from_raw(map: Field2D) -> Result<Self> {
        let nx = map.first().map(Vec::len).unwrap_or(0);
        if map.is_empty() || nx == 0 {
            return Err(invalid("field", "must have at least one row and one column"));
        }
        if map.iter().any(|row| row.len() != nx) {
            return Err(invalid("field", "rows must all have the same length"));
        }
        if map.iter().flatten().any(|v| !v.is_finite()) {
            return Err(invalid("field", "values must be finite"));
        }
        Ok(Self { map })
    }

    pub fn nx(&self) -> usize {
        self.map[0].len()
    }

    pub fn ny(&self) -> usize {
        self.map.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.map
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.map[row][col]
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.map.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.nx() * self.ny()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn min_max(&self) -> (f64, f64) {
        // from_raw and the generator both guarantee at least one value
        min_max2(&self.map).unwrap_or((0.0, 0.0))
    }

    pub fn mean_std(&self) -> (f64, f64) {
        mean_std2(&self.map)
    }

    // Fraction of cells with value <= cutoff, i.e. the porosity a threshold yields
    pub fn fraction_at_or_below(&self, cutoff: f64) -> f64 {
        let below = self.values().filter(|&v| v <= cutoff).count();
        below as f64 / self.len() as f64
    }
}

// Correlated random field generator: white noise, periodic Gaussian smoothing,
// then re-standardization to mean 0 and standard deviation 1.
#[derive(Debug, Clone, Copy)]
pub struct FieldGenerator {
    nx: usize,
    ny: usize,
    lambda_x: f64, // correlation length along columns, grid units
    lambda_y: f64, // correlation length along rows, grid units
}

impl FieldGenerator {
    pub fn new(nx: usize, ny: usize, lambda_x: f64, lambda_y: f64) -> Result<Self> {
        if nx == 0 {
            return Err(invalid("nx", "must be > 0"));
        }
        if ny == 0 {
            return Err(invalid("ny", "must be > 0"));
        }
        require_positive("lambda_x", lambda_x)?;
        require_positive("lambda_y", lambda_y)?;
        Ok(Self {
            nx,
            ny,
            lambda_x,
            lambda_y,
        })
    }

    // Kernel standard deviations (sigma_x, sigma_y) = lambda / sqrt(2)
    pub fn sigmas(&self) -> (f64, f64) {
        (
            self.lambda_x / std::f64::consts::SQRT_2,
            self.lambda_y / std::f64::consts::SQRT_2,
        )
    }

    // Generate one field, drawing Ny×Nx standard-normal samples from `rng`
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> RandomField {
        let mut map: Field2D = (0..self.ny)
            .map(|_| (0..self.nx).map(|_| rng.sample(StandardNormal)).collect())
            .collect();

        let (sigma_x, sigma_y) = self.sigmas();
        let kernel_y = periodic_kernel(sigma_y, self.ny);
        let kernel_x = periodic_kernel(sigma_x, self.nx);
        debug!(
            "smoothing {}x{} noise, sigma=({sigma_x:.3}, {sigma_y:.3}), taps=({}, {})",
            self.ny,
            self.nx,
            kernel_x.len(),
            kernel_y.len()
        );
        smooth_columns(&mut map, &kernel_y);
        smooth_rows(&mut map, &kernel_x);

        if !standardize2(&mut map) {
            warn!(
                "smoothed field is constant ({}x{}, lambda=({}, {})); left at zero",
                self.ny, self.nx, self.lambda_x, self.lambda_y
            );
        }
        RandomField { map }
    }
}

// Normalized Gaussian taps folded onto a periodic axis of length n.
// Each entry is (offset mod n, weight); weights sum to 1.
fn periodic_kernel(sigma: f64, n: usize) -> Vec<(usize, f64)> {
    let radius = ((KERNEL_TRUNCATE * sigma + 0.5) as usize).min(MAX_KERNEL_RADIUS);
    if radius == 0 {
        return vec![(0, 1.0)];
    }

    let mut folded = vec![0.0f64; n];
    let mut total = 0.0;
    let r = radius as isize;
    for k in -r..=r {
        let x = k as f64;
        let w = (-0.5 * x * x / (sigma * sigma)).exp();
        folded[k.rem_euclid(n as isize) as usize] += w;
        total += w;
    }

    folded
        .into_iter()
        .enumerate()
        .filter(|&(_, w)| w > 0.0)
        .map(|(offset, w)| (offset, w / total))
        .collect()
}

// Convolve every row along x with wrap-around at the edges
fn smooth_rows(map: &mut Field2D, kernel: &[(usize, f64)]) {
    for row in map.iter_mut() {
        let n = row.len();
        let smoothed: Vec<f64> = (0..n)
            .map(|x| kernel.iter().map(|&(o, w)| w * row[(x + o) % n]).sum())
            .collect();
        *row = smoothed;
    }
}

// Convolve every column along y with wrap-around at the edges
fn smooth_columns(map: &mut Field2D, kernel: &[(usize, f64)]) {
    let h = map.len();
    let w = map[0].len();
    let mut out = vec![vec![0.0; w]; h];
    for y in 0..h {
        for &(o, weight) in kernel {
            let src = &map[(y + o) % h];
            for (dst, &v) in out[y].iter_mut().zip(src) {
                *dst += weight * v;
            }
        }
    }
    *map = out;
}
