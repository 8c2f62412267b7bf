use std::path::Path;

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::binary::BinaryGrid;
use crate::error::{Result, invalid};
use crate::field::RandomField;
use crate::params::MicrostructureParams;
use crate::threshold::Threshold;
use crate::writer::write_grid;

// Result of one run: field -> threshold -> binary grid
#[derive(Debug, Clone)]
pub struct Microstructure {
    pub seed: Option<u64>, // seed of the ChaCha stream, None for caller-supplied rngs
    pub field: RandomField,
    pub threshold: Threshold,
    pub grid: BinaryGrid,
}

impl Microstructure {
    // Run on a ChaCha stream seeded with `params.seed`, which must be set.
    // Drawing an entropy seed for unseeded runs is left to the entry point.
    pub fn generate(params: &MicrostructureParams) -> Result<Self> {
        params.validate()?;
        let seed = params
            .seed
            .ok_or_else(|| invalid("seed", "must be set for a seeded run"))?;
        info!("seed {seed}");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut run = Self::generate_with_rng(params, &mut rng)?;
        run.seed = Some(seed);
        Ok(run)
    }

    // Run drawing white noise from `rng`. Parameters are validated before
    // the first draw, so a rejected run leaves `rng` untouched.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        params: &MicrostructureParams,
        rng: &mut R,
    ) -> Result<Self> {
        params.validate()?;
        let generator = params.field_generator()?;
        let solver = params.threshold_solver()?;

        let field = generator.generate(rng);
        let threshold = solver.solve(&field, params.target_porosity)?;
        let grid = BinaryGrid::from_field(&field, threshold.value);

        let achieved = grid.porosity();
        info!(
            "{}x{} map, lambda=({}, {}), F0={:.6}, porosity {:.4} (target {})",
            params.ny,
            params.nx,
            params.lambda_x,
            params.lambda_y,
            threshold.value,
            achieved,
            params.target_porosity
        );
        if let Some(delta) = threshold.shortfall() {
            warn!(
                "porosity {achieved:.6} misses target {} by {delta:+.6} (tolerance {}, {} iterations)",
                params.target_porosity, params.tolerance, threshold.iterations
            );
        }

        Ok(Self {
            seed: None,
            field,
            threshold,
            grid,
        })
    }

    // Porosity of the realized grid
    pub fn porosity(&self) -> f64 {
        self.grid.porosity()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_grid(&self.grid, path)
    }
}
