use serde::{Deserialize, Serialize};

use crate::error::{Result, invalid, require_positive};
use crate::field::FieldGenerator;
use crate::threshold::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, ThresholdSolver, validate_porosity,
};

// Inputs of one microstructure run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrostructureParams {
    pub nx: usize, // columns
    pub ny: usize, // rows
    pub lambda_x: f64,
    pub lambda_y: f64,
    pub target_porosity: f64, // fraction of pore ('0') cells
    // None draws a fresh seed from system entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for MicrostructureParams {
    fn default() -> Self {
        Self {
            nx: 100,
            ny: 100,
            lambda_x: 5.0,
            lambda_y: 3.0,
            target_porosity: 0.2,
            seed: None,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl MicrostructureParams {
    // Check every input, reporting the first offending field by name
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 {
            return Err(invalid("nx", "must be > 0"));
        }
        if self.ny == 0 {
            return Err(invalid("ny", "must be > 0"));
        }
        require_positive("lambda_x", self.lambda_x)?;
        require_positive("lambda_y", self.lambda_y)?;
        validate_porosity(self.target_porosity)?;
        require_positive("tolerance", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be > 0"));
        }
        Ok(())
    }

    pub fn field_generator(&self) -> Result<FieldGenerator> {
        FieldGenerator::new(self.nx, self.ny, self.lambda_x, self.lambda_y)
    }

    pub fn threshold_solver(&self) -> Result<ThresholdSolver> {
        ThresholdSolver::new(self.tolerance, self.max_iterations)
    }
}
