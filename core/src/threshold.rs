use log::{debug, warn};

use crate::error::{Result, invalid, require_positive};
use crate::field::RandomField;

pub const DEFAULT_TOLERANCE: f64 = 1e-3;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

// Outcome of a threshold search.
// `achieved` is the porosity the returned cutoff really produces on the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub value: f64,
    pub target: f64,
    pub achieved: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl Threshold {
    // Achieved minus target porosity when the tolerance band was missed
    pub fn shortfall(&self) -> Option<f64> {
        (!self.converged).then(|| self.achieved - self.target)
    }
}

// Bisection over the field's value range for the cutoff F0 with
// fraction(field <= F0) closest to the target porosity.
//
// The objective is a step function of F0, so the search stops on the first
// cutoff inside the tolerance band, when the bracket collapses onto a jump
// (tied values), or when the iteration budget runs out. The best cutoff seen
// so far is returned in every case.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdSolver {
    tolerance: f64,
    max_iterations: usize,
}

impl Default for ThresholdSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ThresholdSolver {
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<Self> {
        require_positive("tolerance", tolerance)?;
        if max_iterations == 0 {
            return Err(invalid("max_iterations", "must be > 0"));
        }
        Ok(Self {
            tolerance,
            max_iterations,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn solve(&self, field: &RandomField, target: f64) -> Result<Threshold> {
        validate_porosity(target)?;

        // Bracket on the realized range rather than assuming standard-normal bounds
        let (mut lo, mut hi) = field.min_max();
        if hi <= lo {
            let achieved = field.fraction_at_or_below(lo);
            warn!("field is constant at {lo}; porosity is {achieved} regardless of target {target}");
            return Ok(Threshold {
                value: lo,
                target,
                achieved,
                iterations: 0,
                converged: (achieved - target).abs() <= self.tolerance,
            });
        }

        let mut best = Candidate::at(field, target, hi);
        best.keep_better(Candidate::at(field, target, lo));

        // Narrower than this the bracket is sitting on a single jump
        let min_width = (hi - lo) * f64::EPSILON;
        let mut iterations = 0;
        while iterations < self.max_iterations && best.error > self.tolerance {
            if hi - lo <= min_width {
                debug!("bracket collapsed at [{lo}, {hi}] after {iterations} iterations");
                break;
            }
            iterations += 1;
            let mid = lo + (hi - lo) * 0.5;
            let candidate = Candidate::at(field, target, mid);
            if candidate.porosity < target {
                lo = mid;
            } else {
                hi = mid;
            }
            best.keep_better(candidate);
        }

        let converged = best.error <= self.tolerance;
        debug!(
            "threshold {:.6} gives porosity {:.6} (target {target}) after {iterations} iterations",
            best.value, best.porosity
        );
        Ok(Threshold {
            value: best.value,
            target,
            achieved: best.porosity,
            iterations,
            converged,
        })
    }
}

pub(crate) fn validate_porosity(target: f64) -> Result<()> {
    if target.is_finite() && target > 0.0 && target < 1.0 {
        Ok(())
    } else {
        Err(invalid(
            "target_porosity",
            format!("must lie strictly between 0 and 1, got {target}"),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    value: f64,
    porosity: f64,
    error: f64,
}

impl Candidate {
    fn at(field: &RandomField, target: f64, value: f64) -> Self {
        let porosity = field.fraction_at_or_below(value);
        Self {
            value,
            porosity,
            error: (porosity - target).abs(),
        }
    }

    fn keep_better(&mut self, other: Candidate) {
        if other.error < self.error {
            *self = other;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::field::FieldGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ramp(n: usize) -> RandomField {
        // n distinct values on one row
        RandomField::from_raw(vec![(0..n).map(|i| i as f64).collect()]).unwrap()
    }

    #[test]
    fn finds_exact_quantile_on_distinct_values() {
        let field = ramp(100);
        let t = ThresholdSolver::default().solve(&field, 0.2).unwrap();
        assert!(t.converged);
        assert!((t.achieved - 0.2).abs() <= 1e-3);
        assert_eq!(field.fraction_at_or_below(t.value), t.achieved);
        assert!(t.shortfall().is_none());
    }

    #[test]
    fn porosity_within_tolerance_across_seeds() {
        let generator = FieldGenerator::new(100, 100, 5.0, 3.0).unwrap();
        let solver = ThresholdSolver::default();
        for seed in 0..5 {
            let field = generator.generate(&mut ChaCha8Rng::seed_from_u64(seed));
            for &target in &[0.05, 0.2, 0.5, 0.83] {
                let t = solver.solve(&field, target).unwrap();
                assert!(t.converged, "seed {seed}, target {target}: {t:?}");
                assert!((t.achieved - target).abs() <= solver.tolerance());
            }
        }
    }

    #[test]
    fn threshold_stays_inside_field_range() {
        let field = ramp(10);
        let t = ThresholdSolver::default().solve(&field, 0.95).unwrap();
        let (lo, hi) = field.min_max();
        assert!(t.value >= lo && t.value <= hi);
    }

    #[test]
    fn tied_values_terminate_with_shortfall() {
        // Half the cells share one value: 0.3 is unreachable, only 0.5 or 1.0
        let field = RandomField::from_raw(vec![vec![0.0, 0.0, 1.0, 2.0]]).unwrap();
        let t = ThresholdSolver::new(1e-3, 1000).unwrap().solve(&field, 0.3).unwrap();
        assert!(!t.converged);
        assert!(t.iterations < 1000);
        assert_eq!(t.achieved, 0.5);
        assert!((t.shortfall().unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn iteration_budget_is_respected() {
        let field = ramp(10_000);
        let t = ThresholdSolver::new(1e-9, 3).unwrap().solve(&field, 0.123).unwrap();
        assert_eq!(t.iterations, 3);
        assert!(!t.converged);
        assert!(t.shortfall().is_some());
    }

    #[test]
    fn constant_field_returns_the_constant() {
        let field = RandomField::from_raw(vec![vec![0.0; 5]; 5]).unwrap();
        let t = ThresholdSolver::default().solve(&field, 0.5).unwrap();
        assert_eq!(t.value, 0.0);
        assert_eq!(t.achieved, 1.0);
        assert_eq!(t.iterations, 0);
        assert!(!t.converged);
    }

    #[test]
    fn rejects_porosity_outside_unit_interval() {
        let field = ramp(4);
        for bad in [0.0, 1.0, 1.2, -0.1, f64::NAN] {
            assert!(matches!(
                ThresholdSolver::default().solve(&field, bad),
                Err(Error::InvalidParameter { name: "target_porosity", .. })
            ));
        }
    }

    #[test]
    fn rejects_bad_solver_settings() {
        assert!(ThresholdSolver::new(0.0, 10).is_err());
        assert!(ThresholdSolver::new(1e-3, 0).is_err());
    }
}
