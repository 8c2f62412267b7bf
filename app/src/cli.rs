use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use poremap::MicrostructureParams;

#[derive(Parser)]
#[command(
    name = "poremap",
    author,
    version,
    about = "Synthetic two-phase microstructure maps for FE section assignment"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a correlated random field, threshold it and write the 0/1 grid
    Generate(GenerateArgs),
    /// Check an existing grid file and print its phase statistics
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// JSON file with any subset of the run parameters; flags override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Number of columns
    #[arg(long)]
    pub nx: Option<usize>,

    /// Number of rows
    #[arg(long)]
    pub ny: Option<usize>,

    /// Correlation length along x, in cells
    #[arg(long)]
    pub lambda_x: Option<f64>,

    /// Correlation length along y, in cells
    #[arg(long)]
    pub lambda_y: Option<f64>,

    /// Target fraction of pore cells, strictly between 0 and 1
    #[arg(long)]
    pub porosity: Option<f64>,

    /// Seed for a reproducible run; drawn from system entropy when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Accepted absolute porosity error
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Threshold search budget
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Output grid file
    #[arg(short, long, default_value = "porosity.txt", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Also write field.png and binary.png into this directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub preview: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Grid file to check
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: PathBuf,

    /// Required number of columns
    #[arg(long, requires = "ny")]
    pub nx: Option<usize>,

    /// Required number of rows
    #[arg(long, requires = "nx")]
    pub ny: Option<usize>,
}

impl GenerateArgs {
    // defaults, then the config file, then flags
    pub fn params(&self) -> Result<MicrostructureParams> {
        let mut params = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => MicrostructureParams::default(),
        };

        if let Some(v) = self.nx {
            params.nx = v;
        }
        if let Some(v) = self.ny {
            params.ny = v;
        }
        if let Some(v) = self.lambda_x {
            params.lambda_x = v;
        }
        if let Some(v) = self.lambda_y {
            params.lambda_y = v;
        }
        if let Some(v) = self.porosity {
            params.target_porosity = v;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }
        if let Some(v) = self.tolerance {
            params.tolerance = v;
        }
        if let Some(v) = self.max_iterations {
            params.max_iterations = v;
        }
        Ok(params)
    }

    // Same as `params`, with a seed from system entropy when none was given
    pub fn seeded_params(&self) -> Result<MicrostructureParams> {
        let mut params = self.params()?;
        params.seed.get_or_insert_with(rand::random);
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use poremap::Microstructure;
    use tempfile::tempdir;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Generate(args) => args,
            Command::Verify(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_gives_defaults() {
        let args = generate_args(&["poremap", "generate"]);
        assert_eq!(args.params().unwrap(), MicrostructureParams::default());
        assert_eq!(args.output, PathBuf::from("porosity.txt"));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("run.json");
        fs::write(&config, r#"{ "nx": 64, "ny": 32, "target_porosity": 0.3 }"#).unwrap();

        let args = generate_args(&[
            "poremap",
            "generate",
            "--config",
            config.to_str().unwrap(),
            "--ny",
            "48",
            "--seed",
            "5",
        ]);
        let p = args.params().unwrap();
        assert_eq!((p.nx, p.ny), (64, 48));
        assert_eq!(p.target_porosity, 0.3);
        assert_eq!(p.seed, Some(5));
    }

    #[test]
    fn explicit_seed_is_kept() {
        let args = generate_args(&["poremap", "generate", "--seed", "42"]);
        assert_eq!(args.seeded_params().unwrap().seed, Some(42));
    }

    #[test]
    fn unseeded_run_gets_a_replayable_seed() {
        let args = generate_args(&["poremap", "generate", "--nx", "20", "--ny", "20"]);
        let params = args.seeded_params().unwrap();
        let seed = params.seed.unwrap();

        let run = Microstructure::generate(&params).unwrap();
        assert_eq!(run.seed, Some(seed));

        let seed_arg = seed.to_string();
        let replay_args = generate_args(&[
            "poremap",
            "generate",
            "--nx",
            "20",
            "--ny",
            "20",
            "--seed",
            seed_arg.as_str(),
        ]);
        let replay = Microstructure::generate(&replay_args.seeded_params().unwrap()).unwrap();
        assert_eq!(run.grid, replay.grid);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let args = generate_args(&["poremap", "generate", "--config", "/nonexistent/run.json"]);
        assert!(args.params().is_err());
    }

    #[test]
    fn verify_requires_both_dimensions() {
        assert!(Cli::try_parse_from(["poremap", "verify", "grid.txt", "--nx", "4"]).is_err());
        assert!(
            Cli::try_parse_from(["poremap", "verify", "grid.txt", "--nx", "4", "--ny", "4"])
                .is_ok()
        );
    }
}
