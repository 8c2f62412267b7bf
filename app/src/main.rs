mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use poremap::{BinaryGrid, Microstructure};

use crate::cli::{Cli, Command, GenerateArgs, VerifyArgs};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Generate(args) => generate(&args),
        Command::Verify(args) => verify(&args),
    }
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let params = args.seeded_params()?;
    let run = Microstructure::generate(&params)?;
    run.write(&args.output)?;

    if let Some(dir) = &args.preview {
        poremap_report::save_previews(&run, dir)?;
    }

    let seed = run
        .seed
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    println!(
        "{}: {}x{} cells, seed {seed}, threshold {:.6}, porosity {:.4} (target {})",
        args.output.display(),
        run.grid.ny(),
        run.grid.nx(),
        run.threshold.value,
        run.porosity(),
        params.target_porosity
    );
    if let Some(delta) = run.threshold.shortfall() {
        println!("porosity off target by {delta:+.6}");
    }
    Ok(())
}

fn verify(args: &VerifyArgs) -> Result<()> {
    let grid = match (args.nx, args.ny) {
        (Some(nx), Some(ny)) => BinaryGrid::read_expecting(&args.path, nx, ny),
        _ => BinaryGrid::read(&args.path),
    }
    .with_context(|| format!("verifying {}", args.path.display()))?;

    if grid.pore_count() == 0 || grid.solid_count() == 0 {
        warn!("{} holds a single phase", args.path.display());
    }
    info!("{} is a valid grid", args.path.display());
    println!(
        "{}: {} rows x {} columns, solid {}, pore {}, porosity {:.4}",
        args.path.display(),
        grid.ny(),
        grid.nx(),
        grid.solid_count(),
        grid.pore_count(),
        grid.porosity()
    );
    Ok(())
}
