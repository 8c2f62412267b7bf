// report renders PNG previews of a run; it never touches the text grid
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgb, RgbImage};
use log::info;
use palette::{Gradient, LinSrgb};
use poremap::{BinaryGrid, Microstructure, RandomField, SOLID};
use thiserror::Error;

pub const FIELD_PREVIEW: &str = "field.png";
pub const BINARY_PREVIEW: &str = "binary.png";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create preview directory {}: {source}", path.display())]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to save preview {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

// Blue -> cyan -> yellow -> red, in the spirit of a jet colormap
fn field_gradient() -> Gradient<LinSrgb> {
    Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.0, 0.0, 0.5)),
        (0.35, LinSrgb::new(0.0, 0.8, 1.0)),
        (0.65, LinSrgb::new(1.0, 0.9, 0.0)),
        (1.00, LinSrgb::new(0.5, 0.0, 0.0)),
    ])
}

// Colour the field by its min..max range; row 0 is the top image row
pub fn field_image(field: &RandomField) -> RgbImage {
    let gradient = field_gradient();
    let (min, max) = field.min_max();
    let range = max - min;

    let mut img = RgbImage::new(field.nx() as u32, field.ny() as u32);
    for (y, row) in field.rows().iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let t = if range.abs() < f64::EPSILON {
                0.5
            } else {
                ((v - min) / range) as f32
            };
            let col = gradient.get(t).into_format::<u8>();
            img.put_pixel(x as u32, y as u32, Rgb([col.red, col.green, col.blue]));
        }
    }
    img
}

// White for solid, black for pore
pub fn binary_image(grid: &BinaryGrid) -> GrayImage {
    let mut img = GrayImage::new(grid.nx() as u32, grid.ny() as u32);
    for (y, row) in grid.rows().iter().enumerate() {
        for (x, &c) in row.iter().enumerate() {
            let v = if c == SOLID { 255 } else { 0 };
            img.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    img
}

// Write field.png and binary.png into `dir`, creating it if needed
pub fn save_previews(run: &Microstructure, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Dir {
        path: dir.to_path_buf(),
        source,
    })?;

    let field_path = dir.join(FIELD_PREVIEW);
    field_image(&run.field)
        .save(&field_path)
        .map_err(|source| ReportError::Save {
            path: field_path.clone(),
            source,
        })?;

    let binary_path = dir.join(BINARY_PREVIEW);
    binary_image(&run.grid)
        .save(&binary_path)
        .map_err(|source| ReportError::Save {
            path: binary_path.clone(),
            source,
        })?;

    info!(
        "saved previews to {} (porosity {:.2})",
        dir.display(),
        run.porosity()
    );
    Ok(vec![field_path, binary_path])
}
