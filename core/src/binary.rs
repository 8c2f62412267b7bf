use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::field::RandomField;

// Cell value for material (field above the threshold)
pub const SOLID: u8 = 1;
// Cell value for pore (field at or below the threshold)
pub const PORE: u8 = 0;

// Two-phase map, Ny rows × Nx columns of SOLID / PORE.
// Row 0 is the first line of the text grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    cells: Vec<Vec<u8>>,
}

impl BinaryGrid {
    // grid[r][c] = 1 where field[r][c] > threshold, else 0
    pub fn from_field(field: &RandomField, threshold: f64) -> Self {
        let cells = field
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v > threshold { SOLID } else { PORE })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    pub fn nx(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn ny(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn pore_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == PORE).count()
    }

    pub fn solid_count(&self) -> usize {
        self.nx() * self.ny() - self.pore_count()
    }

    // Fraction of pore cells
    pub fn porosity(&self) -> f64 {
        let total = self.nx() * self.ny();
        if total == 0 {
            return 0.0;
        }
        self.pore_count() as f64 / total as f64
    }

    // Parse the '0'/'1' text format. Surrounding whitespace on each line is
    // ignored, as the section-assignment consumer strips its lines.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut cells: Vec<Vec<u8>> = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            let row = line
                .chars()
                .enumerate()
                .map(|(col, ch)| match ch {
                    '0' => Ok(PORE),
                    '1' => Ok(SOLID),
                    other => Err(Error::GridFormat {
                        line: i + 1,
                        reason: format!("unexpected character {other:?} at column {}", col + 1),
                    }),
                })
                .collect::<Result<Vec<u8>>>()?;
            if row.is_empty() {
                return Err(Error::GridFormat {
                    line: i + 1,
                    reason: "empty row".into(),
                });
            }
            if let Some(first) = cells.first() {
                if row.len() != first.len() {
                    return Err(Error::GridFormat {
                        line: i + 1,
                        reason: format!("expected {} columns, found {}", first.len(), row.len()),
                    });
                }
            }
            cells.push(row);
        }
        if cells.is_empty() {
            return Err(Error::GridFormat {
                line: 0,
                reason: "grid has no rows".into(),
            });
        }
        Ok(Self { cells })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    // Read a grid and require exactly `ny` rows of `nx` columns,
    // the same precondition the mesh partition applies.
    pub fn read_expecting(path: &Path, nx: usize, ny: usize) -> Result<Self> {
        let grid = Self::read(path)?;
        if grid.ny() != ny || grid.nx() != nx {
            return Err(Error::GridFormat {
                line: 0,
                reason: format!(
                    "expected {ny} rows of {nx} columns, found {} rows of {} columns",
                    grid.ny(),
                    grid.nx()
                ),
            });
        }
        Ok(grid)
    }
}
