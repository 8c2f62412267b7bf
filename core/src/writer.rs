use std::io::{self, Write};
use std::path::Path;

use log::info;
use tempfile::NamedTempFile;

use crate::binary::{BinaryGrid, PORE};
use crate::error::{Error, Result};

// Serialize the grid as Ny lines of Nx '0'/'1' characters, each ended by '\n'.
// Plain ASCII: no header, no delimiters, no byte-order mark.
pub fn write_rows<W: Write>(grid: &BinaryGrid, out: &mut W) -> io::Result<()> {
    let mut line = Vec::with_capacity(grid.nx() + 1);
    for row in grid.rows() {
        line.clear();
        line.extend(row.iter().map(|&c| if c == PORE { b'0' } else { b'1' }));
        line.push(b'\n');
        out.write_all(&line)?;
    }
    Ok(())
}

pub fn to_text(grid: &BinaryGrid) -> String {
    let mut text = String::with_capacity((grid.nx() + 1) * grid.ny());
    for row in grid.rows() {
        text.extend(row.iter().map(|&c| if c == PORE { '0' } else { '1' }));
        text.push('\n');
    }
    text
}

// Write the grid to `path` in one piece: the rows go to a temporary file in
// the destination directory which is then renamed over `path`. On any error
// the temporary file is removed and `path` is left untouched.
pub fn write_grid(grid: &BinaryGrid, path: &Path) -> Result<()> {
    let wrap = |source: io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    {
        let mut out = io::BufWriter::new(tmp.as_file_mut());
        write_rows(grid, &mut out).map_err(wrap)?;
        out.flush().map_err(wrap)?;
    }
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;

    info!(
        "wrote {}x{} grid to {}",
        grid.ny(),
        grid.nx(),
        path.display()
    );
    Ok(())
}
