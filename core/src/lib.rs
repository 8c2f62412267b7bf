// core holds the microstructure synthesis: correlated field, threshold search, binary map
pub mod binary;
pub mod error;
pub mod field;
pub mod params;
pub mod pipeline;
pub mod threshold;
pub mod utils;
pub mod writer;

pub use binary::{BinaryGrid, PORE, SOLID};
pub use error::{Error, Result};
pub use field::{FieldGenerator, RandomField};
pub use params::MicrostructureParams;
pub use pipeline::Microstructure;
pub use threshold::{Threshold, ThresholdSolver};
pub use writer::write_grid;
