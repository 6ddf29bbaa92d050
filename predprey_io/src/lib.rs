//! File formats and background reporting for the simulation engine.
//!
//! Parses the external density-grid input format and writes the two run
//! artifacts, the per-interval averages CSV and the plain-PPM density
//! maps, either directly or through a channel-fed [`Reporter`] thread.

mod averages;
mod density_file;
mod ppm;
mod reporter;

pub use averages::{write_averages_header, write_averages_row, AVERAGES_FILE_NAME};
pub use density_file::{load_density_file, parse_density_grid, DensityInputError};
pub use ppm::{map_file_name, write_density_map};
pub use reporter::{ReportError, Reporter};
