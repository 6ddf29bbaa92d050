use std::io::{self, Write};

use predprey_core::Frame;

/// File name of the per-interval means table inside the output directory.
pub const AVERAGES_FILE_NAME: &str = "averages.csv";

pub fn write_averages_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Timestep,Time,Prey,Predators")
}

/// One CSV row per recorded frame. Time keeps one decimal; the means keep
/// seventeen so trajectories compare byte for byte across runs.
pub fn write_averages_row<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    writeln!(
        out,
        "{},{:.1},{:.17},{:.17}",
        frame.step, frame.time, frame.mean_prey, frame.mean_predators
    )
}
