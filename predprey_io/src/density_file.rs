use std::{
    fs,
    path::{Path, PathBuf},
};

use predprey_core::DensityGrid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DensityInputError {
    #[error("failed to read density file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed density file at line {line}: {reason}")]
    MalformedInputFile { line: usize, reason: String },
}

/// Read and parse a density file from disk.
pub fn load_density_file(path: impl AsRef<Path>) -> Result<DensityGrid, DensityInputError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DensityInputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = parse_density_grid(&text)?;
    tracing::debug!(
        target: "predprey::report",
        path = %path.display(),
        width = grid.width,
        height = grid.height,
        "densities.loaded"
    );
    Ok(grid)
}

/// Parse the external density format: a `width height` header line, then
/// `height` rows of `width` non-negative integers. Each value packs both
/// species into its decimal digits, tens and up for prey and the units
/// digit for predators, so `47` means prey `4.0` and predators `7.0`.
/// Blank lines are ignored; anything else out of shape is a
/// [`DensityInputError::MalformedInputFile`] with a 1-based line number.
pub fn parse_density_grid(text: &str) -> Result<DensityGrid, DensityInputError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) =
        lines
            .next()
            .ok_or_else(|| DensityInputError::MalformedInputFile {
                line: 1,
                reason: "missing `width height` header".to_string(),
            })?;
    let mut dims = header.split_whitespace();
    let width = parse_dimension(header_line, dims.next(), "width")?;
    let height = parse_dimension(header_line, dims.next(), "height")?;
    if dims.next().is_some() {
        return Err(DensityInputError::MalformedInputFile {
            line: header_line,
            reason: "header must be exactly `width height`".to_string(),
        });
    }

    let mut prey = Vec::with_capacity(width * height);
    let mut predators = Vec::with_capacity(width * height);
    let mut rows = 0usize;
    let mut last_line = header_line;
    for (line_no, row) in lines {
        last_line = line_no;
        if rows == height {
            return Err(DensityInputError::MalformedInputFile {
                line: line_no,
                reason: format!("expected {height} rows, found more"),
            });
        }
        let mut cells = 0usize;
        for token in row.split_whitespace() {
            let value: u32 = token.parse().map_err(|_| {
                DensityInputError::MalformedInputFile {
                    line: line_no,
                    reason: format!("expected a non-negative integer density, got {token:?}"),
                }
            })?;
            prey.push(f64::from(value / 10));
            predators.push(f64::from(value % 10));
            cells += 1;
        }
        if cells != width {
            return Err(DensityInputError::MalformedInputFile {
                line: line_no,
                reason: format!("expected {width} values per row, found {cells}"),
            });
        }
        rows += 1;
    }
    if rows != height {
        return Err(DensityInputError::MalformedInputFile {
            line: last_line,
            reason: format!("expected {height} rows, found {rows}"),
        });
    }

    Ok(DensityGrid::new(width, height, prey, predators))
}

fn parse_dimension(
    line: usize,
    token: Option<&str>,
    what: &str,
) -> Result<usize, DensityInputError> {
    let token = token.ok_or_else(|| DensityInputError::MalformedInputFile {
        line,
        reason: format!("header is missing the {what}"),
    })?;
    let value: usize = token
        .parse()
        .map_err(|_| DensityInputError::MalformedInputFile {
            line,
            reason: format!("{what} must be a positive integer, got {token:?}"),
        })?;
    if value == 0 {
        return Err(DensityInputError::MalformedInputFile {
            line,
            reason: format!("{what} must be positive"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_documented_layout() {
        let grid = parse_density_grid("3 2\n12 03 00\n40 99 01\n").unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.prey, vec![1.0, 0.0, 0.0, 4.0, 9.0, 0.0]);
        assert_eq!(grid.predators, vec![2.0, 3.0, 0.0, 0.0, 9.0, 1.0]);
    }

    #[test]
    fn values_beyond_two_digits_split_at_the_units_digit() {
        let grid = parse_density_grid("1 1\n345\n").unwrap();
        assert_eq!(grid.prey, vec![34.0]);
        assert_eq!(grid.predators, vec![5.0]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let grid = parse_density_grid("\n2 1\n\n12 34\n\n").unwrap();
        assert_eq!(grid.prey, vec![1.0, 3.0]);
        assert_eq!(grid.predators, vec![2.0, 4.0]);
    }

    #[test]
    fn rejects_an_empty_file() {
        let err = parse_density_grid("").unwrap_err();
        assert!(matches!(
            err,
            DensityInputError::MalformedInputFile { line: 1, .. }
        ));
    }

    #[test]
    fn rejects_a_non_numeric_header() {
        let err = parse_density_grid("three 2\n11 11 11\n22 22 22\n").unwrap_err();
        match err {
            DensityInputError::MalformedInputFile { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("width"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = parse_density_grid("0 4\n").unwrap_err();
        match err {
            DensityInputError::MalformedInputFile { line: 1, reason } => {
                assert!(reason.contains("positive"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_a_non_numeric_density_with_its_line_number() {
        let err = parse_density_grid("2 2\n11 11\n1x 23\n").unwrap_err();
        match err {
            DensityInputError::MalformedInputFile { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("1x"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_a_short_row() {
        let err = parse_density_grid("3 1\n12 34\n").unwrap_err();
        match err {
            DensityInputError::MalformedInputFile { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("found 2"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_too_few_rows() {
        let err = parse_density_grid("2 3\n11 11\n").unwrap_err();
        match err {
            DensityInputError::MalformedInputFile { reason, .. } => {
                assert!(reason.contains("found 1"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_extra_rows() {
        let err = parse_density_grid("2 1\n11 11\n22 22\n").unwrap_err();
        assert!(matches!(
            err,
            DensityInputError::MalformedInputFile { line: 3, .. }
        ));
    }

    #[test]
    fn missing_files_surface_the_path() {
        let err = load_density_file("/definitely/not/here.dat").unwrap_err();
        assert!(matches!(err, DensityInputError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.dat"));
    }
}
