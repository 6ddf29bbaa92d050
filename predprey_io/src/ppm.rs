use std::io::{self, Write};

use predprey_core::{Frame, Landscape};

/// Snapshot file name for the frame captured before the given step.
pub fn map_file_name(step: u64) -> String {
    format!("map_{step:04}.ppm")
}

/// Render one frame as a plain-text P3 raster, one pixel per line.
///
/// Predators drive the red channel and prey the green channel, each scaled
/// against its own maximum within this frame so the brightest cell is always
/// full intensity; a frame with no population of a species leaves that
/// channel dark. Water cells use a fixed sea palette.
pub fn write_density_map<W: Write>(
    out: &mut W,
    landscape: &Landscape,
    frame: &Frame,
) -> io::Result<()> {
    debug_assert_eq!(landscape.width(), frame.width);
    debug_assert_eq!(landscape.height(), frame.height);

    let max_prey = frame.prey.iter().fold(0.0f64, |acc, &v| acc.max(v));
    let max_predators = frame.predators.iter().fold(0.0f64, |acc, &v| acc.max(v));

    writeln!(out, "P3")?;
    writeln!(out, "{} {}", frame.width, frame.height)?;
    writeln!(out, "255")?;
    let idx = |x: usize, y: usize| y * frame.width + x;
    for y in 0..frame.height {
        for x in 0..frame.width {
            if landscape.is_land(x, y) {
                let prey_col = channel(frame.prey[idx(x, y)], max_prey);
                let pred_col = channel(frame.predators[idx(x, y)], max_predators);
                writeln!(out, "{pred_col} {prey_col} 0")?;
            } else {
                writeln!(out, "0 200 255")?;
            }
        }
    }
    Ok(())
}

fn channel(value: f64, max: f64) -> u32 {
    if max == 0.0 {
        0
    } else {
        (value / max * 255.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize, prey: Vec<f64>, predators: Vec<f64>) -> Frame {
        Frame {
            step: 0,
            time: 0.0,
            mean_prey: 0.0,
            mean_predators: 0.0,
            width,
            height,
            prey,
            predators,
        }
    }

    #[test]
    fn file_names_are_zero_padded_by_step() {
        assert_eq!(map_file_name(0), "map_0000.ppm");
        assert_eq!(map_file_name(10), "map_0010.ppm");
        assert_eq!(map_file_name(12345), "map_12345.ppm");
    }

    #[test]
    fn land_and_water_pixels_follow_the_palette() {
        let landscape = Landscape::from_mask(2, 1, vec![true, false]).unwrap();
        let frame = frame(2, 1, vec![4.0, 0.0], vec![2.0, 0.0]);
        let mut out = Vec::new();
        write_density_map(&mut out, &landscape, &frame).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "P3\n2 1\n255\n255 255 0\n0 200 255\n");
    }

    #[test]
    fn channels_scale_against_the_frame_maximum() {
        let landscape = Landscape::from_mask(2, 1, vec![true, true]).unwrap();
        let frame = frame(2, 1, vec![4.0, 2.0], vec![0.0, 0.0]);
        let mut out = Vec::new();
        write_density_map(&mut out, &landscape, &frame).unwrap();
        let text = String::from_utf8(out).unwrap();
        // 2/4 of 255 truncates to 127.
        assert_eq!(text, "P3\n2 1\n255\n0 255 0\n0 127 0\n");
    }

    #[test]
    fn an_absent_species_leaves_its_channel_dark() {
        let landscape = Landscape::from_mask(1, 1, vec![true]).unwrap();
        let frame = frame(1, 1, vec![0.0], vec![0.0]);
        let mut out = Vec::new();
        write_density_map(&mut out, &landscape, &frame).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "P3\n1 1\n255\n0 0 0\n");
    }

    #[test]
    fn rows_are_written_top_to_bottom() {
        let landscape = Landscape::from_mask(1, 2, vec![true, true]).unwrap();
        let frame = frame(1, 2, vec![1.0, 0.5], vec![0.0, 0.0]);
        let mut out = Vec::new();
        write_density_map(&mut out, &landscape, &frame).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "P3\n1 2\n255\n0 255 0\n0 127 0\n"
        );
    }
}
