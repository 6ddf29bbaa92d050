use crate::{error::SimulationError, landscape::Landscape};

/// Dense per-species density grid handed in by an external density source.
///
/// Plain data, row-major, one `f64` per cell per species. Carries its own
/// dimensions so state construction can check them against the landscape.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub width: usize,
    pub height: usize,
    pub prey: Vec<f64>,
    pub predators: Vec<f64>,
}

impl DensityGrid {
    pub fn new(width: usize, height: usize, prey: Vec<f64>, predators: Vec<f64>) -> Self {
        debug_assert_eq!(prey.len(), width * height);
        debug_assert_eq!(predators.len(), width * height);
        Self {
            width,
            height,
            prey,
            predators,
        }
    }

    /// Same value in every cell; handy for scenario tests and benches.
    pub fn uniform(width: usize, height: usize, prey: f64, predators: f64) -> Self {
        Self {
            width,
            height,
            prey: vec![prey; width * height],
            predators: vec![predators; width * height],
        }
    }

    /// Copy of this grid with every water cell forced to zero.
    ///
    /// Density files carry a value for every cell and know nothing about
    /// the landscape that will be generated for the run, so the glue layer
    /// applies this step explicitly before building state. The core itself
    /// never corrects densities.
    pub fn masked(&self, landscape: &Landscape) -> DensityGrid {
        let mut out = self.clone();
        let mut zeroed = 0usize;
        for y in 0..self.height.min(landscape.height()) {
            for x in 0..self.width.min(landscape.width()) {
                if landscape.is_land(x, y) {
                    continue;
                }
                let i = y * self.width + x;
                if out.prey[i] != 0.0 || out.predators[i] != 0.0 {
                    zeroed += 1;
                }
                out.prey[i] = 0.0;
                out.predators[i] = 0.0;
            }
        }
        tracing::debug!(
            target: "predprey::engine",
            zeroed,
            "densities.masked_to_landscape"
        );
        out
    }
}

/// Double-buffered prey/predator densities.
///
/// The integrator reads the current buffer, writes the next buffer, and
/// swaps exactly once per completed step, so no cell's update can observe
/// another cell's value from the same step. Water cells hold zero in both
/// buffers at all times.
#[derive(Debug, Clone)]
pub struct PopulationState {
    width: usize,
    height: usize,
    prey: Vec<f64>,
    predators: Vec<f64>,
    prey_next: Vec<f64>,
    predators_next: Vec<f64>,
}

impl PopulationState {
    /// Build state from an external density grid, validating it against
    /// the landscape.
    ///
    /// Fails with [`SimulationError::ShapeMismatch`] when the grid and
    /// landscape disagree on dimensions and with
    /// [`SimulationError::DensityOnWaterCell`] when any water cell carries
    /// a nonzero density; a negative or non-finite density anywhere is
    /// rejected as invalid input. Nothing is corrected silently.
    pub fn from_grid(landscape: &Landscape, grid: DensityGrid) -> Result<Self, SimulationError> {
        if grid.width != landscape.width() || grid.height != landscape.height() {
            return Err(SimulationError::ShapeMismatch {
                expected_width: landscape.width(),
                expected_height: landscape.height(),
                found_width: grid.width,
                found_height: grid.height,
            });
        }

        for y in 0..grid.height {
            for x in 0..grid.width {
                let i = y * grid.width + x;
                let (m, f) = (grid.prey[i], grid.predators[i]);
                if !(m.is_finite() && f.is_finite()) || m < 0.0 || f < 0.0 {
                    return Err(SimulationError::InvalidParameters {
                        reason: format!(
                            "initial densities at ({x}, {y}) must be finite and non-negative, got prey {m} predators {f}"
                        ),
                    });
                }
                if !landscape.is_land(x, y) && (m != 0.0 || f != 0.0) {
                    return Err(SimulationError::DensityOnWaterCell { x, y });
                }
            }
        }

        let cells = grid.width * grid.height;
        Ok(Self {
            width: grid.width,
            height: grid.height,
            prey: grid.prey,
            predators: grid.predators,
            prey_next: vec![0.0; cells],
            predators_next: vec![0.0; cells],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn prey(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.prey[y * self.width + x]
    }

    #[inline]
    pub fn predators(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.predators[y * self.width + x]
    }

    /// Current prey buffer, row-major.
    pub fn prey_grid(&self) -> &[f64] {
        &self.prey
    }

    /// Current predator buffer, row-major.
    pub fn predators_grid(&self) -> &[f64] {
        &self.predators
    }

    /// Split view for one step: read-only current buffers, writable next
    /// buffers. Used exclusively by the stepping kernels.
    pub(crate) fn step_buffers(&mut self) -> StepBuffers<'_> {
        StepBuffers {
            width: self.width,
            height: self.height,
            prey: &self.prey,
            predators: &self.predators,
            prey_next: &mut self.prey_next,
            predators_next: &mut self.predators_next,
        }
    }

    /// Promote the next buffers to current. Called exactly once per
    /// completed step.
    pub(crate) fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.prey, &mut self.prey_next);
        std::mem::swap(&mut self.predators, &mut self.predators_next);
    }
}

pub(crate) struct StepBuffers<'a> {
    pub width: usize,
    pub height: usize,
    pub prey: &'a [f64],
    pub predators: &'a [f64],
    pub prey_next: &'a mut [f64],
    pub predators_next: &'a mut [f64],
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PopulationState>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn shore() -> Landscape {
        // Left column land, right column water.
        Landscape::from_mask(2, 2, vec![true, false, true, false]).unwrap()
    }

    #[test]
    fn accepts_matching_grid_with_zero_water() {
        let grid = DensityGrid::new(2, 2, vec![1.5, 0.0, 2.5, 0.0], vec![0.5, 0.0, 0.0, 0.0]);
        let state = PopulationState::from_grid(&shore(), grid).unwrap();
        assert_eq!(state.prey(0, 0), 1.5);
        assert_eq!(state.prey(0, 1), 2.5);
        assert_eq!(state.predators(0, 0), 0.5);
        assert_eq!(state.prey(1, 0), 0.0);
    }

    #[test]
    fn rejects_nonzero_density_on_water() {
        let grid = DensityGrid::new(2, 2, vec![1.0, 3.0, 0.0, 0.0], vec![0.0; 4]);
        let err = PopulationState::from_grid(&shore(), grid).unwrap_err();
        assert_eq!(err, SimulationError::DensityOnWaterCell { x: 1, y: 0 });
    }

    #[test]
    fn rejects_shape_mismatch() {
        let grid = DensityGrid::uniform(3, 2, 1.0, 0.0);
        let err = PopulationState::from_grid(&shore(), grid).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ShapeMismatch {
                expected_width: 2,
                expected_height: 2,
                found_width: 3,
                found_height: 2,
            }
        ));
    }

    #[test]
    fn rejects_negative_initial_density() {
        let grid = DensityGrid::new(2, 2, vec![-1.0, 0.0, 0.0, 0.0], vec![0.0; 4]);
        let err = PopulationState::from_grid(&shore(), grid).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters { .. }));
    }

    #[test]
    fn swap_promotes_the_next_buffer() {
        let grid = DensityGrid::new(2, 2, vec![1.0, 0.0, 1.0, 0.0], vec![0.0; 4]);
        let mut state = PopulationState::from_grid(&shore(), grid).unwrap();
        {
            let buffers = state.step_buffers();
            buffers.prey_next.copy_from_slice(&[9.0, 0.0, 9.0, 0.0]);
            buffers.predators_next.copy_from_slice(&[0.25, 0.0, 0.25, 0.0]);
        }
        assert_eq!(state.prey(0, 0), 1.0);
        state.swap_buffers();
        assert_eq!(state.prey(0, 0), 9.0);
        assert_eq!(state.predators(0, 1), 0.25);
    }

    #[test]
    fn masked_copy_zeroes_water_and_keeps_land() {
        let grid = DensityGrid::uniform(2, 2, 3.0, 4.0);
        let masked = grid.masked(&shore());
        assert_eq!(masked.prey, vec![3.0, 0.0, 3.0, 0.0]);
        assert_eq!(masked.predators, vec![4.0, 0.0, 4.0, 0.0]);
        // The original grid is untouched.
        assert_eq!(grid.prey, vec![3.0; 4]);
    }
}
