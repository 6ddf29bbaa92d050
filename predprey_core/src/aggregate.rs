use crate::{population::PopulationState, topology::NeighborTopology};

/// Per-step scalar aggregates handed to reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub step: u64,
    pub time: f64,
    pub mean_prey: f64,
    pub mean_predators: f64,
}

/// Arithmetic mean of each species over land cells.
///
/// Water cells hold exactly zero, so summing the whole buffer in row-major
/// order equals the land-only sum while keeping the accumulation order
/// fixed; dividing by the topology's land count (not the cell count) gives
/// the land mean. A landscape with no land has no population to average;
/// both means are reported as zero.
pub fn mean_densities(state: &PopulationState, topology: &NeighborTopology) -> (f64, f64) {
    let land = topology.land_count();
    if land == 0 {
        return (0.0, 0.0);
    }
    let prey_total: f64 = state.prey_grid().iter().sum();
    let predator_total: f64 = state.predators_grid().iter().sum();
    (prey_total / land as f64, predator_total / land as f64)
}
