use std::{collections::HashMap, fmt};

use rayon::prelude::*;

use crate::{
    error::SimulationError,
    landscape::Landscape,
    params::SimulationParameters,
    population::{PopulationState, StepBuffers},
    topology::NeighborTopology,
};

/// Read-only inputs shared by every cell update within one step.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub landscape: &'a Landscape,
    pub topology: &'a NeighborTopology,
    pub params: &'a SimulationParameters,
}

/// One advance of the next buffer from the current buffer.
///
/// Implementations fill the whole next buffer (zero on water) and never
/// touch the current buffer; the engine performs the single swap
/// afterwards. Every variant must be bit-equivalent: the registry exists so
/// harnesses can pick a variant by name and compare traces, not so variants
/// can disagree.
pub trait Stepper: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn version(&self) -> &'static str;
    fn advance(&self, ctx: &StepContext<'_>, state: &mut PopulationState);
}

/// Explicit Euler update for one land cell, reading the current buffer
/// only.
///
/// `sum_of_land_neighbor - n * value` is the irregular-domain diffusion
/// stencil: the neighbor sum skips water and out-of-grid cells, and the
/// normalization uses the land-neighbor count `n`, not a fixed 4. With
/// `n == 0` both terms vanish and the cell only reacts. Computed densities
/// are floored at zero as policy.
#[inline]
fn advance_cell(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    prey: &[f64],
    predators: &[f64],
    mask: &[bool],
    counts: &[u8],
    params: &SimulationParameters,
) -> (f64, f64) {
    let i = y * width + x;
    let m = prey[i];
    let f = predators[i];
    let n = counts[i] as f64;

    let mut m_sum = 0.0;
    let mut f_sum = 0.0;
    if x > 0 && mask[i - 1] {
        m_sum += prey[i - 1];
        f_sum += predators[i - 1];
    }
    if x + 1 < width && mask[i + 1] {
        m_sum += prey[i + 1];
        f_sum += predators[i + 1];
    }
    if y > 0 && mask[i - width] {
        m_sum += prey[i - width];
        f_sum += predators[i - width];
    }
    if y + 1 < height && mask[i + width] {
        m_sum += prey[i + width];
        f_sum += predators[i + width];
    }

    let diffusion_m = params.prey_diffusion * (m_sum - n * m);
    let diffusion_f = params.predator_diffusion * (f_sum - n * f);
    let dm = params.prey_birth_rate * m - params.predation_rate * m * f + diffusion_m;
    let df = params.predator_birth_rate * m * f - params.predator_death_rate * f + diffusion_f;

    (
        (m + params.time_step * dm).max(0.0),
        (f + params.time_step * df).max(0.0),
    )
}

fn advance_row(
    y: usize,
    ctx: &StepContext<'_>,
    prey: &[f64],
    predators: &[f64],
    prey_row: &mut [f64],
    predators_row: &mut [f64],
) {
    let width = ctx.landscape.width();
    let height = ctx.landscape.height();
    let mask = ctx.landscape.mask();
    let counts = ctx.topology.counts();
    for x in 0..width {
        if mask[y * width + x] {
            let (m, f) = advance_cell(
                x, y, width, height, prey, predators, mask, counts, ctx.params,
            );
            prey_row[x] = m;
            predators_row[x] = f;
        } else {
            prey_row[x] = 0.0;
            predators_row[x] = 0.0;
        }
    }
}

/// Single-threaded row-by-row advance; the reference variant.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialStepper;

impl Stepper for SerialStepper {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn version(&self) -> &'static str {
        "4.0"
    }

    fn advance(&self, ctx: &StepContext<'_>, state: &mut PopulationState) {
        let StepBuffers {
            width,
            prey,
            predators,
            prey_next,
            predators_next,
            ..
        } = state.step_buffers();
        for (y, (prey_row, predators_row)) in prey_next
            .chunks_mut(width)
            .zip(predators_next.chunks_mut(width))
            .enumerate()
        {
            advance_row(y, ctx, prey, predators, prey_row, predators_row);
        }
    }
}

/// Rayon row-partitioned advance.
///
/// Each worker writes a disjoint slice of output rows and reads the shared
/// current buffer, so results are bit-identical to [`SerialStepper`]
/// regardless of thread count or scheduling.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelStepper;

impl Stepper for ParallelStepper {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn version(&self) -> &'static str {
        "4.0"
    }

    fn advance(&self, ctx: &StepContext<'_>, state: &mut PopulationState) {
        let StepBuffers {
            width,
            prey,
            predators,
            prey_next,
            predators_next,
            ..
        } = state.step_buffers();
        prey_next
            .par_chunks_mut(width)
            .zip(predators_next.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (prey_row, predators_row))| {
                advance_row(y, ctx, prey, predators, prey_row, predators_row);
            });
    }
}

/// Name-keyed factory map over the known stepper variants.
pub struct StepperRegistry {
    by_name: HashMap<&'static str, fn() -> Box<dyn Stepper>>,
}

impl StepperRegistry {
    /// Registry holding the builtin `serial` and `parallel` variants.
    pub fn with_builtin() -> Self {
        let mut registry = Self {
            by_name: HashMap::new(),
        };
        registry.register(|| Box::new(SerialStepper));
        registry.register(|| Box::new(ParallelStepper));
        registry
    }

    pub fn register(&mut self, factory: fn() -> Box<dyn Stepper>) {
        let name = factory().name();
        self.by_name.insert(name, factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Stepper>, SimulationError> {
        match self.by_name.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(SimulationError::UnknownStepper {
                name: name.to_string(),
                known: self.names().join(", "),
            }),
        }
    }

    /// Registered variant names in stable order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for StepperRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
