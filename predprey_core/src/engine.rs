use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    aggregate::{mean_densities, StepResult},
    error::SimulationError,
    landscape::Landscape,
    params::SimulationParameters,
    population::PopulationState,
    snapshot::{Frame, FrameSink},
    stepper::{SerialStepper, StepContext, Stepper},
    topology::NeighborTopology,
};

/// Cooperative stop request, honored between steps only.
///
/// Clone one side into whatever should be able to halt the run; the loop
/// finishes the step in flight before checking, so observers always see a
/// consistent post-swap state.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a [`Simulation::run`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub frames: u64,
    pub interrupted: bool,
    pub mean_prey: f64,
    pub mean_predators: f64,
}

/// The reaction-diffusion integrator.
///
/// Construction is the validation gate: a `Simulation` only exists once the
/// landscape, topology, state and parameters agree, so every fatal error
/// surfaces before the first step. Stepping advances the double buffer by
/// one fixed `dt` at a time until the configured duration is covered, after
/// which further [`step`](Self::step) calls fail with
/// [`SimulationError::AlreadyComplete`].
pub struct Simulation {
    landscape: Arc<Landscape>,
    topology: NeighborTopology,
    params: SimulationParameters,
    state: PopulationState,
    stepper: Box<dyn Stepper>,
    step_index: u64,
    total_steps: u64,
}

impl Simulation {
    pub fn new(
        landscape: Arc<Landscape>,
        topology: NeighborTopology,
        state: PopulationState,
        params: SimulationParameters,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        if topology.width() != landscape.width() || topology.height() != landscape.height() {
            return Err(SimulationError::ShapeMismatch {
                expected_width: landscape.width(),
                expected_height: landscape.height(),
                found_width: topology.width(),
                found_height: topology.height(),
            });
        }
        if state.width() != landscape.width() || state.height() != landscape.height() {
            return Err(SimulationError::ShapeMismatch {
                expected_width: landscape.width(),
                expected_height: landscape.height(),
                found_width: state.width(),
                found_height: state.height(),
            });
        }
        // State may have been validated against a different landscape with
        // the same shape; the water invariant must hold against this one.
        for y in 0..landscape.height() {
            for x in 0..landscape.width() {
                if !landscape.is_land(x, y)
                    && (state.prey(x, y) != 0.0 || state.predators(x, y) != 0.0)
                {
                    return Err(SimulationError::DensityOnWaterCell { x, y });
                }
            }
        }

        let total_steps = params.total_steps();
        tracing::debug!(
            target: "predprey::engine",
            width = landscape.width(),
            height = landscape.height(),
            land_count = landscape.land_count(),
            total_steps,
            time_step = params.time_step,
            "simulation.ready"
        );
        Ok(Self {
            landscape,
            topology,
            params,
            state,
            stepper: Box::new(SerialStepper),
            step_index: 0,
            total_steps,
        })
    }

    /// Replace the stepping variant; numerically a no-op since every
    /// registered variant is bit-equivalent.
    pub fn with_stepper(mut self, stepper: Box<dyn Stepper>) -> Self {
        self.stepper = stepper;
        self
    }

    /// Advance one step and report the post-step aggregates.
    pub fn step(&mut self) -> Result<StepResult, SimulationError> {
        if self.step_index >= self.total_steps {
            return Err(SimulationError::AlreadyComplete {
                steps: self.step_index,
            });
        }
        let ctx = StepContext {
            landscape: &self.landscape,
            topology: &self.topology,
            params: &self.params,
        };
        self.stepper.advance(&ctx, &mut self.state);
        self.state.swap_buffers();
        self.step_index += 1;
        Ok(self.current_result())
    }

    /// Drive the simulation to completion, recording a frame whenever the
    /// upcoming step index is a multiple of the output interval.
    ///
    /// The frame for step `i` captures the state *before* step `i` runs, so
    /// the first frame of a fresh run is the initial state. A stop request
    /// breaks the loop between steps; an exhausted simulation is a benign
    /// no-op here (only direct `step` calls report `AlreadyComplete`).
    pub fn run(
        &mut self,
        sink: &mut dyn FrameSink,
        stop: &StopFlag,
    ) -> Result<RunSummary, SimulationError> {
        let interval = self.params.output_interval;
        tracing::debug!(
            target: "predprey::engine",
            total_steps = self.total_steps,
            output_interval = interval,
            stepper = self.stepper.name(),
            stepper_version = self.stepper.version(),
            "run.begin"
        );

        let mut frames = 0u64;
        let mut interrupted = false;
        while self.step_index < self.total_steps {
            if stop.is_requested() {
                interrupted = true;
                break;
            }
            if self.step_index % interval == 0 {
                sink.record(self.capture_frame());
                frames += 1;
            }
            self.step()?;
        }

        let (mean_prey, mean_predators) = mean_densities(&self.state, &self.topology);
        tracing::info!(
            target: "predprey::engine",
            steps = self.step_index,
            frames,
            interrupted,
            mean_prey,
            mean_predators,
            "run.complete"
        );
        Ok(RunSummary {
            steps: self.step_index,
            frames,
            interrupted,
            mean_prey,
            mean_predators,
        })
    }

    fn current_result(&self) -> StepResult {
        let (mean_prey, mean_predators) = mean_densities(&self.state, &self.topology);
        StepResult {
            step: self.step_index,
            time: self.step_index as f64 * self.params.time_step,
            mean_prey,
            mean_predators,
        }
    }

    fn capture_frame(&self) -> Frame {
        let (mean_prey, mean_predators) = mean_densities(&self.state, &self.topology);
        Frame {
            step: self.step_index,
            time: self.step_index as f64 * self.params.time_step,
            mean_prey,
            mean_predators,
            width: self.state.width(),
            height: self.state.height(),
            prey: self.state.prey_grid().to_vec(),
            predators: self.state.predators_grid().to_vec(),
        }
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn topology(&self) -> &NeighborTopology {
        &self.topology
    }

    pub fn state(&self) -> &PopulationState {
        &self.state
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn elapsed_time(&self) -> f64 {
        self.step_index as f64 * self.params.time_step
    }

    pub fn is_complete(&self) -> bool {
        self.step_index >= self.total_steps
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("width", &self.landscape.width())
            .field("height", &self.landscape.height())
            .field("stepper", &self.stepper.name())
            .field("step_index", &self.step_index)
            .field("total_steps", &self.total_steps)
            .finish()
    }
}
