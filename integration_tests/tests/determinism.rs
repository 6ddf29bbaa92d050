use predprey_core::{
    build_simulation, DensityGrid, Frame, LandscapeSettings, ParallelStepper, SerialStepper,
    SimulationParameters, Stepper, StopFlag,
};

fn seeded_grid(width: usize, height: usize) -> DensityGrid {
    // Deterministic mixed fill; cells that land on water get masked away
    // inside build_simulation.
    let mut prey = Vec::with_capacity(width * height);
    let mut predators = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            prey.push(((x * 7 + y * 3) % 10) as f64);
            predators.push((((x + y * 5) % 7) as f64) * 0.5);
        }
    }
    DensityGrid::new(width, height, prey, predators)
}

fn run_to_frames(stepper: Box<dyn Stepper>) -> Vec<Frame> {
    let params = SimulationParameters {
        duration: 25.0, // fifty steps
        output_interval: 5,
        ..Default::default()
    };
    let settings = LandscapeSettings {
        seed: 11,
        land_proportion: 0.6,
        smoothing_passes: 2,
    };
    let mut sim = build_simulation(seeded_grid(24, 18), params, &settings)
        .expect("simulation assembles")
        .with_stepper(stepper);

    let mut frames: Vec<Frame> = Vec::new();
    sim.run(&mut frames, &StopFlag::new()).expect("run completes");
    frames
}

#[test]
fn identical_runs_reproduce_identical_trajectories() {
    let a = run_to_frames(Box::new(SerialStepper));
    let b = run_to_frames(Box::new(SerialStepper));

    assert_eq!(a.len(), 10);
    assert_eq!(a.len(), b.len());
    for (fa, fb) in a.iter().zip(&b) {
        assert_eq!(fa.step, fb.step);
        assert_eq!(fa.prey, fb.prey);
        assert_eq!(fa.predators, fb.predators);
        assert_eq!(fa.mean_prey, fb.mean_prey);
        assert_eq!(fa.mean_predators, fb.mean_predators);
    }
}

#[test]
fn parallel_and_serial_steppers_trace_identically() {
    let serial = run_to_frames(Box::new(SerialStepper));
    let parallel = run_to_frames(Box::new(ParallelStepper));

    assert_eq!(serial.len(), parallel.len());
    for (s, p) in serial.iter().zip(&parallel) {
        assert_eq!(s.prey, p.prey, "prey diverged at step {}", s.step);
        assert_eq!(
            s.predators, p.predators,
            "predators diverged at step {}",
            s.step
        );
        assert_eq!(s.mean_prey, p.mean_prey);
        assert_eq!(s.mean_predators, p.mean_predators);
    }
}
