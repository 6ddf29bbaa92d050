use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use predprey_core::{
    DensityGrid, Landscape, NeighborTopology, ParallelStepper, PopulationState, SerialStepper,
    Simulation, SimulationParameters, Stepper,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn seeded_simulation(size: usize, stepper: Box<dyn Stepper>) -> Simulation {
    let mut rng = SmallRng::seed_from_u64(42);
    let landscape =
        Arc::new(Landscape::generate_with(size, size, 0.75, 2, &mut rng).unwrap());

    let mut prey = vec![0.0; size * size];
    let mut predators = vec![0.0; size * size];
    for (i, &land) in landscape.mask().iter().enumerate() {
        if land {
            prey[i] = rng.gen_range(0.0..5.0);
            predators[i] = rng.gen_range(0.0..5.0);
        }
    }
    let grid = DensityGrid::new(size, size, prey, predators);
    let topology = NeighborTopology::from_landscape(&landscape);
    let state = PopulationState::from_grid(&landscape, grid).unwrap();

    Simulation::new(landscape, topology, state, SimulationParameters::default())
        .unwrap()
        .with_stepper(stepper)
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for size in [32usize, 64, 128, 256] {
        group.bench_with_input(BenchmarkId::new("serial", size), &size, |b, &size| {
            b.iter_batched(
                || seeded_simulation(size, Box::new(SerialStepper)),
                |mut sim| {
                    sim.step().unwrap();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &size, |b, &size| {
            b.iter_batched(
                || seeded_simulation(size, Box::new(ParallelStepper)),
                |mut sim| {
                    sim.step().unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(step_benches, bench_step);
criterion_main!(step_benches);
