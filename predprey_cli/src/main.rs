use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use predprey_core::{
    Landscape, LandscapeSettings, NeighborTopology, PopulationState, PresetLibrary, Simulation,
    SimulationParameters, StepperRegistry, StopFlag,
};
use predprey_io::{load_density_file, Reporter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Deterministic predator-prey reaction-diffusion simulation",
    long_about = None
)]
struct Args {
    /// Path to the initial density grid file
    #[arg(long)]
    densities: PathBuf,

    /// Directory receiving the averages CSV and the density map snapshots
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Parameter preset to start from
    #[arg(long, default_value = "default")]
    preset: String,

    /// JSON file replacing the builtin preset set
    #[arg(long)]
    presets_file: Option<PathBuf>,

    /// Stepper variant driving the update
    #[arg(long, default_value = "serial")]
    stepper: String,

    /// List the registered stepper variants and exit
    #[arg(long)]
    list_steppers: bool,

    /// Prey birth rate r
    #[arg(short = 'r', long)]
    prey_birth_rate: Option<f64>,

    /// Predation rate a
    #[arg(short = 'a', long)]
    predation_rate: Option<f64>,

    /// Prey diffusion coefficient k
    #[arg(short = 'k', long)]
    prey_diffusion: Option<f64>,

    /// Predator birth rate b
    #[arg(short = 'b', long)]
    predator_birth_rate: Option<f64>,

    /// Predator death rate m
    #[arg(short = 'm', long)]
    predator_death_rate: Option<f64>,

    /// Predator diffusion coefficient l
    #[arg(short = 'l', long)]
    predator_diffusion: Option<f64>,

    /// Euler step size in simulated time units
    #[arg(long)]
    dt: Option<f64>,

    /// Total simulated duration
    #[arg(long)]
    duration: Option<f64>,

    /// Steps between recorded frames
    #[arg(long)]
    output_interval: Option<u64>,

    /// Landscape seed
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a cell starts as land
    #[arg(long)]
    land_proportion: Option<f64>,

    /// Smoothing passes applied to the generated landscape
    #[arg(long)]
    smoothing_passes: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let registry = StepperRegistry::with_builtin();
    if args.list_steppers {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let presets = match &args.presets_file {
        Some(path) => PresetLibrary::from_file(path)
            .with_context(|| format!("failed to load presets from {}", path.display()))?,
        None => PresetLibrary::builtin(),
    };
    let preset = presets.get(&args.preset).with_context(|| {
        format!(
            "unknown preset '{}' (known: {})",
            args.preset,
            presets.names().join(", ")
        )
    })?;

    let mut params = preset.parameters.clone();
    let mut settings = preset.landscape;
    apply_overrides(&args, &mut params, &mut settings);

    let stepper = registry
        .create(&args.stepper)
        .context("failed to resolve the requested stepper")?;
    info!(
        target: "predprey::cli",
        version = env!("CARGO_PKG_VERSION"),
        preset = %args.preset,
        stepper = stepper.name(),
        stepper_version = stepper.version(),
        "predprey starting"
    );

    if params.time_step > params.stability_limit() {
        warn!(
            target: "predprey::cli",
            time_step = params.time_step,
            stability_limit = params.stability_limit(),
            "time step exceeds the explicit Euler stability bound; densities may oscillate"
        );
    }

    let densities = load_density_file(&args.densities)
        .with_context(|| format!("failed to load densities from {}", args.densities.display()))?;

    let landscape = Arc::new(
        Landscape::generate(densities.width, densities.height, &settings)
            .context("failed to generate the landscape")?,
    );
    info!(
        target: "predprey::cli",
        width = landscape.width(),
        height = landscape.height(),
        land_cells = landscape.land_count(),
        seed = settings.seed,
        "landscape ready"
    );

    let topology = NeighborTopology::from_landscape(&landscape);
    let state = PopulationState::from_grid(&landscape, densities.masked(&landscape))
        .context("failed to build the population state")?;
    let mut simulation = Simulation::new(Arc::clone(&landscape), topology, state, params)
        .context("failed to assemble the simulation")?
        .with_stepper(stepper);

    let reporter = Reporter::spawn(&args.output_dir, Arc::clone(&landscape)).with_context(|| {
        format!(
            "failed to start reporting into {}",
            args.output_dir.display()
        )
    })?;
    let mut sink = reporter.sink();

    let summary = simulation
        .run(&mut sink, &StopFlag::new())
        .context("simulation failed")?;

    // All sender clones must be gone before close() can join the worker.
    drop(sink);
    let frames_written = reporter
        .close()
        .context("failed to finish writing run artifacts")?;

    info!(
        target: "predprey::cli",
        steps = summary.steps,
        frames = frames_written,
        mean_prey = summary.mean_prey,
        mean_predators = summary.mean_predators,
        "run complete"
    );
    Ok(())
}

fn apply_overrides(
    args: &Args,
    params: &mut SimulationParameters,
    settings: &mut LandscapeSettings,
) {
    if let Some(value) = args.prey_birth_rate {
        params.prey_birth_rate = value;
    }
    if let Some(value) = args.predation_rate {
        params.predation_rate = value;
    }
    if let Some(value) = args.prey_diffusion {
        params.prey_diffusion = value;
    }
    if let Some(value) = args.predator_birth_rate {
        params.predator_birth_rate = value;
    }
    if let Some(value) = args.predator_death_rate {
        params.predator_death_rate = value;
    }
    if let Some(value) = args.predator_diffusion {
        params.predator_diffusion = value;
    }
    if let Some(value) = args.dt {
        params.time_step = value;
    }
    if let Some(value) = args.duration {
        params.duration = value;
    }
    if let Some(value) = args.output_interval {
        params.output_interval = value;
    }
    if let Some(value) = args.seed {
        settings.seed = value;
    }
    if let Some(value) = args.land_proportion {
        settings.land_proportion = value;
    }
    if let Some(value) = args.smoothing_passes {
        settings.smoothing_passes = value;
    }
}
